use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers;
use crate::contract::client::UsersInfoApi;

/// Mount the users REST surface on `router`.
///
/// `PUT` and `PATCH` on `/users/{id}` are both partial updates.
pub fn register_routes(router: Router, api: Arc<dyn UsersInfoApi>) -> Router {
    router
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .patch(handlers::update_user),
        )
        .layer(Extension(api))
}
