use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateUserReq, ListUsersQuery, UpdateUserReq, UserEnvelope, UserListDto,
};
use crate::api::rest::error::map_users_error;
use crate::api::rest::problem::ProblemResponse;
use crate::contract::client::UsersInfoApi;
use crate::contract::model::{GetUserInput, UpdateUserInput};

type Api = Arc<dyn UsersInfoApi>;

/// List users with optional free-text filter, ordering and limit/offset paging
pub async fn list_users(
    Extension(api): Extension<Api>,
    Query(query): Query<ListUsersQuery>,
    uri: Uri,
) -> Result<Json<UserListDto>, ProblemResponse> {
    info!("Listing users with query: {:?}", query);

    match api.list_users(query.into()).await {
        Ok(list) => Ok(Json(UserListDto::from(list))),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_users_error(&e, uri.path()))
        }
    }
}

/// Get a specific user by ID; the raw path segment is validated by the service
pub async fn get_user(
    Extension(api): Extension<Api>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<UserEnvelope>, ProblemResponse> {
    info!("Getting user with id: {}", id);

    match api.get_user(GetUserInput::new(id.clone())).await {
        Ok(user) => Ok(Json(UserEnvelope::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_users_error(&e, uri.path()))
        }
    }
}

/// Create a new user
pub async fn create_user(
    uri: Uri,
    Extension(api): Extension<Api>,
    Json(req_body): Json<CreateUserReq>,
) -> Result<(StatusCode, Json<UserEnvelope>), ProblemResponse> {
    info!("Creating user: {:?}", req_body);

    match api.create_user(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserEnvelope::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_users_error(&e, uri.path()))
        }
    }
}

/// Partially update an existing user
pub async fn update_user(
    uri: Uri,
    Extension(api): Extension<Api>,
    Path(id): Path<String>,
    Json(req_body): Json<UpdateUserReq>,
) -> Result<Json<UserEnvelope>, ProblemResponse> {
    info!("Updating user {} with: {:?}", id, req_body);

    let input = UpdateUserInput {
        id: id.clone(),
        patch: req_body.into(),
    };

    match api.update_user(input).await {
        Ok(user) => Ok(Json(UserEnvelope::from(user))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_users_error(&e, uri.path()))
        }
    }
}
