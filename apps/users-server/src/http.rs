//! HTTP surface of the server: health route, users routes and the middleware stack.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, StatusCode},
    middleware::{from_fn, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;
use users_info::UsersInfo;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Record the request id in the current span
async fn record_request_id(req: Request<Body>, next: Next) -> Response {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a")
        .to_owned();
    tracing::Span::current().record("request_id", tracing::field::display(&rid));
    next.run(req).await
}

#[allow(clippy::type_complexity)]
fn trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
        tracing::info_span!(
            "http_request",
            method = %req.method(),
            uri = %req.uri().path(),
            version = ?req.version(),
            request_id = Empty,
        )
    })
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Build the full application router.
///
/// Middleware order (outermost to innermost):
/// PropagateRequestId -> SetRequestId -> Trace -> record_request_id -> Timeout -> BodyLimit
pub fn build_router(users: &UsersInfo, request_timeout: Option<Duration>) -> Router {
    let mut router = users.register_rest(Router::new().route("/health", get(health_check)));

    router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
    if let Some(limit) = request_timeout {
        router = router.layer(TimeoutLayer::new(limit));
    }
    router = router.layer(from_fn(record_request_id));
    router = router.layer(trace_layer());
    router = router.layer(SetRequestIdLayer::new(request_id_header(), MakeReqId));
    router = router.layer(PropagateRequestIdLayer::new(request_id_header()));
    router
}
