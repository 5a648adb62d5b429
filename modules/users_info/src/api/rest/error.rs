use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::contract::error::UsersInfoError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Add trace id from current tracing span if available
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_trace_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

/// Map a public error category to an RFC 9457 ProblemResponse
pub fn map_users_error(e: &UsersInfoError, instance: &str) -> ProblemResponse {
    match e {
        UsersInfoError::Validation { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "USERS_VALIDATION",
            "Validation error",
            message.clone(),
            instance,
        ),
        UsersInfoError::NotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {} was not found", id),
            instance,
        ),
        UsersInfoError::Conflict { email } => from_parts(
            StatusCode::CONFLICT,
            "USERS_EMAIL_CONFLICT",
            "Email already exists",
            format!("Email '{}' is already in use", email),
            instance,
        ),
        UsersInfoError::Internal => from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "USERS_INTERNAL",
            "Internal error",
            "An internal error occurred",
            instance,
        ),
    }
}
