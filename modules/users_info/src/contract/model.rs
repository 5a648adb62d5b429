use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Pure user model for inter-module communication (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a new user; id and timestamps are assigned on creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial update data for a user.
///
/// `None` leaves the field untouched, `Some(v)` proposes `v` (including an empty string).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

/// One page of users plus the number of users matching the filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserList {
    pub users: Vec<User>,
    pub total: u64,
}

/// Raw list query as received from a caller, validated by the service
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListUsersInput {
    pub query: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Raw get-by-id query; the id is kept as text until validated
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GetUserInput {
    pub id: Option<String>,
}

impl GetUserInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateUserInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateUserInput {
    pub id: String,
    pub patch: UserPatch,
}
