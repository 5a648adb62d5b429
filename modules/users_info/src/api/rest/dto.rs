use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{CreateUserInput, ListUsersInput, User, UserList, UserPatch};

/// REST DTO for user representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-user response body: `{ "user": { ... } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub user: UserDto,
}

/// REST DTO for user list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListDto {
    pub users: Vec<UserDto>,
    pub total: u64,
}

/// REST DTO for creating a new user. Missing fields deserialize as empty strings
/// so the validator, not the JSON extractor, reports which one is required.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CreateUserReq {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// REST DTO for updating a user (partial). Absent and `null` both mean "leave as is".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUserReq {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// REST DTO for list query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub query: Option<String>,
    pub order_by: Option<String>,
}

// Conversion implementations between REST DTOs and contract models

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserEnvelope {
    fn from(user: User) -> Self {
        Self { user: user.into() }
    }
}

impl From<UserList> for UserListDto {
    fn from(list: UserList) -> Self {
        Self {
            users: list.users.into_iter().map(UserDto::from).collect(),
            total: list.total,
        }
    }
}

impl From<CreateUserReq> for CreateUserInput {
    fn from(req: CreateUserReq) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

impl From<ListUsersQuery> for ListUsersInput {
    fn from(q: ListUsersQuery) -> Self {
        Self {
            query: q.query,
            order_by: q.order_by,
            limit: q.limit,
            offset: q.offset,
        }
    }
}
