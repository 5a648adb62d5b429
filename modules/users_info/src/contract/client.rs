use async_trait::async_trait;

use crate::contract::{
    error::UsersInfoError,
    model::{CreateUserInput, GetUserInput, ListUsersInput, UpdateUserInput, User, UserList},
};

/// Public API trait for the users_info module that other modules can use
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// List users matching an optional free-text filter, with limit/offset paging
    async fn list_users(&self, input: ListUsersInput) -> Result<UserList, UsersInfoError>;

    /// Get a user by its canonical UUID string
    async fn get_user(&self, input: GetUserInput) -> Result<User, UsersInfoError>;

    /// Create a new user
    async fn create_user(&self, input: CreateUserInput) -> Result<User, UsersInfoError>;

    /// Update a user with partial data
    async fn update_user(&self, input: UpdateUserInput) -> Result<User, UsersInfoError>;
}
