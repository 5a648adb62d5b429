use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UsersInfoApi,
    error::UsersInfoError,
    model::{CreateUserInput, GetUserInput, ListUsersInput, UpdateUserInput, User, UserList},
};
use crate::domain::error::DomainError;
use crate::domain::service::Service;
use tracing::error;

/// Local implementation of the UsersInfoApi trait that delegates to the domain service
pub struct UsersInfoLocalClient {
    service: Arc<Service>,
}

impl UsersInfoLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

/// Storage failures collapse into `Internal` for callers; keep the detail in the log.
fn to_public(e: DomainError) -> UsersInfoError {
    if let DomainError::Database { .. } = e {
        error!(error = %e, "Storage failure");
    }
    e.into()
}

#[async_trait]
impl UsersInfoApi for UsersInfoLocalClient {
    async fn list_users(&self, input: ListUsersInput) -> Result<UserList, UsersInfoError> {
        self.service.list_users(input).await.map_err(to_public)
    }

    async fn get_user(&self, input: GetUserInput) -> Result<User, UsersInfoError> {
        self.service.get_user(input).await.map_err(to_public)
    }

    async fn create_user(&self, input: CreateUserInput) -> Result<User, UsersInfoError> {
        self.service.create_user(input).await.map_err(to_public)
    }

    async fn update_user(&self, input: UpdateUserInput) -> Result<User, UsersInfoError> {
        self.service.update_user(input).await.map_err(to_public)
    }
}
