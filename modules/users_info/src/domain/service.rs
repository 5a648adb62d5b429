use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::contract::model::{
    CreateUserInput, GetUserInput, ListUsersInput, UpdateUserInput, User, UserList,
};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::reconcile::{reconcile, Reconciled};
use crate::domain::repo::UsersRepository;
use crate::domain::validation::{self, PageLimits};
use tracing::{debug, info, instrument};

/// Domain service orchestrating validation, reconciliation and persistence.
/// Depends only on the repository and clock ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Upper bound for a single storage call; `None` waits indefinitely.
    pub storage_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 1000,
            storage_timeout: None,
        }
    }
}

impl Service {
    /// Create a service reading time from the system clock.
    pub fn new(repo: Arc<dyn UsersRepository>, config: ServiceConfig) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock), config)
    }

    pub fn with_clock(
        repo: Arc<dyn UsersRepository>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            clock,
            config,
        }
    }

    #[instrument(name = "users_info.service.list_users", skip(self, input))]
    pub async fn list_users(&self, input: ListUsersInput) -> Result<UserList, DomainError> {
        debug!("Listing users");

        let query = validation::validate_list(
            input,
            PageLimits {
                default_page_size: self.config.default_page_size,
                max_page_size: self.config.max_page_size,
            },
        )?;

        let page = self.storage("list", self.repo.list(&query)).await?;

        debug!(
            returned = page.users.len(),
            total = page.total,
            sort = %query.sort,
            "Successfully listed users"
        );
        Ok(page)
    }

    #[instrument(name = "users_info.service.get_user", skip(self, input))]
    pub async fn get_user(&self, input: GetUserInput) -> Result<User, DomainError> {
        let id = validation::validate_id(input.id.as_deref())?;
        debug!(user_id = %id, "Getting user by id");

        let user = self
            .storage("find_by_id", self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self, input),
        fields(email = %input.email)
    )]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, DomainError> {
        info!("Creating new user");

        let new_user = validation::validate_create(input)?;

        // Fail fast; the unique index still decides under concurrent inserts.
        if self
            .storage("find_by_email", self.repo.find_by_email(&new_user.email))
            .await?
            .is_some()
        {
            return Err(DomainError::email_already_exists(new_user.email));
        }

        let user = self.storage("insert", self.repo.insert(new_user)).await?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.update_user",
        skip(self, input),
        fields(user_id = %input.id)
    )]
    pub async fn update_user(&self, input: UpdateUserInput) -> Result<User, DomainError> {
        info!("Updating user");

        let (id, patch) = validation::validate_update(input)?;
        if patch.is_empty() {
            debug!("Empty patch; record will be returned unchanged");
        }

        // Load current
        let current = self
            .storage("find_by_id", self.repo.find_by_id(id))
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        let Reconciled { user, touched } = reconcile(current, patch, self.clock.now());
        if !touched {
            debug!("No field changed value; updated_at kept");
        }

        // Persist
        let user = self.storage("update", self.repo.update(user)).await?;

        info!(touched, "Successfully updated user");
        Ok(user)
    }

    /// Run a storage call under the configured deadline.
    async fn storage<T, F>(&self, operation: &'static str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match self.config.storage_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                DomainError::database(operation, format!("deadline of {:?} exceeded", limit))
            })?,
            None => call.await,
        }
    }
}
