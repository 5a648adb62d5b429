use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{NewUser, User, UserList};
use crate::domain::error::DomainError;
use crate::domain::query::ListQuery;

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// The store is the source of truth for email uniqueness; implementations must
/// report a violated unique constraint as `DomainError::EmailAlreadyExists`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    /// Load a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// Insert a new user. The store assigns the id and both timestamps
    /// (`created_at == updated_at`) and returns the persisted row.
    async fn insert(&self, new_user: NewUser) -> Result<User, DomainError>;
    /// Persist every field of an existing user (by primary key in `u.id`).
    /// Re-checks existence and email uniqueness atomically with the write.
    async fn update(&self, u: User) -> Result<User, DomainError>;
    /// One page of users matching the query, plus the total number of matches.
    async fn list(&self, query: &ListQuery) -> Result<UserList, DomainError>;
}
