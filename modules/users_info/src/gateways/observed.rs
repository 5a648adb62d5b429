//! Observer middleware around any `UsersInfoApi` implementation.
//!
//! `ObservedUsersClient` times every call and hands an `OperationRecord` to an
//! injected `OperationObserver`. Nothing here is process-global: each wrapper owns
//! its observer, so tests and embedders can plug in their own.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::contract::{
    client::UsersInfoApi,
    error::UsersInfoError,
    model::{CreateUserInput, GetUserInput, ListUsersInput, UpdateUserInput, User, UserList},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    GetUser,
    CreateUser,
    UpdateUser,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListUsers => "list_users",
            Operation::GetUser => "get_user",
            Operation::CreateUser => "create_user",
            Operation::UpdateUser => "update_user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Listed { returned: usize, total: u64 },
    User { id: Uuid },
    Failed(UsersInfoError),
}

#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub operation: Operation,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

/// Receives one record per completed façade call.
pub trait OperationObserver: Send + Sync {
    fn on_complete(&self, record: &OperationRecord);
}

/// Default observer: one structured log line per operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl OperationObserver for TracingObserver {
    fn on_complete(&self, record: &OperationRecord) {
        let op = record.operation.as_str();
        let took = record.elapsed;
        match &record.outcome {
            Outcome::Listed { returned, total } => info!(
                operation = op,
                took = ?took,
                returned,
                total,
                "operation completed"
            ),
            Outcome::User { id } => {
                info!(operation = op, took = ?took, user_id = %id, "operation completed")
            }
            Outcome::Failed(err) => warn!(
                operation = op,
                took = ?took,
                category = err.category(),
                error = %err,
                "operation failed"
            ),
        }
    }
}

pub struct ObservedUsersClient {
    inner: Arc<dyn UsersInfoApi>,
    observer: Arc<dyn OperationObserver>,
}

impl ObservedUsersClient {
    pub fn new(inner: Arc<dyn UsersInfoApi>, observer: Arc<dyn OperationObserver>) -> Self {
        Self { inner, observer }
    }

    async fn observe<T, F>(
        &self,
        operation: Operation,
        call: F,
        summarize: fn(&T) -> Outcome,
    ) -> Result<T, UsersInfoError>
    where
        F: Future<Output = Result<T, UsersInfoError>>,
    {
        let started = Instant::now();
        let result = call.await;
        let outcome = match &result {
            Ok(value) => summarize(value),
            Err(err) => Outcome::Failed(err.clone()),
        };
        self.observer.on_complete(&OperationRecord {
            operation,
            elapsed: started.elapsed(),
            outcome,
        });
        result
    }
}

fn user_outcome(user: &User) -> Outcome {
    Outcome::User { id: user.id }
}

fn list_outcome(list: &UserList) -> Outcome {
    Outcome::Listed {
        returned: list.users.len(),
        total: list.total,
    }
}

#[async_trait]
impl UsersInfoApi for ObservedUsersClient {
    async fn list_users(&self, input: ListUsersInput) -> Result<UserList, UsersInfoError> {
        self.observe(
            Operation::ListUsers,
            self.inner.list_users(input),
            list_outcome,
        )
        .await
    }

    async fn get_user(&self, input: GetUserInput) -> Result<User, UsersInfoError> {
        self.observe(Operation::GetUser, self.inner.get_user(input), user_outcome)
            .await
    }

    async fn create_user(&self, input: CreateUserInput) -> Result<User, UsersInfoError> {
        self.observe(
            Operation::CreateUser,
            self.inner.create_user(input),
            user_outcome,
        )
        .await
    }

    async fn update_user(&self, input: UpdateUserInput) -> Result<User, UsersInfoError> {
        self.observe(
            Operation::UpdateUser,
            self.inner.update_user(input),
            user_outcome,
        )
        .await
    }
}
