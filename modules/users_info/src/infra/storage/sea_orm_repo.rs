//! SeaORM-backed repository implementation for the domain port.
//!
//! The struct is generic over `C: ConnectionTrait + TransactionTrait`, so it can be
//! built with a `DatabaseConnection` or nested inside an outer transaction.
//! `update` opens its own transaction so that the existence check, the email
//! uniqueness check and the write commit together.

use std::sync::Arc;

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::{NewUser, User, UserList};
use crate::domain::error::DomainError;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::query::{ListQuery, SortField, SortOrder};
use crate::domain::repo::UsersRepository;
use crate::infra::storage::entity::{ActiveModel as UserAM, Column, Entity as UserEntity};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
    clock: Arc<dyn Clock>,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self::with_clock(conn, Arc::new(SystemClock))
    }

    /// Use `clock` for the timestamps assigned on insert.
    pub fn with_clock(conn: C, clock: Arc<dyn Clock>) -> Self {
        Self { conn, clock }
    }
}

fn db_error(operation: &str, id: Option<Uuid>, err: DbErr) -> DomainError {
    let message = match id {
        Some(id) => format!("user {}: {}", id, err),
        None => err.to_string(),
    };
    DomainError::database(operation, message)
}

/// Unique violations can only come from the email index on this table.
fn write_error(operation: &str, id: Uuid, email: &str, err: DbErr) -> DomainError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::email_already_exists(email),
        _ => db_error(operation, Some(id), err),
    }
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::Email => Column::Email,
        SortField::FirstName => Column::FirstName,
        SortField::LastName => Column::LastName,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
    }
}

/// Escape LIKE metacharacters so the needle only ever matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Case-insensitive substring match over email and both names.
///
/// Folding is ASCII-only on both sides, matching SQLite's `LOWER()`.
fn apply_filter(select: Select<UserEntity>, filter: Option<&str>) -> Select<UserEntity> {
    let Some(needle) = filter else {
        return select;
    };
    let pattern = format!("%{}%", escape_like(&needle.to_ascii_lowercase()));
    let lower_like = |col: Column| {
        Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern.clone()).escape('\\'))
    };
    select.filter(
        Condition::any()
            .add(lower_like(Column::Email))
            .add(lower_like(Column::FirstName))
            .add(lower_like(Column::LastName)),
    )
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| db_error("find_by_id", Some(id), e))?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .map_err(|e| db_error("find_by_email", None, e))?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, DomainError> {
        let id = Uuid::new_v4();
        let now = self.clock.now();
        let email = new_user.email.clone();
        let m = UserAM {
            id: Set(id),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = m
            .insert(&self.conn)
            .await
            .map_err(|e| write_error("insert", id, &email, e))?;
        debug!(user_id = %id, "Inserted user row");
        Ok(model.into())
    }

    async fn update(&self, u: User) -> Result<User, DomainError> {
        let id = u.id;
        let txn = self
            .conn
            .begin()
            .await
            .map_err(|e| db_error("update.begin", Some(id), e))?;

        // Dropping `txn` on an early return rolls it back.
        if UserEntity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| db_error("update.find_by_id", Some(id), e))?
            .is_none()
        {
            return Err(DomainError::user_not_found(id));
        }

        let holder = UserEntity::find()
            .filter(Column::Email.eq(u.email.as_str()))
            .filter(Column::Id.ne(id))
            .one(&txn)
            .await
            .map_err(|e| db_error("update.find_by_email", Some(id), e))?;
        if holder.is_some() {
            return Err(DomainError::email_already_exists(u.email));
        }

        let email = u.email.clone();
        let m = UserAM {
            id: Set(u.id),
            email: Set(u.email),
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        let model = match m.update(&txn).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Err(DomainError::user_not_found(id)),
            Err(e) => return Err(write_error("update", id, &email, e)),
        };

        txn.commit()
            .await
            .map_err(|e| write_error("update.commit", id, &email, e))?;
        Ok(model.into())
    }

    async fn list(&self, query: &ListQuery) -> Result<UserList, DomainError> {
        let select = apply_filter(UserEntity::find(), query.filter.as_deref());

        let total = select
            .clone()
            .count(&self.conn)
            .await
            .map_err(|e| db_error("list.count", None, e))?;

        let order = match query.sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let rows = select
            .order_by(sort_column(query.sort.field), order)
            // tie-break so pages stay stable
            .order_by(Column::Id, Order::Asc)
            .limit(query.limit)
            .offset(query.offset)
            .all(&self.conn)
            .await
            .map_err(|e| db_error("list", None, e))?;

        Ok(UserList {
            users: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }
}
