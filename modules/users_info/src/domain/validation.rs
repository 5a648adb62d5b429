//! Input validation for every façade operation.
//!
//! Each validator consumes the raw caller input and returns the typed value the
//! service works with, so nothing downstream has to re-check shape or defaults.
//! All checks run before any storage access.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::contract::model::{
    CreateUserInput, ListUsersInput, NewUser, UpdateUserInput, UserPatch,
};
use crate::domain::error::DomainError;
use crate::domain::query::{ListQuery, Sort, SortField, SortOrder};

/// Length of a canonical hyphenated UUID string.
pub const ID_LENGTH: usize = 36;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex compiles")
});

/// Paging bounds applied to list queries.
#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_list(input: ListUsersInput, limits: PageLimits) -> Result<ListQuery, DomainError> {
    let limit = input
        .limit
        .unwrap_or_else(|| i64::from(limits.default_page_size));
    if limit < 1 {
        return Err(DomainError::validation("limit", "must be greater than 0"));
    }
    if limit > i64::from(limits.max_page_size) {
        return Err(DomainError::validation(
            "limit",
            format!("must not exceed {}", limits.max_page_size),
        ));
    }

    let offset = input.offset.unwrap_or(0);
    if offset < 0 {
        return Err(DomainError::validation(
            "offset",
            "must be greater than or equal to 0",
        ));
    }

    if matches!(input.query.as_deref(), Some("")) {
        return Err(DomainError::validation(
            "query",
            "cannot be an empty string",
        ));
    }

    let sort = match input.order_by.as_deref() {
        None => Sort::default(),
        Some("") => {
            return Err(DomainError::validation(
                "order_by",
                "cannot be an empty string",
            ))
        }
        Some(raw) => parse_sort(raw)?,
    };

    Ok(ListQuery {
        filter: input.query,
        sort,
        // both checked non-negative above
        limit: limit as u64,
        offset: offset as u64,
    })
}

/// Accepts `field`, `field asc`, `field desc` or `-field`.
fn parse_sort(raw: &str) -> Result<Sort, DomainError> {
    let raw = raw.trim();
    let (name, order) = if let Some(rest) = raw.strip_prefix('-') {
        (rest, SortOrder::Desc)
    } else {
        let mut parts = raw.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let order = match parts.next() {
            None => SortOrder::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            Some(dir) => {
                return Err(DomainError::validation(
                    "order_by",
                    format!("unknown sort direction '{}'", dir),
                ))
            }
        };
        if parts.next().is_some() {
            return Err(DomainError::validation(
                "order_by",
                format!("expected '<field> [asc|desc]', got '{}'", raw),
            ));
        }
        (name, order)
    };

    let field = SortField::from_name(name).ok_or_else(|| {
        DomainError::validation("order_by", format!("unknown sort field '{}'", name))
    })?;
    Ok(Sort { field, order })
}

pub fn validate_id(raw: Option<&str>) -> Result<Uuid, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::validation("id", "must be provided"))?;
    if raw.chars().count() != ID_LENGTH {
        return Err(DomainError::validation(
            "id",
            format!("invalid id format, length must be {} characters", ID_LENGTH),
        ));
    }
    Uuid::try_parse(raw)
        .map_err(|e| DomainError::validation("id", format!("invalid id format: {}", e)))
}

/// Checks run in a fixed order and the first failure wins:
/// email presence, email format, first name, last name.
pub fn validate_create(input: CreateUserInput) -> Result<NewUser, DomainError> {
    if input.email.is_empty() {
        return Err(DomainError::validation("email", "is required"));
    }
    if !is_valid_email(&input.email) {
        return Err(DomainError::validation("email", "invalid email format"));
    }
    if input.first_name.is_empty() {
        return Err(DomainError::validation("first_name", "is required"));
    }
    if input.last_name.is_empty() {
        return Err(DomainError::validation("last_name", "is required"));
    }
    Ok(NewUser {
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
    })
}

/// Only the identifier is checked; patch fields carry no format constraints and
/// rely on the store's uniqueness rules.
pub fn validate_update(input: UpdateUserInput) -> Result<(Uuid, UserPatch), DomainError> {
    let id = validate_id(Some(&input.id))?;
    Ok((id, input.patch))
}
