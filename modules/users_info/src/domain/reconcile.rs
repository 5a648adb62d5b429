//! Merge of a partial update into a stored user.

use chrono::{DateTime, Duration, Utc};

use crate::contract::model::{User, UserPatch};

/// Result of applying a patch: the new user state and whether any field changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub user: User,
    pub touched: bool,
}

/// Apply `patch` to `current` field by field (email, first name, last name).
///
/// A field only counts as changed when the proposed value differs from the stored
/// one. `updated_at` is assigned once, and only if something changed; it never
/// moves backwards and always moves strictly forward, even if `now` lags the
/// stored value.
pub fn reconcile(mut current: User, patch: UserPatch, now: DateTime<Utc>) -> Reconciled {
    let mut touched = false;
    touched |= apply(&mut current.email, patch.email);
    touched |= apply(&mut current.first_name, patch.first_name);
    touched |= apply(&mut current.last_name, patch.last_name);

    if touched {
        current.updated_at = advance(current.updated_at, now);
    }

    Reconciled {
        user: current,
        touched,
    }
}

fn apply(slot: &mut String, proposed: Option<String>) -> bool {
    match proposed {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}

fn advance(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
