use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// Offset attached to newly created note timestamps and to migrated
/// timestamps that arrive without timezone information (UTC+7).
pub const CANONICAL_OFFSET_SECS: i32 = 7 * 3600;

/// The canonical fixed +07:00 offset.
#[must_use]
pub fn canonical_offset() -> FixedOffset {
    FixedOffset::east_opt(CANONICAL_OFFSET_SECS).expect("offset within range")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
}

/// Input for creating an account; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    /// Owner account name. Denormalized on purpose: a note keeps its owner's
    /// name even after that account is deleted.
    pub owner_username: String,
    pub title: String,
    pub content: String,
    /// None only for migrated rows whose source timestamp was unparseable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<FixedOffset>>,
}

/// Input for creating a note; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_username: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
}

/// A login session. The raw bearer token is shown once at login; only its
/// argon2 hash is stored.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub token_lookup: String,
    pub token_hash: String,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// The authenticated account bound to the current request. Never persisted.
#[derive(Debug, Clone)]
pub struct Principal {
    pub account_id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            username: account.username.clone(),
            role: account.role,
        }
    }
}
