mod schema;
mod sqlite;

pub use schema::SCHEMA;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Account operations
    fn create_account(&self, account: &NewAccount) -> Result<Account>;
    fn get_account(&self, id: i64) -> Result<Option<Account>>;
    fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;
    fn list_accounts(&self) -> Result<Vec<Account>>;
    fn update_account_role(&self, id: i64, role: Role) -> Result<()>;
    fn update_account_password(&self, id: i64, password_hash: &str) -> Result<()>;
    fn delete_account(&self, id: i64) -> Result<bool>;

    // Note operations
    fn create_note(&self, note: &NewNote) -> Result<Note>;
    fn get_note(&self, id: i64) -> Result<Option<Note>>;
    fn list_notes(&self) -> Result<Vec<Note>>;
    fn list_notes_by_owner(&self, owner_username: &str) -> Result<Vec<Note>>;
    fn update_note(&self, id: i64, title: &str, content: &str) -> Result<()>;
    fn delete_note(&self, id: i64) -> Result<bool>;

    // Session operations
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;

    // Admin bootstrap check
    fn has_admin_account(&self) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
