use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parses a note timestamp, keeping its stored offset. Rows written by this
/// store and by the migration always carry the +07:00 offset.
fn parse_note_datetime(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .and_then(|ndt| ndt.and_local_timezone(canonical_offset()).single())
        })
        .unwrap_or_else(|| {
            tracing::error!("Invalid note datetime in database: '{}'", s);
            Utc::now().with_timezone(&canonical_offset())
        })
}

/// Maps a stored role string to its enum value. Unknown strings drop to
/// member so a corrupted row can never grant admin rights.
fn parse_role(s: &str) -> Role {
    Role::parse(s).unwrap_or_else(|| {
        tracing::error!("Unknown role in database: '{}', treating as member", s);
        Role::Member
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // Account operations

    fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO accounts (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![account.username, account.password_hash, account.role.as_str()],
        );

        match result {
            Ok(_) => Ok(Account {
                id: conn.last_insert_rowid(),
                username: account.username.clone(),
                password_hash: account.password_hash.clone(),
                role: account.role,
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict(format!(
                    "username '{}' already exists",
                    account.username
                )))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_account(&self, id: i64) -> Result<Option<Account>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash, role FROM accounts WHERE id = ?1",
            params![id],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    role: parse_role(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password_hash, role FROM accounts WHERE username = ?1",
            params![username],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    role: parse_role(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, username, password_hash, role FROM accounts ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Account {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                role: parse_role(&row.get::<_, String>(3)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_account_role(&self, id: i64, role: Role) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE accounts SET role = ?1 WHERE id = ?2",
            params![role.as_str(), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn update_account_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE accounts SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_account(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Note operations

    fn create_note(&self, note: &NewNote) -> Result<Note> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO notes (owner_username, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                note.owner_username,
                note.title,
                note.content,
                note.created_at.to_rfc3339(),
            ],
        )?;

        Ok(Note {
            id: conn.last_insert_rowid(),
            owner_username: note.owner_username.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_at: Some(note.created_at),
        })
    }

    fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, owner_username, title, content, created_at FROM notes WHERE id = ?1",
            params![id],
            |row| {
                Ok(Note {
                    id: row.get(0)?,
                    owner_username: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    created_at: row
                        .get::<_, Option<String>>(4)?
                        .map(|s| parse_note_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_notes(&self) -> Result<Vec<Note>> {
        let conn = self.conn();
        // Newest first; rows with an unknown timestamp sort last.
        let mut stmt = conn.prepare(
            "SELECT id, owner_username, title, content, created_at
             FROM notes ORDER BY datetime(created_at) DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Note {
                id: row.get(0)?,
                owner_username: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                created_at: row
                    .get::<_, Option<String>>(4)?
                    .map(|s| parse_note_datetime(&s)),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_notes_by_owner(&self, owner_username: &str) -> Result<Vec<Note>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, owner_username, title, content, created_at
             FROM notes WHERE owner_username = ?1
             ORDER BY datetime(created_at) DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![owner_username], |row| {
            Ok(Note {
                id: row.get(0)?,
                owner_username: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                created_at: row
                    .get::<_, Option<String>>(4)?
                    .map(|s| parse_note_datetime(&s)),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_note(&self, id: i64, title: &str, content: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE notes SET title = ?1, content = ?2 WHERE id = ?3",
            params![title, content, id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_note(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM notes WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Session operations

    fn create_session(&self, session: &Session) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO sessions (id, token_hash, token_lookup, account_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.token_hash,
                session.token_lookup,
                session.account_id,
                format_datetime(&session.created_at),
                session.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict("session lookup collision".to_string()))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, account_id, created_at, expires_at
             FROM sessions WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    account_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: row
                        .get::<_, Option<String>>(5)?
                        .map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Admin bootstrap check

    fn has_admin_account(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
