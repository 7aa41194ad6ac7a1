//! One-shot import of a legacy database.
//!
//! The legacy schema kept singular `user` and `note` tables, pointed notes at
//! their owner through a numeric `member_id` column, and stored `created_at`
//! however the writing process felt like that day (naive text, offset text,
//! blobs, sometimes junk). This module copies everything into the current
//! schema: accounts keep their ids, names, hashes and role strings verbatim;
//! notes keep their ids but swap the numeric owner reference for the owner's
//! account name; timestamps come out timezone-aware with naive values pinned
//! to +07:00.
//!
//! Re-running against a populated destination is safe: accounts are skipped
//! by name, notes by id.

mod timestamp;

pub use timestamp::normalize_timestamp;

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, params, types::Value};

use crate::error::Result;
use crate::store::SCHEMA;

/// Counts reported by a completed migration run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub accounts_copied: u64,
    pub accounts_skipped: u64,
    pub notes_copied: u64,
    pub notes_skipped: u64,
    pub malformed_timestamps: u64,
}

/// Copies all legacy accounts and notes from `source` into `dest`.
///
/// Accounts land in a single transaction before any note is written; notes
/// commit one by one, so an interrupted run leaves a valid prefix behind and
/// the next run picks up where it stopped. `source` is never written.
pub fn migrate(source: &Connection, dest: &mut Connection) -> Result<MigrationSummary> {
    dest.execute_batch(SCHEMA)?;

    let mut summary = MigrationSummary::default();

    tracing::info!("Copying accounts");
    let owners = copy_accounts(source, dest, &mut summary)?;
    tracing::info!(
        "Accounts done: {} copied, {} skipped",
        summary.accounts_copied,
        summary.accounts_skipped
    );

    tracing::info!("Copying notes");
    copy_notes(source, dest, &owners, &mut summary)?;
    tracing::info!(
        "Notes done: {} copied, {} skipped, {} malformed timestamps",
        summary.notes_copied,
        summary.notes_skipped,
        summary.malformed_timestamps
    );

    Ok(summary)
}

struct LegacyAccount {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
}

struct LegacyNote {
    id: i64,
    member_id: i64,
    title: String,
    content: String,
    created_at: Value,
}

/// Copies the legacy `user` table and returns the id-to-name map notes
/// resolve their owner through. Skipped accounts still enter the map; their
/// notes must keep resolving.
fn copy_accounts(
    source: &Connection,
    dest: &mut Connection,
    summary: &mut MigrationSummary,
) -> Result<HashMap<i64, String>> {
    let mut stmt =
        source.prepare("SELECT id, username, password_hash, role FROM user ORDER BY id")?;
    let accounts = stmt
        .query_map([], |row| {
            Ok(LegacyAccount {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                // The legacy column is nullable with an application-side
                // default of member.
                role: row
                    .get::<_, Option<String>>(3)?
                    .unwrap_or_else(|| "member".to_string()),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut owners = HashMap::with_capacity(accounts.len());

    let tx = dest.transaction()?;
    for account in &accounts {
        owners.insert(account.id, account.username.clone());

        let exists: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM accounts WHERE username = ?1",
                params![account.username],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            tracing::warn!("Skipping account '{}': already present", account.username);
            summary.accounts_skipped += 1;
            continue;
        }

        // Role strings are copied verbatim, even unknown ones. The live
        // read path decides what an unknown role means.
        tx.execute(
            "INSERT INTO accounts (id, username, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
            params![
                account.id,
                account.username,
                account.password_hash,
                account.role
            ],
        )?;
        summary.accounts_copied += 1;
    }
    tx.commit()?;

    Ok(owners)
}

fn copy_notes(
    source: &Connection,
    dest: &Connection,
    owners: &HashMap<i64, String>,
    summary: &mut MigrationSummary,
) -> Result<()> {
    let mut stmt =
        source.prepare("SELECT id, member_id, title, content, created_at FROM note ORDER BY id")?;
    let notes = stmt
        .query_map([], |row| {
            Ok(LegacyNote {
                id: row.get(0)?,
                member_id: row.get(1)?,
                title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                content: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for note in notes {
        let exists: Option<i64> = dest
            .query_row(
                "SELECT 1 FROM notes WHERE id = ?1",
                params![note.id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            tracing::warn!("Skipping note {}: already present", note.id);
            summary.notes_skipped += 1;
            continue;
        }

        let Some(owner_username) = owners.get(&note.member_id) else {
            tracing::warn!(
                "Skipping note {}: owner id {} not found in source accounts",
                note.id,
                note.member_id
            );
            summary.notes_skipped += 1;
            continue;
        };

        let created_at = match normalize_timestamp(&note.created_at) {
            Ok(ts) => ts.map(|dt| dt.to_rfc3339()),
            Err(e) => {
                tracing::warn!("Note {}: {}, storing null timestamp", note.id, e);
                summary.malformed_timestamps += 1;
                None
            }
        };

        dest.execute(
            "INSERT INTO notes (id, owner_username, title, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![note.id, owner_username, note.title, note.content, created_at],
        )?;
        summary.notes_copied += 1;
    }

    Ok(())
}
