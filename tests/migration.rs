//! Migration behavior driven in-process against fixture databases.

use rusqlite::Connection;

use jotter::migrate::migrate;
use jotter::store::SCHEMA;

const LEGACY_SCHEMA: &str = "
    CREATE TABLE user (
        id INTEGER PRIMARY KEY,
        username VARCHAR(80) NOT NULL UNIQUE,
        password_hash VARCHAR(128) NOT NULL,
        role VARCHAR(20)
    );
    CREATE TABLE note (
        id INTEGER PRIMARY KEY,
        member_id INTEGER NOT NULL,
        title VARCHAR(200),
        content TEXT,
        created_at DATETIME
    );
";

fn legacy_db() -> Connection {
    let conn = Connection::open_in_memory().expect("open source db");
    conn.execute_batch(LEGACY_SCHEMA).expect("create legacy schema");
    conn
}

fn seed_basic(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO user (id, username, password_hash, role) VALUES
            (1, 'alice', 'hashA', 'member'),
            (2, 'admin', 'hashB', 'admin');
         INSERT INTO note (id, member_id, title, content, created_at) VALUES
            (10, 1, 'T', 'C', '2023-05-01 10:00:00');",
    )
    .expect("seed source db");
}

#[test]
fn copies_accounts_and_rewrites_note_ownership() {
    let source = legacy_db();
    seed_basic(&source);
    let mut dest = Connection::open_in_memory().expect("open dest db");

    let summary = migrate(&source, &mut dest).expect("migrate");

    assert_eq!(summary.accounts_copied, 2);
    assert_eq!(summary.accounts_skipped, 0);
    assert_eq!(summary.notes_copied, 1);
    assert_eq!(summary.notes_skipped, 0);
    assert_eq!(summary.malformed_timestamps, 0);

    let (username, hash, role): (String, String, String) = dest
        .query_row(
            "SELECT username, password_hash, role FROM accounts WHERE id = 1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .expect("account row");
    assert_eq!(username, "alice");
    assert_eq!(hash, "hashA");
    assert_eq!(role, "member");

    let (owner, created_at): (String, String) = dest
        .query_row(
            "SELECT owner_username, created_at FROM notes WHERE id = 10",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .expect("note row");
    assert_eq!(owner, "alice");
    assert_eq!(created_at, "2023-05-01T10:00:00+07:00");
}

#[test]
fn second_run_makes_no_changes() {
    let source = legacy_db();
    seed_basic(&source);
    let mut dest = Connection::open_in_memory().expect("open dest db");

    migrate(&source, &mut dest).expect("first run");
    let second = migrate(&source, &mut dest).expect("second run");

    assert_eq!(second.accounts_copied, 0);
    assert_eq!(second.accounts_skipped, 2);
    assert_eq!(second.notes_copied, 0);
    assert_eq!(second.notes_skipped, 1);

    let accounts: i64 = dest
        .query_row("SELECT COUNT(*) FROM accounts", [], |r| r.get(0))
        .expect("count accounts");
    let notes: i64 = dest
        .query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))
        .expect("count notes");
    assert_eq!(accounts, 2);
    assert_eq!(notes, 1);
}

#[test]
fn existing_destination_account_is_left_untouched() {
    let source = legacy_db();
    seed_basic(&source);

    let mut dest = Connection::open_in_memory().expect("open dest db");
    dest.execute_batch(SCHEMA).expect("create dest schema");
    dest.execute(
        "INSERT INTO accounts (id, username, password_hash, role)
         VALUES (7, 'alice', 'already-migrated-hash', 'member')",
        [],
    )
    .expect("insert account");

    let summary = migrate(&source, &mut dest).expect("migrate");
    assert_eq!(summary.accounts_copied, 1);
    assert_eq!(summary.accounts_skipped, 1);

    // The pre-existing row keeps its hash, and alice's note still resolves
    // to her name.
    let hash: String = dest
        .query_row(
            "SELECT password_hash FROM accounts WHERE username = 'alice'",
            [],
            |r| r.get(0),
        )
        .expect("account row");
    assert_eq!(hash, "already-migrated-hash");

    let owner: String = dest
        .query_row("SELECT owner_username FROM notes WHERE id = 10", [], |r| {
            r.get(0)
        })
        .expect("note row");
    assert_eq!(owner, "alice");
}

#[test]
fn malformed_timestamps_become_null_without_aborting() {
    let source = legacy_db();
    source
        .execute_batch(
            "INSERT INTO user (id, username, password_hash, role) VALUES
                (1, 'alice', 'hashA', 'member');
             INSERT INTO note (id, member_id, title, content, created_at) VALUES
                (10, 1, 'a', 'x', 'definitely not a date'),
                (11, 1, 'b', 'y', 12345),
                (12, 1, 'c', 'z', NULL);",
        )
        .expect("seed source db");
    let mut dest = Connection::open_in_memory().expect("open dest db");

    let summary = migrate(&source, &mut dest).expect("migrate");

    // All three rows land; two were malformed, the explicit NULL is not.
    assert_eq!(summary.notes_copied, 3);
    assert_eq!(summary.malformed_timestamps, 2);

    let nulls: i64 = dest
        .query_row(
            "SELECT COUNT(*) FROM notes WHERE created_at IS NULL",
            [],
            |r| r.get(0),
        )
        .expect("count nulls");
    assert_eq!(nulls, 3);
}

#[test]
fn unknown_role_is_copied_verbatim() {
    let source = legacy_db();
    source
        .execute(
            "INSERT INTO user (id, username, password_hash, role)
             VALUES (1, 'eve', 'h', 'superuser')",
            [],
        )
        .expect("insert user");
    let mut dest = Connection::open_in_memory().expect("open dest db");

    migrate(&source, &mut dest).expect("migrate");

    let role: String = dest
        .query_row("SELECT role FROM accounts WHERE id = 1", [], |r| r.get(0))
        .expect("account row");
    assert_eq!(role, "superuser");
}

#[test]
fn null_role_defaults_to_member() {
    let source = legacy_db();
    source
        .execute(
            "INSERT INTO user (id, username, password_hash, role)
             VALUES (1, 'norole', 'h', NULL)",
            [],
        )
        .expect("insert user");
    let mut dest = Connection::open_in_memory().expect("open dest db");

    migrate(&source, &mut dest).expect("migrate");

    let role: String = dest
        .query_row("SELECT role FROM accounts WHERE id = 1", [], |r| r.get(0))
        .expect("account row");
    assert_eq!(role, "member");
}

#[test]
fn note_with_dangling_owner_is_skipped() {
    let source = legacy_db();
    source
        .execute_batch(
            "INSERT INTO user (id, username, password_hash, role) VALUES
                (1, 'alice', 'hashA', 'member');
             INSERT INTO note (id, member_id, title, content, created_at) VALUES
                (10, 1, 'ok', 'x', NULL),
                (11, 99, 'orphan', 'y', NULL);",
        )
        .expect("seed source db");
    let mut dest = Connection::open_in_memory().expect("open dest db");

    let summary = migrate(&source, &mut dest).expect("migrate");
    assert_eq!(summary.notes_copied, 1);
    assert_eq!(summary.notes_skipped, 1);

    let count: i64 = dest
        .query_row("SELECT COUNT(*) FROM notes", [], |r| r.get(0))
        .expect("count notes");
    assert_eq!(count, 1);
}

#[test]
fn aware_timestamp_keeps_its_offset() {
    let source = legacy_db();
    source
        .execute_batch(
            "INSERT INTO user (id, username, password_hash, role) VALUES
                (1, 'alice', 'hashA', 'member');
             INSERT INTO note (id, member_id, title, content, created_at) VALUES
                (10, 1, 'utc', 'x', '2021-05-01T10:00:00+00:00');",
        )
        .expect("seed source db");
    let mut dest = Connection::open_in_memory().expect("open dest db");

    migrate(&source, &mut dest).expect("migrate");

    let created_at: String = dest
        .query_row("SELECT created_at FROM notes WHERE id = 10", [], |r| {
            r.get(0)
        })
        .expect("note row");
    assert_eq!(created_at, "2021-05-01T10:00:00+00:00");
}

#[test]
fn migrated_notes_read_back_through_the_store() {
    let source = legacy_db();
    seed_basic(&source);

    let temp = tempfile::TempDir::new().expect("create temp dir");
    let db_path = temp.path().join("jotter.db");

    {
        let mut dest = Connection::open(&db_path).expect("open dest db");
        migrate(&source, &mut dest).expect("migrate");
    }

    use jotter::store::{SqliteStore, Store};
    let store = SqliteStore::new(&db_path).expect("open store");

    let notes = store.list_notes().expect("list notes");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, 10);
    assert_eq!(notes[0].owner_username, "alice");

    let created_at = notes[0].created_at.expect("timestamp");
    assert_eq!(created_at.offset().local_minus_utc(), 7 * 3600);
    assert_eq!(created_at.to_rfc3339(), "2023-05-01T10:00:00+07:00");
}
