pub const SCHEMA: &str = r#"
-- Accounts hold login credentials and a role
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,    -- argon2id hash with embedded salt
    role TEXT NOT NULL DEFAULT 'member'
);

-- Notes reference their owner by name, not by account id. There is no
-- foreign key on purpose: deleting an account leaves its notes behind.
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_username TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT                 -- RFC 3339, +07:00 offset; NULL = unknown
);

-- Sessions are auth credentials issued at login
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,     -- short random prefix for fast lookup
    account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT                 -- NULL = never
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner_username);
CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_lookup ON sessions(token_lookup);
CREATE INDEX IF NOT EXISTS idx_sessions_account ON sessions(account_id);
"#;
