//! SQL schema for the chat-update store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS threads (
    thread_id TEXT PRIMARY KEY,
    kind_json TEXT NOT NULL          -- JSON-encoded ThreadKind
);

-- Insertion order is the timeline order; `seq` is never reused.
CREATE TABLE IF NOT EXISTS chat_updates (
    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
    interaction_id TEXT NOT NULL UNIQUE,
    thread_id      TEXT NOT NULL REFERENCES threads(thread_id),
    timestamp      TEXT NOT NULL,    -- RFC 3339 UTC
    kind           TEXT NOT NULL,    -- payload name, for inspection only
    payload_json   TEXT NOT NULL     -- JSON-encoded ChatUpdateKind
);

CREATE INDEX IF NOT EXISTS chat_updates_thread_idx ON chat_updates(thread_id, seq);

PRAGMA user_version = 1;
";
