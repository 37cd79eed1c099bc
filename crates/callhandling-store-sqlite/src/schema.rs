//! SQL schema for the call handling SQLite store.
//!
//! Executed once at connection startup. There are no migrations; every
//! statement is idempotent.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS calls (
    call_id         INTEGER PRIMARY KEY,   -- caller-assigned
    sid             INTEGER NOT NULL,
    conversation_id INTEGER NOT NULL,
    ANI             TEXT    NOT NULL,
    DNIS            TEXT    NOT NULL,
    status          TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS callhandlings (
    callhandling_id TEXT PRIMARY KEY,      -- hyphenated lowercase UUID
    name            TEXT NOT NULL,
    deleted_at      TEXT                   -- RFC 3339; NULL while active
);

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- call_id is intentionally not a foreign key: events may arrive before the
-- call row does.
CREATE TABLE IF NOT EXISTS events (
    event_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    call_id     INTEGER NOT NULL,
    type        TEXT    NOT NULL,          -- EventType label
    identity_id INTEGER NOT NULL,
    timestamp   INTEGER NOT NULL,          -- caller-supplied
    meta        TEXT    NOT NULL,
    UNIQUE (call_id, type, identity_id, timestamp)
);

CREATE INDEX IF NOT EXISTS events_call_idx ON events(call_id, timestamp);
";
