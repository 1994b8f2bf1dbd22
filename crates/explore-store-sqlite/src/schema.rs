//! SQL schema for the explore SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per ordered (actor, recipient) pair. Rows are upserted, never
-- deleted.
CREATE TABLE IF NOT EXISTS decisions (
    actor_id     TEXT    NOT NULL,
    recipient_id TEXT    NOT NULL,
    liked        INTEGER NOT NULL,   -- 0 = pass, 1 = like
    created_at   INTEGER NOT NULL,   -- unix seconds; set on first insert
    updated_at   INTEGER NOT NULL,   -- unix seconds; refreshed on upsert
    PRIMARY KEY (actor_id, recipient_id)
);

-- Access path for the keyset scans over a recipient's likers.
CREATE INDEX IF NOT EXISTS decisions_recipient_idx
    ON decisions(recipient_id, updated_at, actor_id);

PRAGMA user_version = 1;
";
