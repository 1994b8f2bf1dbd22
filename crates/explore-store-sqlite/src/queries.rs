//! Synchronous statement bodies, run on the connection thread.
//!
//! Each function is one unit of work against a borrowed `rusqlite`
//! connection. [`SqliteStore`](crate::SqliteStore) moves them onto the
//! `tokio_rusqlite` thread.

use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};

use explore_core::decision::{Decision, Liker};

use crate::{
  Error, Result,
  encode::{RawDecision, RawLiker},
};

// ─── Listings ────────────────────────────────────────────────────────────────

/// Which likers a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
  /// Everyone who liked the recipient.
  All,
  /// Likers the recipient has not liked back.
  New,
}

impl Listing {
  pub fn op(self) -> &'static str {
    match self {
      Listing::All => "list likers",
      Listing::New => "list new likers",
    }
  }

  fn base_sql(self) -> &'static str {
    match self {
      Listing::All => {
        "SELECT d.actor_id, d.updated_at
         FROM decisions d
         WHERE d.recipient_id = ?1 AND d.liked = 1"
      }
      Listing::New => {
        "SELECT d.actor_id, d.updated_at
         FROM decisions d
         LEFT JOIN decisions back
           ON  back.actor_id     = d.recipient_id
           AND back.recipient_id = d.actor_id
           AND back.liked        = 1
         WHERE d.recipient_id = ?1 AND d.liked = 1
           AND back.actor_id IS NULL"
      }
    }
  }
}

/// Rows strictly after `(updated_at, actor_id)` in descending order.
const KEYSET: &str = "
  AND (d.updated_at < ?2 OR (d.updated_at = ?2 AND d.actor_id < ?3))";

const ORDER: &str = "
  ORDER BY d.updated_at DESC, d.actor_id DESC";

/// Fetch up to `fetch` likers of `recipient_id`, resuming after `keyset` if
/// given.
pub fn list_likers(
  conn: &Connection,
  listing: Listing,
  recipient_id: &str,
  keyset: Option<(i64, String)>,
  fetch: i64,
) -> Result<Vec<Liker>> {
  let op = listing.op();
  let base = listing.base_sql();

  let raws = match keyset {
    Some((updated_at, actor_id)) => {
      let sql = format!("{base}{KEYSET}{ORDER} LIMIT ?4");
      let mut stmt = conn.prepare(&sql).map_err(|e| Error::query(op, e))?;
      let rows = stmt
        .query_map(
          params![recipient_id, updated_at, actor_id, fetch],
          RawLiker::from_row,
        )
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| Error::query(op, e))?;
      rows
    }
    None => {
      let sql = format!("{base}{ORDER} LIMIT ?2");
      let mut stmt = conn.prepare(&sql).map_err(|e| Error::query(op, e))?;
      let rows = stmt
        .query_map(params![recipient_id, fetch], RawLiker::from_row)
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| Error::query(op, e))?;
      rows
    }
  };

  raws.into_iter().map(|raw| raw.into_liker(op)).collect()
}

pub fn count_likers(conn: &Connection, recipient_id: &str) -> Result<u64> {
  const OP: &str = "count likers";

  let count: i64 = conn
    .query_row(
      "SELECT COUNT(*) FROM decisions WHERE recipient_id = ?1 AND liked = 1",
      params![recipient_id],
      |row| row.get(0),
    )
    .map_err(|e| Error::query(OP, e))?;

  u64::try_from(count).map_err(|_| Error::Scan {
    op:     OP,
    reason: format!("negative count {count}"),
  })
}

// ─── Decisions ───────────────────────────────────────────────────────────────

const UPSERT: &str = "
  INSERT INTO decisions (actor_id, recipient_id, liked, created_at, updated_at)
  VALUES (?1, ?2, ?3, ?4, ?4)
  ON CONFLICT (actor_id, recipient_id)
  DO UPDATE SET liked = excluded.liked, updated_at = excluded.updated_at";

const RECIPROCAL: &str = "
  SELECT EXISTS (
    SELECT 1 FROM decisions
    WHERE actor_id = ?1 AND recipient_id = ?2 AND liked = 1
  )";

/// Upsert a decision and, for a like, check for the reciprocal like, all in
/// one `IMMEDIATE` transaction.
///
/// Any early return drops the transaction, which rolls it back.
pub fn put_decision(
  conn: &mut Connection,
  actor_id: &str,
  recipient_id: &str,
  liked: bool,
  now: i64,
) -> Result<bool> {
  const OP: &str = "put decision";

  let tx = conn
    .transaction_with_behavior(TransactionBehavior::Immediate)
    .map_err(|e| Error::transaction(OP, "begin", e))?;

  tx.execute(UPSERT, params![actor_id, recipient_id, liked, now])
    .map_err(|e| Error::transaction(OP, "upsert", e))?;

  let mutual = if liked {
    tx.query_row(RECIPROCAL, params![recipient_id, actor_id], |row| {
      row.get::<_, bool>(0)
    })
    .map_err(|e| Error::transaction(OP, "mutual check", e))?
  } else {
    false
  };

  tx.commit()
    .map_err(|e| Error::transaction(OP, "commit", e))?;

  Ok(mutual)
}

pub fn get_decision(
  conn: &Connection,
  actor_id: &str,
  recipient_id: &str,
) -> Result<Option<Decision>> {
  const OP: &str = "get decision";

  let raw = conn
    .query_row(
      "SELECT actor_id, recipient_id, liked, created_at, updated_at
       FROM decisions WHERE actor_id = ?1 AND recipient_id = ?2",
      params![actor_id, recipient_id],
      RawDecision::from_row,
    )
    .optional()
    .map_err(|e| Error::query(OP, e))?;

  raw.map(|r| r.into_decision(OP)).transpose()
}

pub fn ping(conn: &Connection) -> Result<()> {
  conn
    .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
    .map_err(|e| Error::query("ping", e))?;
  Ok(())
}
