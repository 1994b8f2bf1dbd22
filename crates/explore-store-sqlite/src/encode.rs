//! Conversions between domain types and SQLite column values.
//!
//! Timestamps are stored as INTEGER unix seconds, so ordering by column is
//! chronological and the resolution is one second. `liked` is stored as
//! 0/1.

use chrono::{DateTime, Utc};
use explore_core::decision::{Decision, Liker};

use crate::{Error, Result};

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

pub fn decode_ts(op: &'static str, secs: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0).ok_or_else(|| Error::Scan {
    op,
    reason: format!("timestamp {secs} out of range"),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns of a liker listing row.
pub struct RawLiker {
  pub actor_id:   String,
  pub updated_at: i64,
}

impl RawLiker {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { actor_id: row.get(0)?, updated_at: row.get(1)? })
  }

  pub fn into_liker(self, op: &'static str) -> Result<Liker> {
    let unix_timestamp = u64::try_from(self.updated_at).map_err(|_| Error::Scan {
      op,
      reason: format!(
        "negative updated_at {} for actor {}",
        self.updated_at, self.actor_id
      ),
    })?;
    Ok(Liker { actor_id: self.actor_id, unix_timestamp })
  }
}

/// A full `decisions` row.
pub struct RawDecision {
  pub actor_id:     String,
  pub recipient_id: String,
  pub liked:        bool,
  pub created_at:   i64,
  pub updated_at:   i64,
}

impl RawDecision {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      actor_id:     row.get(0)?,
      recipient_id: row.get(1)?,
      liked:        row.get(2)?,
      created_at:   row.get(3)?,
      updated_at:   row.get(4)?,
    })
  }

  pub fn into_decision(self, op: &'static str) -> Result<Decision> {
    Ok(Decision {
      actor_id:     self.actor_id,
      recipient_id: self.recipient_id,
      liked:        self.liked,
      created_at:   decode_ts(op, self.created_at)?,
      updated_at:   decode_ts(op, self.updated_at)?,
    })
  }
}
