//! Pagination cursors and their opaque token encoding.
//!
//! A cursor names the last row of a page in the listing order
//! (`updated_at` descending, then `actor_id` descending). The next page is
//! everything strictly after it.
//!
//! Tokens are standard base64 over a small JSON object:
//!
//! ```json
//! {"actor_id":"actor9","updated_at":"2025-02-05 10:00:00"}
//! ```
//!
//! The timestamp is written in UTC at one-second resolution, so anything
//! finer than a second does not survive a round trip.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::{Error, Result, decision::Liker};

/// Textual timestamp format used inside tokens.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A keyset position: `(updated_at, actor_id)` of the last row returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
  pub updated_at: DateTime<Utc>,
  pub actor_id:   String,
}

#[derive(Deserialize)]
struct TokenBody {
  updated_at: String,
  actor_id:   String,
}

impl Cursor {
  pub fn new(updated_at: DateTime<Utc>, actor_id: impl Into<String>) -> Self {
    Self { updated_at, actor_id: actor_id.into() }
  }

  /// The position just after `liker` in the listing order.
  ///
  /// Fails if the liker's timestamp is outside the range chrono can
  /// represent, which only happens for corrupted rows.
  pub fn after(liker: &Liker) -> Result<Self> {
    let updated_at = i64::try_from(liker.unix_timestamp)
      .ok()
      .and_then(|secs| DateTime::from_timestamp(secs, 0))
      .ok_or_else(|| {
        Error::Scan(format!(
          "timestamp {} out of range for liker {}",
          liker.unix_timestamp, liker.actor_id
        ))
      })?;
    Ok(Self::new(updated_at, liker.actor_id.clone()))
  }

  /// `updated_at` as whole seconds since the Unix epoch.
  pub fn unix_seconds(&self) -> i64 { self.updated_at.timestamp() }

  /// Serialise to an opaque token.
  pub fn encode(&self) -> String {
    let body = serde_json::json!({
      "updated_at": self.updated_at.format(TIMESTAMP_FORMAT).to_string(),
      "actor_id":   self.actor_id,
    });
    B64.encode(body.to_string())
  }

  /// Parse a token produced by [`Cursor::encode`].
  pub fn decode(token: &str) -> Result<Self> {
    let bytes = B64
      .decode(token)
      .map_err(|e| Error::MalformedToken(format!("not valid base64: {e}")))?;

    let body: TokenBody = serde_json::from_slice(&bytes)
      .map_err(|e| Error::MalformedToken(format!("invalid cursor record: {e}")))?;

    let updated_at = NaiveDateTime::parse_from_str(&body.updated_at, TIMESTAMP_FORMAT)
      .map_err(|e| {
        Error::MalformedToken(format!(
          "invalid 'updated_at' {:?}: {e}",
          body.updated_at
        ))
      })?
      .and_utc();

    Ok(Self { updated_at, actor_id: body.actor_id })
  }
}
