//! Decisions and the liker projection read from them.
//!
//! A decision is a directional edge: one user (the actor) liking or passing
//! on another (the recipient). There is at most one decision per ordered
//! pair; re-deciding overwrites `liked` and refreshes `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored like/pass judgment from `actor_id` about `recipient_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
  pub actor_id:     String,
  pub recipient_id: String,
  pub liked:        bool,
  /// Set on first insert and never changed afterwards.
  pub created_at:   DateTime<Utc>,
  /// Refreshed on every upsert.
  pub updated_at:   DateTime<Utc>,
}

/// A user who liked a given recipient, as returned by the listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liker {
  pub actor_id:       String,
  /// The decision's `updated_at`, in whole seconds since the Unix epoch.
  pub unix_timestamp: u64,
}

impl Liker {
  pub fn new(actor_id: impl Into<String>, unix_timestamp: u64) -> Self {
    Self { actor_id: actor_id.into(), unix_timestamp }
  }
}
