//! In-memory backend for the explore decision store.
//!
//! Behaves like the SQLite backend (same ordering, keyset bounds, anti-join
//! and upsert rules) without any I/O, so adapters can be tested against it.
//! [`MemoryStore::set_offline`] makes every call fail with
//! [`Error::StorageUnavailable`] to exercise error paths.

use std::{
  collections::BTreeMap,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{DateTime, Utc};
use explore_core::{
  Error, Result,
  cursor::Cursor,
  decision::{Decision, Liker},
  page::{LikerPage, effective_limit},
  store::DecisionStore,
};
use tokio::sync::RwLock;

type Key = (String, String);

/// A decision store held in process memory.
///
/// Cloning is cheap; clones share the same decisions and the same offline
/// switch.
#[derive(Clone, Default)]
pub struct MemoryStore {
  decisions: Arc<RwLock<BTreeMap<Key, Decision>>>,
  offline:   Arc<AtomicBool>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// While offline, every operation fails with
  /// [`Error::StorageUnavailable`] and changes nothing.
  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  fn check_online(&self, op: &str) -> Result<()> {
    if self.offline.load(Ordering::SeqCst) {
      return Err(Error::StorageUnavailable(format!("{op}: store is offline")));
    }
    Ok(())
  }

  /// [`DecisionStore::create_or_update_decision`] with an explicit clock
  /// reading. `at` is truncated to whole seconds.
  pub async fn put_decision_at(
    &self,
    actor_id: &str,
    recipient_id: &str,
    liked: bool,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    self.check_online("put decision")?;
    let at = DateTime::from_timestamp(at.timestamp(), 0)
      .ok_or_else(|| Error::TransactionFailed(format!("put decision: bad clock {at}")))?;

    // One write guard covers the upsert and the reciprocal check.
    let mut decisions = self.decisions.write().await;
    decisions
      .entry((actor_id.to_owned(), recipient_id.to_owned()))
      .and_modify(|d| {
        d.liked = liked;
        d.updated_at = at;
      })
      .or_insert_with(|| Decision {
        actor_id: actor_id.to_owned(),
        recipient_id: recipient_id.to_owned(),
        liked,
        created_at: at,
        updated_at: at,
      });

    let mutual = liked && likes(&decisions, recipient_id, actor_id);
    tracing::debug!(actor_id, recipient_id, liked, mutual, "decision recorded");
    Ok(mutual)
  }

  /// Read back the decision `actor_id` made about `recipient_id`.
  pub async fn get_decision(
    &self,
    actor_id: &str,
    recipient_id: &str,
  ) -> Result<Option<Decision>> {
    self.check_online("get decision")?;
    let decisions = self.decisions.read().await;
    Ok(
      decisions
        .get(&(actor_id.to_owned(), recipient_id.to_owned()))
        .cloned(),
    )
  }

  async fn list(
    &self,
    op: &'static str,
    new_only: bool,
    recipient_id: &str,
    cursor: Option<&Cursor>,
    limit: usize,
  ) -> Result<LikerPage> {
    self.check_online(op)?;
    let limit = effective_limit(limit);
    let decisions = self.decisions.read().await;

    let mut rows = decisions
      .values()
      .filter(|d| d.recipient_id == recipient_id && d.liked)
      .filter(|d| !new_only || !likes(&decisions, recipient_id, &d.actor_id))
      .filter(|d| cursor.is_none_or(|c| is_after(d, c)))
      .map(|d| {
        u64::try_from(d.updated_at.timestamp())
          .map(|secs| Liker::new(d.actor_id.clone(), secs))
          .map_err(|_| Error::Scan(format!("{op}: negative updated_at for {}", d.actor_id)))
      })
      .collect::<Result<Vec<_>>>()?;

    rows.sort_by(|a, b| {
      b.unix_timestamp
        .cmp(&a.unix_timestamp)
        .then_with(|| b.actor_id.cmp(&a.actor_id))
    });
    rows.truncate(limit.saturating_add(1));

    LikerPage::from_overfetched(rows, limit)
  }
}

/// Whether `actor_id` currently likes `recipient_id`.
fn likes(decisions: &BTreeMap<Key, Decision>, actor_id: &str, recipient_id: &str) -> bool {
  decisions
    .get(&(actor_id.to_owned(), recipient_id.to_owned()))
    .is_some_and(|d| d.liked)
}

/// Whether `d` sorts strictly after `cursor` in descending listing order.
fn is_after(d: &Decision, cursor: &Cursor) -> bool {
  let secs = d.updated_at.timestamp();
  secs < cursor.unix_seconds()
    || (secs == cursor.unix_seconds() && d.actor_id < cursor.actor_id)
}

// ─── DecisionStore impl ──────────────────────────────────────────────────────

impl DecisionStore for MemoryStore {
  type Error = Error;

  async fn list_likers_by_recipient(
    &self,
    recipient_id: &str,
    cursor: Option<&Cursor>,
    limit: usize,
  ) -> Result<LikerPage> {
    self.list("list likers", false, recipient_id, cursor, limit).await
  }

  async fn list_new_likers_by_recipient(
    &self,
    recipient_id: &str,
    cursor: Option<&Cursor>,
    limit: usize,
  ) -> Result<LikerPage> {
    self.list("list new likers", true, recipient_id, cursor, limit).await
  }

  async fn count_likers_by_recipient(&self, recipient_id: &str) -> Result<u64> {
    self.check_online("count likers")?;
    let decisions = self.decisions.read().await;
    let count = decisions
      .values()
      .filter(|d| d.recipient_id == recipient_id && d.liked)
      .count();
    Ok(count as u64)
  }

  async fn create_or_update_decision(
    &self,
    actor_id: &str,
    recipient_id: &str,
    liked: bool,
  ) -> Result<bool> {
    self
      .put_decision_at(actor_id, recipient_id, liked, Utc::now())
      .await
  }
}
