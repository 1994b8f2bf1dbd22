//! [`SqliteStore`]: the SQLite implementation of [`DecisionStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use explore_core::{
  cursor::Cursor,
  decision::Decision,
  page::{LikerPage, effective_limit},
  store::DecisionStore,
};

use crate::{
  Error, Result,
  encode::encode_ts,
  queries::{self, Listing},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A decision store backed by a SQLite database.
///
/// Cloning is cheap; the inner connection is reference-counted, and every
/// clone shares it.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Wrap a connection owned by the caller and run schema initialisation.
  ///
  /// The store does not close the connection; other clones of it stay
  /// usable alongside the store.
  pub async fn new(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open (or create) a store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(|source| Error::Unavailable { op: "open", source })?;
    Self::new(conn).await
  }

  /// Open an in-memory store, for tests and ephemeral runs.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(|source| Error::Unavailable { op: "open", source })?;
    Self::new(conn).await
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .run("init schema", |conn| {
        conn
          .execute_batch(SCHEMA)
          .map_err(|e| Error::query("init schema", e))
      })
      .await
  }

  /// Move `f` onto the connection thread and wait for its result.
  async fn run<R, F>(&self, op: &'static str, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(f(conn)))
      .await
      .map_err(|source| Error::Unavailable { op, source })?
  }

  /// Round-trip a trivial query to prove the connection is usable.
  pub async fn ping(&self) -> Result<()> {
    self.run("ping", |conn| queries::ping(conn)).await
  }

  /// [`DecisionStore::create_or_update_decision`] with an explicit clock
  /// reading for `updated_at` (and `created_at` on first insert).
  pub async fn put_decision_at(
    &self,
    actor_id: &str,
    recipient_id: &str,
    liked: bool,
    at: DateTime<Utc>,
  ) -> Result<bool> {
    let actor = actor_id.to_owned();
    let recipient = recipient_id.to_owned();
    let now = encode_ts(at);

    let mutual = self
      .run("put decision", move |conn| {
        queries::put_decision(conn, &actor, &recipient, liked, now)
      })
      .await?;

    tracing::debug!(actor_id, recipient_id, liked, mutual, "decision recorded");
    Ok(mutual)
  }

  /// Read back the decision `actor_id` made about `recipient_id`.
  pub async fn get_decision(
    &self,
    actor_id: &str,
    recipient_id: &str,
  ) -> Result<Option<Decision>> {
    let actor = actor_id.to_owned();
    let recipient = recipient_id.to_owned();
    self
      .run("get decision", move |conn| {
        queries::get_decision(conn, &actor, &recipient)
      })
      .await
  }

  async fn list(
    &self,
    listing: Listing,
    recipient_id: &str,
    cursor: Option<&Cursor>,
    limit: usize,
  ) -> Result<LikerPage> {
    let limit = effective_limit(limit);
    let fetch = i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX);
    let recipient = recipient_id.to_owned();
    let keyset = cursor.map(|c| (c.unix_seconds(), c.actor_id.clone()));

    let rows = self
      .run(listing.op(), move |conn| {
        queries::list_likers(conn, listing, &recipient, keyset, fetch)
      })
      .await?;

    tracing::debug!(
      recipient_id,
      op = listing.op(),
      rows = rows.len(),
      limit,
      "listed likers"
    );
    Ok(LikerPage::from_overfetched(rows, limit)?)
  }
}

// ─── DecisionStore impl ──────────────────────────────────────────────────────

impl DecisionStore for SqliteStore {
  type Error = Error;

  async fn list_likers_by_recipient(
    &self,
    recipient_id: &str,
    cursor: Option<&Cursor>,
    limit: usize,
  ) -> Result<LikerPage> {
    self.list(Listing::All, recipient_id, cursor, limit).await
  }

  async fn list_new_likers_by_recipient(
    &self,
    recipient_id: &str,
    cursor: Option<&Cursor>,
    limit: usize,
  ) -> Result<LikerPage> {
    self.list(Listing::New, recipient_id, cursor, limit).await
  }

  async fn count_likers_by_recipient(&self, recipient_id: &str) -> Result<u64> {
    let recipient = recipient_id.to_owned();
    self
      .run("count likers", move |conn| queries::count_likers(conn, &recipient))
      .await
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
