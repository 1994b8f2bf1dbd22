//! JSON API for the explore "liked you" service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`explore_core::store::DecisionStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(explore_api::api_router(store.clone()))
//! ```

pub mod decisions;
pub mod error;
pub mod liked_you;
pub mod service;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use explore_core::store::DecisionStore;

pub use error::ApiError;
pub use service::{ExploreService, PAGE_SIZE};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DecisionStore + 'static,
{
  Router::new()
    .route("/liked-you", get(liked_you::list::<S>))
    .route("/liked-you/new", get(liked_you::list_new::<S>))
    .route("/liked-you/count", get(liked_you::count::<S>))
    .route("/decisions", put(decisions::put::<S>))
    .with_state(ExploreService::new(store))
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use chrono::DateTime;
  use explore_core::wire::{
    CountLikedYouResponse, ErrorResponse, ListLikedYouResponse,
    PutDecisionResponse,
  };
  use explore_store_memory::MemoryStore;
  use explore_store_sqlite::SqliteStore;
  use serde::de::DeserializeOwned;
  use tower::ServiceExt as _;

  async fn oneshot<S>(store: Arc<S>, method: &str, uri: &str, body: Option<&str>) -> Response
  where
    S: DecisionStore + 'static,
  {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_owned())
      }
      None => Body::empty(),
    };
    api_router(store)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn json<T: DeserializeOwned>(resp: Response) -> T {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn seeded_memory(recipient: &str, likers: &[(&str, i64)]) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    for (actor, secs) in likers {
      let at = DateTime::from_timestamp(*secs, 0).unwrap();
      store.put_decision_at(actor, recipient, true, at).await.unwrap();
    }
    Arc::new(store)
  }

  // ── Listing ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn liked_you_returns_likers_newest_first() {
    let store = seeded_memory("r1", &[
      ("a6", 1_738_200_000),
      ("a4", 1_738_400_000),
      ("a5", 1_738_300_000),
    ])
    .await;

    let resp = oneshot(store, "GET", "/liked-you?recipient_user_id=r1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ListLikedYouResponse = json(resp).await;
    let ids: Vec<_> = body.likers.iter().map(|l| l.actor_id.as_str()).collect();
    assert_eq!(ids, vec!["a4", "a5", "a6"]);
    assert_eq!(body.likers[0].unix_timestamp, 1_738_400_000);
    assert!(body.next_pagination_token.is_none());
  }

  #[tokio::test]
  async fn liked_you_follows_tokens_to_the_last_page() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for i in 0..55 {
      let at = DateTime::from_timestamp(1_700_000_000 + i / 2, 0).unwrap();
      store
        .put_decision_at(&format!("u{i:02}"), "r", true, at)
        .await
        .unwrap();
    }
    let store = Arc::new(store);

    let first: ListLikedYouResponse = json(
      oneshot(store.clone(), "GET", "/liked-you?recipient_user_id=r", None).await,
    )
    .await;
    assert_eq!(first.likers.len(), 50);
    let token = first.next_pagination_token.expect("second page");

    // Base64 may contain '+', '/' and '='; escape them for the query string.
    let escaped: String = token
      .chars()
      .map(|c| match c {
        '+' => "%2B".to_owned(),
        '/' => "%2F".to_owned(),
        '=' => "%3D".to_owned(),
        c => c.to_string(),
      })
      .collect();
    let second: ListLikedYouResponse = json(
      oneshot(
        store,
        "GET",
        &format!("/liked-you?recipient_user_id=r&pagination_token={escaped}"),
        None,
      )
      .await,
    )
    .await;
    assert_eq!(second.likers.len(), 5);
    assert!(second.next_pagination_token.is_none());

    let mut all: Vec<_> = first.likers.into_iter().chain(second.likers).collect();
    let total = all.len();
    all.dedup_by(|a, b| a.actor_id == b.actor_id);
    assert_eq!(all.len(), total);
    assert_eq!(total, 55);
  }

  #[tokio::test]
  async fn new_liked_you_hides_mutual_likes() {
    let store = seeded_memory("r", &[("a", 100), ("b", 200)]).await;
    store
      .put_decision_at("r", "a", true, DateTime::from_timestamp(300, 0).unwrap())
      .await
      .unwrap();

    let body: ListLikedYouResponse = json(
      oneshot(store, "GET", "/liked-you/new?recipient_user_id=r", None).await,
    )
    .await;
    let ids: Vec<_> = body.likers.iter().map(|l| l.actor_id.as_str()).collect();
    assert_eq!(ids, vec!["b"]);
  }

  #[tokio::test]
  async fn count_liked_you() {
    let store = seeded_memory("r", &[("a", 1), ("b", 2), ("c", 3)]).await;
    let resp = oneshot(store, "GET", "/liked-you/count?recipient_user_id=r", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: CountLikedYouResponse = json(resp).await;
    assert_eq!(body.count, 3);
  }

  // ── Decisions ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn put_decision_reports_mutual_likes() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());

    let first: PutDecisionResponse = json(
      oneshot(
        store.clone(),
        "PUT",
        "/decisions",
        Some(r#"{"actor_user_id":"a","recipient_user_id":"r","liked_recipient":true}"#),
      )
      .await,
    )
    .await;
    assert!(!first.mutual_likes);

    let second: PutDecisionResponse = json(
      oneshot(
        store,
        "PUT",
        "/decisions",
        Some(r#"{"actor_user_id":"r","recipient_user_id":"a","liked_recipient":true}"#),
      )
      .await,
    )
    .await;
    assert!(second.mutual_likes);
  }

  // ── Errors ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_recipient_returns_400() {
    let store = Arc::new(MemoryStore::new());
    let resp = oneshot(store, "GET", "/liked-you", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json(resp).await;
    assert_eq!(body.error, "missing recipient user id");
  }

  #[tokio::test]
  async fn missing_actor_returns_400() {
    let store = Arc::new(MemoryStore::new());
    let resp = oneshot(
      store,
      "PUT",
      "/decisions",
      Some(r#"{"recipient_user_id":"r","liked_recipient":false}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json(resp).await;
    assert_eq!(body.error, "missing actor user id");
  }

  #[tokio::test]
  async fn garbage_token_returns_400_with_reason() {
    let store = Arc::new(MemoryStore::new());
    let resp = oneshot(
      store,
      "GET",
      "/liked-you/new?recipient_user_id=r&pagination_token=not-a-token",
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json(resp).await;
    assert!(body.error.starts_with("malformed pagination token"), "{}", body.error);
  }

  #[tokio::test]
  async fn storage_failure_returns_generic_500() {
    let store = Arc::new(MemoryStore::new());
    store.set_offline(true);

    let resp = oneshot(store, "GET", "/liked-you/count?recipient_user_id=r", None).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = json(resp).await;
    assert_eq!(body.error, "internal error");
  }
}
