//! [`ExploreService`]: request validation and page assembly around a
//! [`DecisionStore`].
//!
//! Transport-agnostic: the axum handlers in this crate are thin wrappers,
//! and tests can call the service directly.

use std::sync::Arc;

use explore_core::{
  cursor::Cursor,
  page::LikerPage,
  store::DecisionStore,
  wire::{
    CountLikedYouRequest, CountLikedYouResponse, ListLikedYouRequest,
    ListLikedYouResponse, PutDecisionRequest, PutDecisionResponse,
  },
};

use crate::error::ApiError;

/// Page size for both listing endpoints; callers cannot change it.
pub const PAGE_SIZE: usize = 50;

pub struct ExploreService<S> {
  store: Arc<S>,
}

impl<S> Clone for ExploreService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: DecisionStore> ExploreService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// `ListLikedYou`: everyone who liked the recipient, newest first.
  pub async fn list_liked_you(
    &self,
    req: &ListLikedYouRequest,
  ) -> Result<ListLikedYouResponse, ApiError> {
    let recipient = require("recipient user id", &req.recipient_user_id)?;
    let cursor = decode_token(req.pagination_token.as_deref())?;

    let page = self
      .store
      .list_likers_by_recipient(recipient, cursor.as_ref(), PAGE_SIZE)
      .await
      .map_err(|e| ApiError::from_store("failed to fetch likers", e))?;
    Ok(into_response(page))
  }

  /// `ListNewLikedYou`: likers the recipient has not liked back yet.
  pub async fn list_new_liked_you(
    &self,
    req: &ListLikedYouRequest,
  ) -> Result<ListLikedYouResponse, ApiError> {
    let recipient = require("recipient user id", &req.recipient_user_id)?;
    let cursor = decode_token(req.pagination_token.as_deref())?;

    let page = self
      .store
      .list_new_likers_by_recipient(recipient, cursor.as_ref(), PAGE_SIZE)
      .await
      .map_err(|e| ApiError::from_store("failed to fetch new likers", e))?;
    Ok(into_response(page))
  }

  /// `CountLikedYou`.
  pub async fn count_liked_you(
    &self,
    req: &CountLikedYouRequest,
  ) -> Result<CountLikedYouResponse, ApiError> {
    let recipient = require("recipient user id", &req.recipient_user_id)?;

    let count = self
      .store
      .count_likers_by_recipient(recipient)
      .await
      .map_err(|e| ApiError::from_store("failed to count likers", e))?;
    Ok(CountLikedYouResponse { count })
  }

  /// `PutDecision`: record a like or pass and report a new match.
  pub async fn put_decision(
    &self,
    req: &PutDecisionRequest,
  ) -> Result<PutDecisionResponse, ApiError> {
    let actor = require("actor user id", &req.actor_user_id)?;
    let recipient = require("recipient user id", &req.recipient_user_id)?;

    let mutual_likes = self
      .store
      .create_or_update_decision(actor, recipient, req.liked_recipient)
      .await
      .map_err(|e| ApiError::from_store("failed to put decision", e))?;

    if mutual_likes {
      tracing::info!(actor_id = actor, recipient_id = recipient, "mutual like");
    }
    Ok(PutDecisionResponse { mutual_likes })
  }
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ApiError> {
  if value.is_empty() {
    return Err(ApiError::InvalidArgument(format!("missing {field}")));
  }
  Ok(value)
}

/// An absent or empty token means "first page".
fn decode_token(token: Option<&str>) -> Result<Option<Cursor>, ApiError> {
  match token {
    None | Some("") => Ok(None),
    Some(t) => Cursor::decode(t)
      .map(Some)
      .map_err(|e| ApiError::InvalidArgument(e.to_string())),
  }
}

fn into_response(page: LikerPage) -> ListLikedYouResponse {
  ListLikedYouResponse {
    likers:                page.likers,
    next_pagination_token: page.next_cursor.as_ref().map(Cursor::encode),
  }
}

#[cfg(test)]
mod tests {
  use chrono::DateTime;
  use explore_core::{ErrorKind, decision::Liker};
  use explore_store_memory::MemoryStore;

  use super::*;

  fn service() -> ExploreService<MemoryStore> {
    ExploreService::new(Arc::new(MemoryStore::new()))
  }

  fn list_req(recipient: &str, token: Option<String>) -> ListLikedYouRequest {
    ListLikedYouRequest {
      recipient_user_id: recipient.to_owned(),
      pagination_token:  token,
    }
  }

  async fn seed(svc: &ExploreService<MemoryStore>, recipient: &str, n: i64) {
    for i in 0..n {
      let at = DateTime::from_timestamp(1_700_000_000 + i, 0).unwrap();
      svc
        .store()
        .put_decision_at(&format!("actor{i:03}"), recipient, true, at)
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn empty_recipient_is_rejected_before_the_store() {
    let svc = service();
    svc.store().set_offline(true);

    let err = svc.list_liked_you(&list_req("", None)).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(ref m) if m == "missing recipient user id"));
  }

  #[tokio::test]
  async fn empty_actor_is_rejected() {
    let err = service()
      .put_decision(&PutDecisionRequest {
        actor_user_id:     String::new(),
        recipient_user_id: "r".into(),
        liked_recipient:   true,
      })
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(ref m) if m == "missing actor user id"));
  }

  #[tokio::test]
  async fn malformed_token_is_invalid_argument() {
    let err = service()
      .list_new_liked_you(&list_req("r", Some("%%%".into())))
      .await
      .unwrap_err();
    match err {
      ApiError::InvalidArgument(m) => assert!(m.contains("pagination token"), "{m}"),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn empty_token_means_first_page() {
    let svc = service();
    seed(&svc, "r", 3).await;
    let resp = svc.list_liked_you(&list_req("r", Some(String::new()))).await.unwrap();
    assert_eq!(resp.likers.len(), 3);
    assert!(resp.next_pagination_token.is_none());
  }

  #[tokio::test]
  async fn pages_are_fifty_long_and_chain_by_token() {
    let svc = service();
    seed(&svc, "r", 120).await;

    let mut seen: Vec<Liker> = Vec::new();
    let mut token = None;
    let mut sizes = Vec::new();
    loop {
      let resp = svc.list_liked_you(&list_req("r", token)).await.unwrap();
      sizes.push(resp.likers.len());
      seen.extend(resp.likers);
      token = resp.next_pagination_token;
      if token.is_none() {
        break;
      }
    }

    assert_eq!(sizes, vec![50, 50, 20]);
    assert_eq!(seen.len(), 120);
    assert_eq!(seen.first().unwrap().actor_id, "actor119");
    assert_eq!(seen.last().unwrap().actor_id, "actor000");
  }

  #[tokio::test]
  async fn storage_failure_is_internal_and_retryable() {
    let svc = service();
    svc.store().set_offline(true);

    let err = svc
      .count_liked_you(&CountLikedYouRequest { recipient_user_id: "r".into() })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::StorageUnavailable));
    assert!(err.is_retryable());
  }

  #[tokio::test]
  async fn rejected_write_is_internal_and_final() {
    let conn = tokio_rusqlite::Connection::open_in_memory().await.unwrap();
    let store = explore_store_sqlite::SqliteStore::new(conn.clone())
      .await
      .unwrap();
    conn
      .call(|conn| {
        conn.execute_batch(
          "CREATE TRIGGER no_self_likes BEFORE INSERT ON decisions
           WHEN NEW.actor_id = NEW.recipient_id
           BEGIN SELECT RAISE(ABORT, 'self like'); END;",
        )?;
        Ok(())
      })
      .await
      .unwrap();

    let svc = ExploreService::new(Arc::new(store));
    let err = svc
      .put_decision(&PutDecisionRequest {
        actor_user_id:     "a".into(),
        recipient_user_id: "a".into(),
        liked_recipient:   true,
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TransactionFailed));
    assert!(!err.is_retryable());
  }

  #[tokio::test]
  async fn put_decision_reports_mutual_on_second_like() {
    let svc = service();
    let like = |actor: &str, recipient: &str| PutDecisionRequest {
      actor_user_id:     actor.into(),
      recipient_user_id: recipient.into(),
      liked_recipient:   true,
    };

    assert!(!svc.put_decision(&like("a", "r")).await.unwrap().mutual_likes);
    assert!(svc.put_decision(&like("r", "a")).await.unwrap().mutual_likes);
  }
}
