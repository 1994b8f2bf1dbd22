//! The `DecisionStore` trait.
//!
//! Implemented by storage backends (`explore-store-sqlite`,
//! `explore-store-memory`). The service adapter depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::{cursor::Cursor, error::Classify, page::LikerPage};

/// Abstraction over a decision store backend.
///
/// Listings are ordered by `updated_at` descending with `actor_id` descending
/// as the tie-break, and are paginated by keyset: a page requested with a
/// cursor contains only rows strictly after that cursor in the ordering.
///
/// A `limit` of zero means [`DEFAULT_PAGE_SIZE`](crate::page::DEFAULT_PAGE_SIZE)
/// for both listing operations.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Dropping a future
/// cancels the call without leaving a partial write behind.
pub trait DecisionStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Likers of `recipient_id`, one page at a time.
  fn list_likers_by_recipient<'a>(
    &'a self,
    recipient_id: &'a str,
    cursor: Option<&'a Cursor>,
    limit: usize,
  ) -> impl Future<Output = Result<LikerPage, Self::Error>> + Send + 'a;

  /// Like [`list_likers_by_recipient`](Self::list_likers_by_recipient), but
  /// leaves out every actor that `recipient_id` has already liked back.
  fn list_new_likers_by_recipient<'a>(
    &'a self,
    recipient_id: &'a str,
    cursor: Option<&'a Cursor>,
    limit: usize,
  ) -> impl Future<Output = Result<LikerPage, Self::Error>> + Send + 'a;

  /// Total number of users who currently like `recipient_id`.
  fn count_likers_by_recipient<'a>(
    &'a self,
    recipient_id: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Record `actor_id`'s decision about `recipient_id` and report whether it
  /// completes a mutual like.
  ///
  /// The upsert and the reciprocal check form one atomic unit. A pass
  /// (`liked == false`) never reports a mutual like.
  fn create_or_update_decision<'a>(
    &'a self,
    actor_id: &'a str,
    recipient_id: &'a str,
    liked: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
