//! Error type for `explore-store-sqlite`.
//!
//! Every variant names the store operation that failed (`op`), so a log line
//! alone is enough to tell which call broke.

use explore_core::{Classify, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] explore_core::Error),

  /// The connection thread is gone or the database could not be opened.
  #[error("{op}: storage unavailable: {source}")]
  Unavailable {
    op:     &'static str,
    #[source]
    source: tokio_rusqlite::Error,
  },

  /// A statement failed outside a transaction. Retryable only when SQLite
  /// reports the database itself as busy or unreachable.
  #[error("{op}: query failed: {source}")]
  Query {
    op:     &'static str,
    #[source]
    source: rusqlite::Error,
  },

  #[error("{op}: transaction failed at {stage}: {source}")]
  Transaction {
    op:     &'static str,
    stage:  &'static str,
    #[source]
    source: rusqlite::Error,
  },

  #[error("{op}: malformed row: {reason}")]
  Scan { op: &'static str, reason: String },
}

impl Error {
  /// Wrap a statement failure, separating row-shape problems from
  /// connectivity ones.
  pub(crate) fn query(op: &'static str, source: rusqlite::Error) -> Self {
    match source {
      rusqlite::Error::InvalidColumnType(..)
      | rusqlite::Error::FromSqlConversionFailure(..)
      | rusqlite::Error::IntegralValueOutOfRange(..) => Error::Scan {
        op,
        reason: source.to_string(),
      },
      source => Error::Query { op, source },
    }
  }

  /// Wrap a failure inside an open transaction. Row-shape problems are
  /// still reported as [`Error::Scan`].
  pub(crate) fn transaction(
    op: &'static str,
    stage: &'static str,
    source: rusqlite::Error,
  ) -> Self {
    match Error::query(op, source) {
      Error::Query { op, source } => Error::Transaction { op, stage, source },
      other => other,
    }
  }
}

/// SQLite result codes that describe the database rather than the
/// statement. Only these are worth retrying.
fn is_transient(source: &rusqlite::Error) -> bool {
  use rusqlite::ErrorCode;

  match source {
    rusqlite::Error::SqliteFailure(e, _) => matches!(
      e.code,
      ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked
        | ErrorCode::CannotOpen
        | ErrorCode::SystemIoFailure
        | ErrorCode::NotADatabase
    ),
    _ => false,
  }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Unavailable { .. } | Error::Query { .. } => ErrorKind::StorageUnavailable,
      Error::Transaction { .. } => ErrorKind::TransactionFailed,
      Error::Scan { .. } => ErrorKind::Scan,
    }
  }

  fn is_retryable(&self) -> bool {
    match self {
      Error::Core(e) => e.is_retryable(),
      Error::Unavailable { .. } => true,
      Error::Query { source, .. } | Error::Transaction { source, .. } => {
        is_transient(source)
      }
      Error::Scan { .. } => false,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
