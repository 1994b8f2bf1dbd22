//! Error taxonomy shared by every layer of the explore service.
//!
//! Backends keep their own error types, but each one classifies itself into
//! an [`ErrorKind`] through [`Classify`]. The service adapter only ever looks
//! at the kind, never at backend internals.

use thiserror::Error;

/// The category of a failure, which decides how it is reported and whether
/// it may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A required identifier was missing or empty.
  Validation,
  /// A pagination token could not be decoded.
  MalformedToken,
  /// The storage connection could not be used.
  StorageUnavailable,
  /// A unit of work could not begin or commit.
  TransactionFailed,
  /// A stored row did not have the expected shape.
  Scan,
}

impl ErrorKind {
  /// Whether the caller supplied bad input. These are reported precisely.
  pub fn is_client_error(self) -> bool {
    matches!(self, Self::Validation | Self::MalformedToken)
  }

  /// Whether retrying the whole operation may succeed.
  pub fn is_retryable(self) -> bool {
    matches!(self, Self::StorageUnavailable | Self::TransactionFailed)
  }
}

/// Implemented by every error a [`DecisionStore`](crate::store::DecisionStore)
/// backend can return.
pub trait Classify {
  fn kind(&self) -> ErrorKind;

  fn is_retryable(&self) -> bool { self.kind().is_retryable() }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("missing {0}")]
  EmptyIdentifier(&'static str),

  #[error("malformed pagination token: {0}")]
  MalformedToken(String),

  #[error("storage unavailable: {0}")]
  StorageUnavailable(String),

  #[error("transaction failed: {0}")]
  TransactionFailed(String),

  #[error("unexpected row shape: {0}")]
  Scan(String),
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::EmptyIdentifier(_) => ErrorKind::Validation,
      Error::MalformedToken(_) => ErrorKind::MalformedToken,
      Error::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
      Error::TransactionFailed(_) => ErrorKind::TransactionFailed,
      Error::Scan(_) => ErrorKind::Scan,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_storage_and_transaction_failures_are_retryable() {
    assert!(Error::StorageUnavailable("closed".into()).is_retryable());
    assert!(Error::TransactionFailed("busy".into()).is_retryable());
    assert!(!Error::Scan("negative timestamp".into()).is_retryable());
    assert!(!Error::MalformedToken("bad base64".into()).is_retryable());
    assert!(!Error::EmptyIdentifier("recipient user id").is_retryable());
  }

  #[test]
  fn client_errors_are_validation_and_token() {
    assert!(ErrorKind::Validation.is_client_error());
    assert!(ErrorKind::MalformedToken.is_client_error());
    assert!(!ErrorKind::Scan.is_client_error());
    assert!(!ErrorKind::StorageUnavailable.is_client_error());
  }
}
