//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Client mistakes are echoed back precisely. Everything else is logged in
//! full and reported to the client only as "internal error".

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use explore_core::{Classify, ErrorKind, wire::ErrorResponse};
use thiserror::Error;

/// An error returned by the service adapter or an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  InvalidArgument(String),

  #[error("{context}: {source}")]
  Internal {
    context:   &'static str,
    kind:      ErrorKind,
    retryable: bool,
    #[source]
    source:    Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap an error from the store (or the codec), routing it by kind only.
  pub fn from_store<E>(context: &'static str, err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    let kind = err.kind();
    if kind.is_client_error() {
      ApiError::InvalidArgument(err.to_string())
    } else {
      ApiError::Internal {
        context,
        kind,
        retryable: err.is_retryable(),
        source: Box::new(err),
      }
    }
  }

  pub fn kind(&self) -> Option<ErrorKind> {
    match self {
      ApiError::InvalidArgument(_) => None,
      ApiError::Internal { kind, .. } => Some(*kind),
    }
  }

  /// Whether the failed call may succeed if repeated.
  pub fn is_retryable(&self) -> bool {
    matches!(self, ApiError::Internal { retryable: true, .. })
  }
}

impl From<explore_core::Error> for ApiError {
  fn from(err: explore_core::Error) -> Self { ApiError::from_store("internal", err) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::InvalidArgument(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Internal { context, kind, retryable, source } => {
        tracing::error!(
          error = %source,
          ?kind,
          retryable,
          "{context}"
        );
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(ErrorResponse { error: message })).into_response()
  }
}
