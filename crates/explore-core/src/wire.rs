//! JSON request and response bodies for the explore API.
//!
//! Shared by the HTTP adapter (`explore-api`) and the command-line client
//! (`explore-cli`) so both sides agree on field names.

use serde::{Deserialize, Serialize};

use crate::decision::Liker;

/// Query parameters of `GET /liked-you` and `GET /liked-you/new`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListLikedYouRequest {
  #[serde(default)]
  pub recipient_user_id: String,
  /// Token from a previous response; empty is the same as absent.
  pub pagination_token:  Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLikedYouResponse {
  pub likers:                Vec<Liker>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_pagination_token: Option<String>,
}

/// Query parameters of `GET /liked-you/count`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountLikedYouRequest {
  #[serde(default)]
  pub recipient_user_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountLikedYouResponse {
  pub count: u64,
}

/// Body of `PUT /decisions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PutDecisionRequest {
  #[serde(default)]
  pub actor_user_id:     String,
  #[serde(default)]
  pub recipient_user_id: String,
  #[serde(default)]
  pub liked_recipient:   bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutDecisionResponse {
  pub mutual_likes: bool,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub error: String,
}
