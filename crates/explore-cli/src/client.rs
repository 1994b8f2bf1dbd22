//! Async HTTP client wrapping the explore JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use explore_core::wire::{
  CountLikedYouRequest, CountLikedYouResponse, ErrorResponse,
  ListLikedYouRequest, ListLikedYouResponse, PutDecisionRequest,
  PutDecisionResponse,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Async HTTP client for the explore JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  // ── Likers ────────────────────────────────────────────────────────────────

  /// `GET /liked-you`, or `GET /liked-you/new` when `new_only` is set.
  pub async fn list_liked_you(
    &self,
    recipient_user_id: &str,
    pagination_token: Option<String>,
    new_only: bool,
  ) -> Result<ListLikedYouResponse> {
    let path = if new_only { "/liked-you/new" } else { "/liked-you" };
    let req = ListLikedYouRequest {
      recipient_user_id: recipient_user_id.to_owned(),
      pagination_token,
    };
    let resp = self
      .client
      .get(self.url(path))
      .query(&req)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;
    decode(path, resp).await
  }

  /// `GET /liked-you/count`
  pub async fn count_liked_you(&self, recipient_user_id: &str) -> Result<CountLikedYouResponse> {
    let req = CountLikedYouRequest { recipient_user_id: recipient_user_id.to_owned() };
    let resp = self
      .client
      .get(self.url("/liked-you/count"))
      .query(&req)
      .send()
      .await
      .context("GET /liked-you/count failed")?;
    decode("/liked-you/count", resp).await
  }

  // ── Decisions ─────────────────────────────────────────────────────────────

  /// `PUT /decisions`
  pub async fn put_decision(
    &self,
    actor_user_id: &str,
    recipient_user_id: &str,
    liked_recipient: bool,
  ) -> Result<PutDecisionResponse> {
    let req = PutDecisionRequest {
      actor_user_id:     actor_user_id.to_owned(),
      recipient_user_id: recipient_user_id.to_owned(),
      liked_recipient,
    };
    let resp = self
      .client
      .put(self.url("/decisions"))
      .json(&req)
      .send()
      .await
      .context("PUT /decisions failed")?;
    decode("/decisions", resp).await
  }
}

/// Deserialise a success body, or surface the server's error message.
async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T> {
  let status = resp.status();
  if !status.is_success() {
    let message = match resp.json::<ErrorResponse>().await {
      Ok(body) => body.error,
      Err(_) => String::from("(no error body)"),
    };
    return Err(anyhow!("{path} → {status}: {message}"));
  }
  resp
    .json()
    .await
    .with_context(|| format!("deserialising {path} response"))
}
