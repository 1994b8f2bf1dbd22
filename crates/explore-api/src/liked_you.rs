//! Handlers for `/liked-you` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/liked-you` | `?recipient_user_id` required; optional `pagination_token` |
//! | `GET`  | `/liked-you/new` | Same, excluding likers already liked back |
//! | `GET`  | `/liked-you/count` | `?recipient_user_id` required |

use axum::{
  Json,
  extract::{Query, State},
};
use explore_core::{
  store::DecisionStore,
  wire::{
    CountLikedYouRequest, CountLikedYouResponse, ListLikedYouRequest,
    ListLikedYouResponse,
  },
};

use crate::{error::ApiError, service::ExploreService};

/// `GET /liked-you?recipient_user_id=<id>[&pagination_token=<t>]`
pub async fn list<S>(
  State(service): State<ExploreService<S>>,
  Query(req): Query<ListLikedYouRequest>,
) -> Result<Json<ListLikedYouResponse>, ApiError>
where
  S: DecisionStore,
{
  Ok(Json(service.list_liked_you(&req).await?))
}

/// `GET /liked-you/new?recipient_user_id=<id>[&pagination_token=<t>]`
pub async fn list_new<S>(
  State(service): State<ExploreService<S>>,
  Query(req): Query<ListLikedYouRequest>,
) -> Result<Json<ListLikedYouResponse>, ApiError>
where
  S: DecisionStore,
{
  Ok(Json(service.list_new_liked_you(&req).await?))
}

/// `GET /liked-you/count?recipient_user_id=<id>`
pub async fn count<S>(
  State(service): State<ExploreService<S>>,
  Query(req): Query<CountLikedYouRequest>,
) -> Result<Json<CountLikedYouResponse>, ApiError>
where
  S: DecisionStore,
{
  Ok(Json(service.count_liked_you(&req).await?))
}
