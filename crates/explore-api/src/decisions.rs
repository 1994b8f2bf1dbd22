//! Handler for `PUT /decisions`.

use axum::{Json, extract::State};
use explore_core::{
  store::DecisionStore,
  wire::{PutDecisionRequest, PutDecisionResponse},
};

use crate::{error::ApiError, service::ExploreService};

/// `PUT /decisions` with body:
/// `{"actor_user_id":"...","recipient_user_id":"...","liked_recipient":true}`
pub async fn put<S>(
  State(service): State<ExploreService<S>>,
  Json(req): Json<PutDecisionRequest>,
) -> Result<Json<PutDecisionResponse>, ApiError>
where
  S: DecisionStore,
{
  Ok(Json(service.put_decision(&req).await?))
}
