//! `GET /ping`: liveness check.
//!
//! Never fails: a database that does not answer within the ping timeout is
//! reported as `down` in the response body.

use axum::{
  Json,
  extract::{Query, State},
};
use callhandling_core::{context::Context, store::Store};

use crate::{
  ApiState,
  wire::{PingParams, PingResponse},
};

/// `GET /ping[?data=<text>]`
pub async fn handler<S: Store>(
  State(state): State<ApiState<S>>,
  Query(params): Query<PingParams>,
) -> Json<PingResponse> {
  let ctx = Context::with_timeout(state.config.ping_timeout);
  let database = match state.store.ping(&ctx).await {
    Ok(()) => "up",
    Err(e) => {
      tracing::warn!(error = %e, "database ping failed");
      "down"
    }
  };
  tracing::info!(database, "ping");

  Json(PingResponse { data: format!("Data: {}; Database: {database}", params.data) })
}
