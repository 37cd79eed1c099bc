//! Handlers for `/calls` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/calls` | Body: `{"call":{...}}` |
//! | `GET`    | `/calls/{call_id}` | 404 if not found |
//! | `PUT`    | `/calls/{call_id}` | Body: `{"call":{...}}`; the path id wins |
//! | `PUT`    | `/calls/{call_id}/status` | Body: `{"status":"..."}` |
//! | `DELETE` | `/calls/{call_id}` | 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use callhandling_core::{
  Result,
  call::Call,
  context::Context,
  store::{CallRecords, Store},
};

use crate::{
  ApiState,
  error::ApiError,
  wire::{CallMessage, CallRequest, StatusRequest},
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /calls`
pub async fn create<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<CallRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let call = Call::from(req.call);
  tracing::info!(call_id = call.call_id, "create call");

  state.store.calls().create(&state.context(), &call).await?;
  Ok((StatusCode::CREATED, Json(CallMessage::from(call))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /calls/{call_id}`
pub async fn get_one<S: Store>(
  State(state): State<ApiState<S>>,
  Path(call_id): Path<i64>,
) -> Result<Json<CallMessage>, ApiError> {
  tracing::info!(call_id, "get call");
  let call = state.store.calls().get(&state.context(), call_id).await?;
  Ok(Json(call.into()))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /calls/{call_id}`
pub async fn update<S: Store>(
  State(state): State<ApiState<S>>,
  Path(call_id): Path<i64>,
  Json(req): Json<CallRequest>,
) -> Result<Json<CallMessage>, ApiError> {
  tracing::info!(call_id, "update call");
  let call = Call { call_id, ..Call::from(req.call) };

  state.store.calls().update(&state.context(), &call).await?;
  Ok(Json(call.into()))
}

/// `PUT /calls/{call_id}/status`: read, modify and write back inside one
/// transaction.
pub async fn update_status<S: Store>(
  State(state): State<ApiState<S>>,
  Path(call_id): Path<i64>,
  Json(req): Json<StatusRequest>,
) -> Result<Json<CallMessage>, ApiError> {
  tracing::info!(call_id, status = %req.status, "update call status");
  let ctx = state.context();
  let tx = state.store.begin(&ctx).await?;

  let outcome = set_status(
    state.store.calls(),
    &ctx.with_transaction(&tx),
    call_id,
    req.status,
  )
  .await;

  match outcome {
    Ok(call) => {
      state.store.commit(tx).await?;
      Ok(Json(call.into()))
    }
    Err(e) => {
      if let Err(rb) = state.store.rollback(tx).await {
        tracing::warn!(error = %rb, "rollback after failed status update");
      }
      Err(e.into())
    }
  }
}

async fn set_status<C: CallRecords>(
  calls: &C,
  ctx: &Context<'_, C::Transaction>,
  call_id: i64,
  status: String,
) -> Result<Call> {
  let mut call = calls.get_with_transaction(ctx, call_id).await?;
  call.status = status;
  calls.update_with_transaction(ctx, &call).await?;
  Ok(call)
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /calls/{call_id}`
pub async fn delete<S: Store>(
  State(state): State<ApiState<S>>,
  Path(call_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  tracing::info!(call_id, "delete call");
  state.store.calls().delete(&state.context(), call_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
