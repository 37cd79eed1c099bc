//! Handlers for `/callhandlings` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/callhandlings` | Body: `{"name":"..."}`; id is generated |
//! | `GET`    | `/callhandlings/{id}` | 400 on a malformed id, 404 if absent or deleted |
//! | `PUT`    | `/callhandlings/{id}` | Body: `{"name":"..."}` |
//! | `DELETE` | `/callhandlings/{id}` | 204; soft delete |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use callhandling_core::{
  Result,
  callhandling::{Callhandling, parse_id},
  store::{CallhandlingRecords, Store},
};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  wire::{CallhandlingRequest, CallhandlingResponse, new_callhandling},
};

/// `POST /callhandlings`
pub async fn create<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<CallhandlingRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let callhandling = Callhandling { id: Uuid::new_v4(), name: req.name };
  tracing::info!(id = %callhandling.id, "create callhandling");

  state
    .store
    .callhandlings()
    .create(&state.context(), &callhandling)
    .await?;
  Ok((StatusCode::CREATED, Json(CallhandlingResponse::from(callhandling))))
}

/// `GET /callhandlings/{id}`
pub async fn get_one<S: Store>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<CallhandlingResponse>, ApiError> {
  tracing::info!(%id, "get callhandling");
  let id = parse_id(&id)?;
  let callhandling = state.store.callhandlings().get(&state.context(), id).await?;
  Ok(Json(callhandling.into()))
}

/// `PUT /callhandlings/{id}`
pub async fn update<S: Store>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  Json(req): Json<CallhandlingRequest>,
) -> Result<Json<CallhandlingResponse>, ApiError> {
  tracing::info!(%id, "update callhandling");
  let callhandling = new_callhandling(&id, req)?;

  state
    .store
    .callhandlings()
    .update(&state.context(), &callhandling)
    .await?;
  Ok(Json(callhandling.into()))
}

/// `DELETE /callhandlings/{id}`
pub async fn delete<S: Store>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  tracing::info!(%id, "delete callhandling");
  let id = parse_id(&id)?;
  state.store.callhandlings().delete(&state.context(), id).await?;
  Ok(StatusCode::NO_CONTENT)
}
