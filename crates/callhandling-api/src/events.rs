//! Handlers for event endpoints.
//!
//! Each lifecycle transition has its own route; the route, not the body,
//! decides the event type. Reads are scoped under the call they belong to.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events/{dial,ring,...}` | Body: `{"event":{...}}`; answers `{}` |
//! | `GET`  | `/calls/{call_id}/events` | Full history, oldest first |
//! | `GET`  | `/calls/{call_id}/events/latest` | 404 if the call has no events |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use callhandling_core::{
  Result,
  context::Context,
  event::{Event, EventType},
  store::{EventRecords, Store},
};

use crate::{
  ApiState,
  error::ApiError,
  wire::{Empty, EventMessage, EventRequest, new_event},
};

// ─── Create ──────────────────────────────────────────────────────────────────

async fn record<E: EventRecords>(
  events: &E,
  ctx: &Context<'_, E::Transaction>,
  event: &Event,
) -> Result<()> {
  tracing::info!(
    call_id = event.call_id,
    event_type = event.event_type.label(),
    "record event"
  );
  events.create(ctx, event).await
}

async fn create<S: Store>(
  state: ApiState<S>,
  req: EventRequest,
  event_type: EventType,
) -> Result<impl IntoResponse, ApiError> {
  let event = new_event(req.event, event_type);
  record(state.store.events(), &state.context(), &event).await?;
  Ok((StatusCode::CREATED, Json(Empty {})))
}

/// `POST /events/dial`
pub async fn dial<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::Dialing).await
}

/// `POST /events/ring`
pub async fn ring<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::Ringing).await
}

/// `POST /events/connect`
pub async fn connect<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::Connected).await
}

/// `POST /events/disconnect`
pub async fn disconnect<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::Disconnected).await
}

/// `POST /events/join`
pub async fn join<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::PartyJoined).await
}

/// `POST /events/exit`
pub async fn exit<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::PartyExited).await
}

/// `POST /events/disposition`
pub async fn disposition<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::Dispositioned).await
}

/// `POST /events/enqueue`
pub async fn enqueue<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::Enqueued).await
}

/// `POST /events/voicemail`
pub async fn voicemail<S: Store>(
  State(state): State<ApiState<S>>,
  Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
  create(state, req, EventType::VoicemailCreated).await
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /calls/{call_id}/events`
pub async fn list<S: Store>(
  State(state): State<ApiState<S>>,
  Path(call_id): Path<i64>,
) -> Result<Json<Vec<EventMessage>>, ApiError> {
  tracing::info!(call_id, "list events");
  let events = state.store.events().list(&state.context(), call_id).await?;
  Ok(Json(events.into_iter().map(EventMessage::from).collect()))
}

/// `GET /calls/{call_id}/events/latest`
pub async fn latest<S: Store>(
  State(state): State<ApiState<S>>,
  Path(call_id): Path<i64>,
) -> Result<Json<EventMessage>, ApiError> {
  tracing::info!(call_id, "get latest event");
  let event = state.store.events().get(&state.context(), call_id).await?;
  Ok(Json(event.into()))
}
