//! JSON-over-HTTP dispatch for the call handling store.
//!
//! Exposes an axum [`Router`] backed by any [`Store`]. Every handler builds a
//! fresh deadline-bounded [`Context`], calls exactly the record service it
//! needs, and maps the outcome onto a status code. Transport concerns (TLS,
//! auth, tracing layers) are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(callhandling_api::api_router(store.clone(), ApiConfig::default()))
//! ```

pub mod callhandlings;
pub mod calls;
pub mod error;
pub mod events;
pub mod ping;
pub mod wire;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post, put},
};
use callhandling_core::{
  context::Context,
  store::{Store, StoreContext},
};

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ApiConfig {
  /// Deadline attached to every record operation.
  pub request_timeout: Duration,
  /// Deadline for the liveness round trip.
  pub ping_timeout:    Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      request_timeout: Duration::from_secs(1),
      ping_timeout:    Duration::from_secs(1),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub config: ApiConfig,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), config: self.config }
  }
}

impl<S: Store> ApiState<S> {
  /// A fresh request context bounded by the configured request timeout.
  pub fn context(&self) -> StoreContext<'static, S> {
    Context::with_timeout(self.config.request_timeout)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
pub fn api_router<S>(store: Arc<S>, config: ApiConfig) -> Router<()>
where
  S: Store + 'static,
{
  Router::new()
    .route("/ping", get(ping::handler::<S>))
    // Calls
    .route("/calls", post(calls::create::<S>))
    .route(
      "/calls/{call_id}",
      get(calls::get_one::<S>)
        .put(calls::update::<S>)
        .delete(calls::delete::<S>),
    )
    .route("/calls/{call_id}/status", put(calls::update_status::<S>))
    .route("/calls/{call_id}/events", get(events::list::<S>))
    .route("/calls/{call_id}/events/latest", get(events::latest::<S>))
    // Events
    .route("/events/dial", post(events::dial::<S>))
    .route("/events/ring", post(events::ring::<S>))
    .route("/events/connect", post(events::connect::<S>))
    .route("/events/disconnect", post(events::disconnect::<S>))
    .route("/events/join", post(events::join::<S>))
    .route("/events/exit", post(events::exit::<S>))
    .route("/events/disposition", post(events::disposition::<S>))
    .route("/events/enqueue", post(events::enqueue::<S>))
    .route("/events/voicemail", post(events::voicemail::<S>))
    // Callhandlings
    .route("/callhandlings", post(callhandlings::create::<S>))
    .route(
      "/callhandlings/{id}",
      get(callhandlings::get_one::<S>)
        .put(callhandlings::update::<S>)
        .delete(callhandlings::delete::<S>),
    )
    .with_state(ApiState { store, config })
}

#[cfg(test)]
mod tests;
