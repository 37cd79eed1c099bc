//! Store capability traits.
//!
//! Each record service is described by a narrow trait so consumers can depend
//! on exactly the capability they use ("something that can create an event")
//! instead of a concrete backend. [`Store`] ties the three services together
//! with the transaction lifecycle and the liveness check.
//!
//! Every operation comes in two flavours: the plain form runs as its own
//! atomic unit, the `_with_transaction` form runs inside the transaction
//! attached to the [`Context`] and fails with
//! [`Error::NoTransactionInContext`](crate::Error::NoTransactionInContext)
//! when there is none.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result, call::Call, callhandling::Callhandling, context::Context,
  event::Event,
};

/// Shorthand for the context type a store's operations accept.
pub type StoreContext<'t, S> = Context<'t, <S as Store>::Transaction>;

// ─── Calls ───────────────────────────────────────────────────────────────────

pub trait CallRecords: Send + Sync {
  type Transaction: Send + Sync;

  fn get(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<Call>> + Send;

  fn get_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<Call>> + Send;

  fn create(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call: &Call,
  ) -> impl Future<Output = Result<()>> + Send;

  fn create_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call: &Call,
  ) -> impl Future<Output = Result<()>> + Send;

  /// Overwrite every non-key field of the call identified by `call.call_id`.
  fn update(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call: &Call,
  ) -> impl Future<Output = Result<()>> + Send;

  fn update_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call: &Call,
  ) -> impl Future<Output = Result<()>> + Send;

  fn delete(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<()>> + Send;

  fn delete_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<()>> + Send;
}

// ─── Callhandlings ───────────────────────────────────────────────────────────

/// Callhandlings are soft-deleted: once deleted, a row is invisible to every
/// subsequent get, update, and delete.
pub trait CallhandlingRecords: Send + Sync {
  type Transaction: Send + Sync;

  fn get(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    id: Uuid,
  ) -> impl Future<Output = Result<Callhandling>> + Send;

  fn get_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    id: Uuid,
  ) -> impl Future<Output = Result<Callhandling>> + Send;

  fn create(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    callhandling: &Callhandling,
  ) -> impl Future<Output = Result<()>> + Send;

  fn create_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    callhandling: &Callhandling,
  ) -> impl Future<Output = Result<()>> + Send;

  fn update(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    callhandling: &Callhandling,
  ) -> impl Future<Output = Result<()>> + Send;

  fn update_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    callhandling: &Callhandling,
  ) -> impl Future<Output = Result<()>> + Send;

  fn delete(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send;

  fn delete_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    id: Uuid,
  ) -> impl Future<Output = Result<()>> + Send;
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Events are append-only; there is deliberately no update or delete.
pub trait EventRecords: Send + Sync {
  type Transaction: Send + Sync;

  /// The most recent event recorded for `call_id`.
  fn get(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<Event>> + Send;

  fn get_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<Event>> + Send;

  fn create(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    event: &Event,
  ) -> impl Future<Output = Result<()>> + Send;

  fn create_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    event: &Event,
  ) -> impl Future<Output = Result<()>> + Send;

  /// The full history of `call_id` in timestamp order. Empty if the call has
  /// no events.
  fn list(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send;

  fn list_with_transaction(
    &self,
    ctx: &Context<'_, Self::Transaction>,
    call_id: i64,
  ) -> impl Future<Output = Result<Vec<Event>>> + Send;
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// The top-level store: owns the connection and the three record services.
///
/// Only the store begins, commits, and rolls back transactions; record
/// services merely borrow one through the context.
pub trait Store: Send + Sync {
  type Transaction: Send + Sync + 'static;
  type Calls: CallRecords<Transaction = Self::Transaction>;
  type Callhandlings: CallhandlingRecords<Transaction = Self::Transaction>;
  type Events: EventRecords<Transaction = Self::Transaction>;

  fn calls(&self) -> &Self::Calls;
  fn callhandlings(&self) -> &Self::Callhandlings;
  fn events(&self) -> &Self::Events;

  fn begin(
    &self,
    ctx: &Context<'_, Self::Transaction>,
  ) -> impl Future<Output = Result<Self::Transaction>> + Send;

  fn commit(
    &self,
    tx: Self::Transaction,
  ) -> impl Future<Output = Result<()>> + Send;

  fn rollback(
    &self,
    tx: Self::Transaction,
  ) -> impl Future<Output = Result<()>> + Send;

  /// A no-op round trip to the database.
  fn ping(
    &self,
    ctx: &Context<'_, Self::Transaction>,
  ) -> impl Future<Output = Result<()>> + Send;
}
