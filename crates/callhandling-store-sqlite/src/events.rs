//! [`SqliteEvents`]: the record service for the append-only `events` table.

use callhandling_core::{
  Error, Result,
  context::Context,
  error::{Action, Operation, Subject},
  event::Event,
  store::EventRecords,
};
use rusqlite::{OptionalExtension as _, types::Value};

use crate::{
  encode::RawEvent,
  exec::{Db, Scope, verify_write},
  statements::Statement,
  transaction::Transaction,
};

#[derive(Clone)]
pub struct SqliteEvents {
  db: Db,
}

impl SqliteEvents {
  pub(crate) fn new(db: Db) -> Self { Self { db } }

  /// The latest event of `call_id`: highest timestamp, then latest insert.
  async fn get_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    call_id: i64,
  ) -> Result<Event> {
    let op = Operation::new(Action::Get, Subject::EventsOf(call_id));
    let scope = Scope::resolve(ctx, use_tx)?;

    let raw = self
      .db
      .run(scope, ctx.deadline(), Statement::GetEvent, move |stmt| {
        stmt
          .query_row(rusqlite::params![call_id], RawEvent::from_row)
          .optional()
      })
      .await
      .map_err(|e| e.during(op.clone()))?;

    match raw {
      Some(raw) => raw.into_event().map_err(|e| e.during(op)),
      None => Err(Error::not_found(op)),
    }
  }

  /// A duplicate delivery of the same event is ignored by the unique
  /// constraint and reported as `NoRowsAffected`.
  async fn create_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    event: &Event,
  ) -> Result<()> {
    let op = Operation::new(Action::Create, Subject::Event(event.clone()));
    let scope = Scope::resolve(ctx, use_tx)?;
    let params: Vec<Value> = vec![
      event.call_id.into(),
      event.event_type.label().to_owned().into(),
      event.identity_id.into(),
      event.timestamp.into(),
      event.meta.clone().into(),
    ];

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::CreateEvent, params)
      .await
      .map_err(|e| e.during(op.clone()))?;

    verify_write(rows, op)
  }

  async fn list_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    call_id: i64,
  ) -> Result<Vec<Event>> {
    let op = Operation::new(Action::List, Subject::EventsOf(call_id));
    let scope = Scope::resolve(ctx, use_tx)?;

    let raws = self
      .db
      .run(scope, ctx.deadline(), Statement::ListEvents, move |stmt| {
        stmt
          .query_map(rusqlite::params![call_id], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()
      })
      .await
      .map_err(|e| e.during(op.clone()))?;

    raws
      .into_iter()
      .map(RawEvent::into_event)
      .collect::<crate::Result<_>>()
      .map_err(|e| e.during(op))
  }
}

impl EventRecords for SqliteEvents {
  type Transaction = Transaction;

  async fn get(&self, ctx: &Context<'_, Transaction>, call_id: i64) -> Result<Event> {
    self.get_in(ctx, false, call_id).await
  }

  async fn get_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    call_id: i64,
  ) -> Result<Event> {
    self.get_in(ctx, true, call_id).await
  }

  async fn create(&self, ctx: &Context<'_, Transaction>, event: &Event) -> Result<()> {
    self.create_in(ctx, false, event).await
  }

  async fn create_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    event: &Event,
  ) -> Result<()> {
    self.create_in(ctx, true, event).await
  }

  async fn list(
    &self,
    ctx: &Context<'_, Transaction>,
    call_id: i64,
  ) -> Result<Vec<Event>> {
    self.list_in(ctx, false, call_id).await
  }

  async fn list_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    call_id: i64,
  ) -> Result<Vec<Event>> {
    self.list_in(ctx, true, call_id).await
  }
}
