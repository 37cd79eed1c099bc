//! [`SqliteCalls`] — the record service for the `calls` table.

use callhandling_core::{
  Error, Result,
  call::Call,
  context::Context,
  error::{Action, Operation, Subject},
  store::CallRecords,
};
use rusqlite::OptionalExtension as _;

use crate::{
  encode::read_call,
  exec::{Db, Scope, verify_write},
  statements::Statement,
  transaction::Transaction,
};

#[derive(Clone)]
pub struct SqliteCalls {
  db: Db,
}

impl SqliteCalls {
  pub(crate) fn new(db: Db) -> Self { Self { db } }

  async fn get_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    call_id: i64,
  ) -> Result<Call> {
    let op = Operation::new(Action::Get, Subject::CallId(call_id));
    let scope = Scope::resolve(ctx, use_tx)?;

    let call = self
      .db
      .run(scope, ctx.deadline(), Statement::GetCall, move |stmt| {
        stmt
          .query_row(rusqlite::params![call_id], read_call)
          .optional()
      })
      .await
      .map_err(|e| e.during(op.clone()))?;

    call.ok_or_else(|| Error::not_found(op))
  }

  async fn create_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    call: &Call,
  ) -> Result<()> {
    let op = Operation::new(Action::Create, Subject::Call(call.clone()));
    let scope = Scope::resolve(ctx, use_tx)?;

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::CreateCall, row_values(call))
      .await
      .map_err(|e| e.during(op.clone()))?;

    verify_write(rows, op)
  }

  async fn update_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    call: &Call,
  ) -> Result<()> {
    let op = Operation::new(Action::Update, Subject::Call(call.clone()));
    let scope = Scope::resolve(ctx, use_tx)?;

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::UpdateCall, row_values(call))
      .await
      .map_err(|e| e.during(op.clone()))?;

    verify_write(rows, op)
  }

  /// Calls have no deletion marker; the row is removed outright.
  async fn delete_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    call_id: i64,
  ) -> Result<()> {
    let op = Operation::new(Action::Delete, Subject::CallId(call_id));
    let scope = Scope::resolve(ctx, use_tx)?;

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::DeleteCall, vec![call_id.into()])
      .await
      .map_err(|e| e.during(op.clone()))?;

    verify_write(rows, op)
  }
}

/// Parameters in `calls` column order; `?1` is always the key.
fn row_values(call: &Call) -> Vec<rusqlite::types::Value> {
  vec![
    call.call_id.into(),
    call.sid.into(),
    call.conversation_id.into(),
    call.ani.clone().into(),
    call.dnis.clone().into(),
    call.status.clone().into(),
  ]
}

impl CallRecords for SqliteCalls {
  type Transaction = Transaction;

  async fn get(&self, ctx: &Context<'_, Transaction>, call_id: i64) -> Result<Call> {
    self.get_in(ctx, false, call_id).await
  }

  async fn get_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    call_id: i64,
  ) -> Result<Call> {
    self.get_in(ctx, true, call_id).await
  }

  async fn create(&self, ctx: &Context<'_, Transaction>, call: &Call) -> Result<()> {
    self.create_in(ctx, false, call).await
  }

  async fn create_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    call: &Call,
  ) -> Result<()> {
    self.create_in(ctx, true, call).await
  }

  async fn update(&self, ctx: &Context<'_, Transaction>, call: &Call) -> Result<()> {
    self.update_in(ctx, false, call).await
  }

  async fn update_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    call: &Call,
  ) -> Result<()> {
    self.update_in(ctx, true, call).await
  }

  async fn delete(&self, ctx: &Context<'_, Transaction>, call_id: i64) -> Result<()> {
    self.delete_in(ctx, false, call_id).await
  }

  async fn delete_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    call_id: i64,
  ) -> Result<()> {
    self.delete_in(ctx, true, call_id).await
  }
}
