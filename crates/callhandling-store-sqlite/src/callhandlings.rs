//! [`SqliteCallhandlings`] — the record service for the `callhandlings`
//! table.
//!
//! Deletion is soft: `deleted_at` is stamped and every statement filters on
//! `deleted_at IS NULL`, so a deleted row is invisible from then on.

use callhandling_core::{
  Error, Result,
  callhandling::Callhandling,
  context::Context,
  error::{Action, Operation, Subject},
  store::CallhandlingRecords,
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  encode::{RawCallhandling, encode_dt, encode_uuid},
  exec::{Db, Scope, verify_write},
  statements::Statement,
  transaction::Transaction,
};

#[derive(Clone)]
pub struct SqliteCallhandlings {
  db: Db,
}

impl SqliteCallhandlings {
  pub(crate) fn new(db: Db) -> Self { Self { db } }

  async fn get_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    id: Uuid,
  ) -> Result<Callhandling> {
    let op = Operation::new(Action::Get, Subject::CallhandlingId(id));
    let scope = Scope::resolve(ctx, use_tx)?;
    let id_str = encode_uuid(id);

    let raw = self
      .db
      .run(scope, ctx.deadline(), Statement::GetCallhandling, move |stmt| {
        stmt
          .query_row(rusqlite::params![id_str], RawCallhandling::from_row)
          .optional()
      })
      .await
      .map_err(|e| e.during(op.clone()))?;

    match raw {
      Some(raw) => raw.into_callhandling().map_err(|e| e.during(op)),
      None => Err(Error::not_found(op)),
    }
  }

  async fn create_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    callhandling: &Callhandling,
  ) -> Result<()> {
    let op = Operation::new(
      Action::Create,
      Subject::Callhandling(callhandling.clone()),
    );
    let scope = Scope::resolve(ctx, use_tx)?;
    let params: Vec<Value> = vec![
      encode_uuid(callhandling.id).into(),
      callhandling.name.clone().into(),
    ];

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::CreateCallhandling, params)
      .await
      .map_err(|e| e.during(op.clone()))?;

    verify_write(rows, op)
  }

  async fn update_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    callhandling: &Callhandling,
  ) -> Result<()> {
    let op = Operation::new(
      Action::Update,
      Subject::Callhandling(callhandling.clone()),
    );
    let scope = Scope::resolve(ctx, use_tx)?;
    let params: Vec<Value> = vec![
      encode_uuid(callhandling.id).into(),
      callhandling.name.clone().into(),
    ];

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::UpdateCallhandling, params)
      .await
      .map_err(|e| e.during(op.clone()))?;

    verify_write(rows, op)
  }

  /// Zero marked rows means the id never existed or was already deleted;
  /// both are reported as `NotFound`.
  async fn delete_in(
    &self,
    ctx: &Context<'_, Transaction>,
    use_tx: bool,
    id: Uuid,
  ) -> Result<()> {
    let op = Operation::new(Action::Delete, Subject::CallhandlingId(id));
    let scope = Scope::resolve(ctx, use_tx)?;
    let params: Vec<Value> =
      vec![encode_uuid(id).into(), encode_dt(Utc::now()).into()];

    let rows = self
      .db
      .execute(scope, ctx.deadline(), Statement::DeleteCallhandling, params)
      .await
      .map_err(|e| e.during(op.clone()))?;

    if rows == 0 {
      return Err(Error::not_found(op));
    }
    Ok(())
  }
}

impl CallhandlingRecords for SqliteCallhandlings {
  type Transaction = Transaction;

  async fn get(
    &self,
    ctx: &Context<'_, Transaction>,
    id: Uuid,
  ) -> Result<Callhandling> {
    self.get_in(ctx, false, id).await
  }

  async fn get_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    id: Uuid,
  ) -> Result<Callhandling> {
    self.get_in(ctx, true, id).await
  }

  async fn create(
    &self,
    ctx: &Context<'_, Transaction>,
    callhandling: &Callhandling,
  ) -> Result<()> {
    self.create_in(ctx, false, callhandling).await
  }

  async fn create_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    callhandling: &Callhandling,
  ) -> Result<()> {
    self.create_in(ctx, true, callhandling).await
  }

  async fn update(
    &self,
    ctx: &Context<'_, Transaction>,
    callhandling: &Callhandling,
  ) -> Result<()> {
    self.update_in(ctx, false, callhandling).await
  }

  async fn update_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    callhandling: &Callhandling,
  ) -> Result<()> {
    self.update_in(ctx, true, callhandling).await
  }

  async fn delete(&self, ctx: &Context<'_, Transaction>, id: Uuid) -> Result<()> {
    self.delete_in(ctx, false, id).await
  }

  async fn delete_with_transaction(
    &self,
    ctx: &Context<'_, Transaction>,
    id: Uuid,
  ) -> Result<()> {
    self.delete_in(ctx, true, id).await
  }
}
