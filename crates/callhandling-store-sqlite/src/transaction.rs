//! Caller-owned transactions.
//!
//! A [`Transaction`] holds the connection gate from `BEGIN` until it is
//! committed, rolled back, or dropped. Record services only ever borrow it
//! through a [`Context`](callhandling_core::context::Context).
//!
//! The gate is never released while the connection may still be inside a
//! transaction: an unfinished transaction, including one whose `begin` was
//! abandoned halfway, is rolled back first. If that rollback cannot run the
//! gate stays held and the store refuses further work.

use std::{fmt, time::Instant};

use tokio::sync::OwnedMutexGuard;

use crate::{
  Error, Result,
  exec::{Db, within},
};

/// An open `BEGIN IMMEDIATE` transaction with exclusive use of the store.
pub struct Transaction {
  conn:   tokio_rusqlite::Connection,
  /// `Some` until the transaction is finished.
  permit: Option<OwnedMutexGuard<()>>,
}

impl Transaction {
  pub(crate) async fn begin(db: &Db, deadline: Option<Instant>) -> Result<Self> {
    if deadline.is_some_and(|d| d <= Instant::now()) {
      return Err(Error::Timeout);
    }
    let permit = within(deadline, db.gate.clone().lock_owned()).await?;

    // Owned before BEGIN is queued, so a timeout or a dropped future rolls
    // back through `Drop` once BEGIN has run.
    let tx = Self { conn: db.conn.clone(), permit: Some(permit) };

    within(
      deadline,
      tx.conn.call(|conn| {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
      }),
    )
    .await??;

    tracing::debug!("transaction begun");
    Ok(tx)
  }

  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  /// Commit all work done through this transaction.
  ///
  /// Fails with [`Error::TransactionLost`] if SQLite already rolled the
  /// transaction back (e.g. after an interrupted statement); nothing was
  /// persisted in that case.
  pub async fn commit(mut self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        if conn.is_autocommit() {
          return Ok(false);
        }
        conn.execute_batch("COMMIT")?;
        Ok(true)
      })
      .await
      .map_err(Error::from)
      .and_then(|committed| {
        if committed { Ok(()) } else { Err(Error::TransactionLost) }
      })?;

    self.permit.take();
    tracing::debug!("transaction committed");
    Ok(())
  }

  /// Discard all work done through this transaction.
  pub async fn rollback(mut self) -> Result<()> {
    rollback(&self.conn).await?;
    self.permit.take();
    tracing::debug!("transaction rolled back");
    Ok(())
  }
}

async fn rollback(conn: &tokio_rusqlite::Connection) -> Result<()> {
  conn
    .call(|conn| {
      if !conn.is_autocommit() {
        conn.execute_batch("ROLLBACK")?;
      }
      Ok(())
    })
    .await?;
  Ok(())
}

/// Release the gate only if the rollback went through.
fn release(permit: OwnedMutexGuard<()>, rolled_back: Result<()>) {
  match rolled_back {
    Ok(()) => drop(permit),
    Err(e) => {
      tracing::error!(error = %e, "rollback failed; store stays locked");
      std::mem::forget(permit);
    }
  }
}

impl Drop for Transaction {
  /// Roll back an unfinished transaction, then release the gate. Without a
  /// runtime the rollback runs inline on a temporary one.
  fn drop(&mut self) {
    let Some(permit) = self.permit.take() else { return };
    let conn = self.conn.clone();
    tracing::warn!("transaction abandoned without commit or rollback; rolling back");

    match tokio::runtime::Handle::try_current() {
      Ok(handle) => {
        handle.spawn(async move {
          let rolled_back = rollback(&conn).await;
          release(permit, rolled_back);
        });
      }
      Err(_) => {
        let rolled_back = tokio::runtime::Builder::new_current_thread()
          .enable_all()
          .build()
          .map_err(|e| Error::Database(tokio_rusqlite::Error::Other(Box::new(e))))
          .and_then(|rt| rt.block_on(rollback(&conn)));
        release(permit, rolled_back);
      }
    }
  }
}

impl fmt::Debug for Transaction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Transaction")
      .field("open", &self.permit.is_some())
      .finish()
  }
}
