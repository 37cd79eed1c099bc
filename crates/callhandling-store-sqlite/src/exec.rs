//! Deadline-bounded statement execution.
//!
//! All statements run on the single `tokio_rusqlite` connection thread.
//! [`Db::run`] adds three guarantees on top of that:
//!
//! - **Serialization.** Standalone statements take the gate; an open
//!   [`Transaction`] holds it for its whole lifetime, so a standalone
//!   statement can never land inside someone else's transaction.
//! - **Bounded time.** The context deadline covers both waiting for the gate
//!   and executing. On expiry the running statement is interrupted.
//! - **At most one outcome.** Each execution runs inside its own savepoint
//!   and races the caller for a [`Claim`]. Whoever wins decides: either the
//!   savepoint is released and the caller sees the real result, or it is
//!   rolled back and the caller sees a timeout. A write is never persisted
//!   behind a reported failure.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
  },
  time::Instant,
};

use callhandling_core::error::Operation;
use rusqlite::types::Value;
use tokio::sync::Mutex;

use crate::{
  Error, Result, statements::Statement, transaction::Transaction,
};

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Where a statement runs: on its own, or inside a borrowed transaction.
#[derive(Clone, Copy)]
pub(crate) enum Scope<'t> {
  Standalone,
  Transaction(&'t Transaction),
}

impl<'t> Scope<'t> {
  /// Resolve the scope for one entry point. With `use_tx` set the
  /// transaction must be attached to `ctx`; nothing touches the store
  /// otherwise.
  pub(crate) fn resolve(
    ctx: &callhandling_core::context::Context<'t, Transaction>,
    use_tx: bool,
  ) -> callhandling_core::Result<Self> {
    if use_tx {
      Ok(Scope::Transaction(ctx.transaction()?))
    } else {
      Ok(Scope::Standalone)
    }
  }
}

// ─── Db ──────────────────────────────────────────────────────────────────────

/// Shared handle to the connection. Cloning is cheap.
#[derive(Clone)]
pub(crate) struct Db {
  pub(crate) conn:      tokio_rusqlite::Connection,
  pub(crate) gate:      Arc<Mutex<()>>,
  pub(crate) interrupt: Arc<rusqlite::InterruptHandle>,
}

enum Outcome<R> {
  Done(R),
  Canceled,
  TransactionLost,
}

impl Db {
  /// Run `f` against the cached prepared form of `statement` within
  /// `scope`, bounded by `deadline`.
  pub(crate) async fn run<R, F>(
    &self,
    scope: Scope<'_>,
    deadline: Option<Instant>,
    statement: Statement,
    f: F,
  ) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Statement<'_>) -> rusqlite::Result<R>
      + Send
      + 'static,
    R: Send + 'static,
  {
    if deadline.is_some_and(|d| d <= Instant::now()) {
      return Err(Error::Timeout);
    }

    let (conn, _permit, in_transaction) = match scope {
      Scope::Standalone => {
        (&self.conn, Some(within(deadline, self.gate.lock()).await?), false)
      }
      Scope::Transaction(tx) => (tx.connection(), None, true),
    };

    tracing::debug!(
      statement = statement.key(),
      transactional = in_transaction,
      "executing statement"
    );

    let claim = Claim::default();
    let mut guard = CancelGuard {
      claim:     claim.clone(),
      interrupt: self.interrupt.clone(),
      armed:     true,
    };

    let call = conn.call(move |conn| {
      if in_transaction && conn.is_autocommit() {
        return Ok(Outcome::TransactionLost);
      }
      if !claim.start() {
        return Ok(Outcome::Canceled);
      }
      let sp = conn.savepoint()?;
      let out = {
        let mut stmt = sp.prepare_cached(statement.sql())?;
        f(&mut *stmt)?
      };
      if !claim.settle() {
        // Dropping the savepoint rolls it back.
        return Ok(Outcome::Canceled);
      }
      sp.commit()?;
      Ok(Outcome::Done(out))
    });
    tokio::pin!(call);

    let result = match within(deadline, &mut call).await {
      Ok(res) => res,
      Err(_) => {
        if guard.cancel() {
          return Err(Error::Timeout);
        }
        // The statement reached its commit point first; report what it did.
        call.await
      }
    };
    guard.disarm();

    match result? {
      Outcome::Done(out) => Ok(out),
      Outcome::Canceled => Err(Error::Timeout),
      Outcome::TransactionLost => Err(Error::TransactionLost),
    }
  }

  /// Execute a write and return the number of affected rows.
  pub(crate) async fn execute(
    &self,
    scope: Scope<'_>,
    deadline: Option<Instant>,
    statement: Statement,
    params: Vec<Value>,
  ) -> Result<usize> {
    self
      .run(scope, deadline, statement, move |stmt| {
        stmt.execute(rusqlite::params_from_iter(params))
      })
      .await
  }
}

/// Affected-row verification: a write that changed nothing is a failure.
pub(crate) fn verify_write(
  rows: usize,
  op: Operation,
) -> callhandling_core::Result<()> {
  if rows == 0 {
    return Err(callhandling_core::Error::no_rows_affected(op));
  }
  Ok(())
}

/// Await `fut`, giving up at `deadline`.
pub(crate) async fn within<F: Future>(
  deadline: Option<Instant>,
  fut: F,
) -> Result<F::Output> {
  match deadline {
    None => Ok(fut.await),
    Some(d) => tokio::time::timeout_at(d.into(), fut)
      .await
      .map_err(|_| Error::Timeout),
  }
}

// ─── Claim ───────────────────────────────────────────────────────────────────

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const SETTLED: u8 = 2;
const CANCELED: u8 = 3;

/// Decides, exactly once, whether an execution commits or is abandoned.
#[derive(Clone, Default)]
struct Claim(Arc<AtomicU8>);

impl Claim {
  fn start(&self) -> bool { self.swap(PENDING, RUNNING) }

  fn settle(&self) -> bool { self.swap(RUNNING, SETTLED) }

  /// Abandon the execution. Returns the state it was taken from, or `None`
  /// if it had already settled.
  fn cancel(&self) -> Option<u8> {
    self
      .0
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
        (s == PENDING || s == RUNNING).then_some(CANCELED)
      })
      .ok()
  }

  fn swap(&self, from: u8, to: u8) -> bool {
    self
      .0
      .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }
}

/// Cancels the execution if the caller stops waiting for it, whether through
/// a deadline or because the request future was dropped.
struct CancelGuard {
  claim:     Claim,
  interrupt: Arc<rusqlite::InterruptHandle>,
  armed:     bool,
}

impl CancelGuard {
  /// Returns `false` if the execution already settled and must be awaited.
  fn cancel(&mut self) -> bool {
    self.armed = false;
    match self.claim.cancel() {
      Some(RUNNING) => {
        self.interrupt.interrupt();
        true
      }
      Some(_) => true,
      None => false,
    }
  }

  fn disarm(&mut self) { self.armed = false; }
}

impl Drop for CancelGuard {
  fn drop(&mut self) {
    if self.armed {
      self.cancel();
    }
  }
}
