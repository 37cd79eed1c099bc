//! [`SqliteStore`] — the SQLite implementation of [`Store`].

use std::{path::Path, sync::Arc};

use callhandling_core::{
  Result as CoreResult,
  context::Context,
  error::{Action, Operation, Subject},
  store::Store,
};
use strum::IntoEnumIterator as _;
use tokio::sync::Mutex;

use crate::{
  Result,
  callhandlings::SqliteCallhandlings,
  calls::SqliteCalls,
  events::SqliteEvents,
  exec::{Db, Scope},
  schema::SCHEMA,
  statements::Statement,
  transaction::Transaction,
};

/// Room for every registered statement plus the transaction control ones.
const STATEMENT_CACHE_CAPACITY: usize = 32;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A call handling store backed by a single SQLite file.
///
/// Cloning is cheap; all clones share one connection and one gate.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) db: Db,
  calls:         SqliteCalls,
  callhandlings: SqliteCallhandlings,
  events:        SqliteEvents,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, apply the schema, and prepare every
  /// registered statement. Fails if any statement does not prepare.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let interrupt = conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        for statement in Statement::iter() {
          conn.prepare_cached(statement.sql())?;
        }
        Ok(conn.get_interrupt_handle())
      })
      .await?;

    tracing::debug!(
      statements = Statement::iter().count(),
      "store opened and statements prepared"
    );

    let db = Db {
      conn,
      gate: Arc::new(Mutex::new(())),
      interrupt: Arc::new(interrupt),
    };
    Ok(Self {
      calls: SqliteCalls::new(db.clone()),
      callhandlings: SqliteCallhandlings::new(db.clone()),
      events: SqliteEvents::new(db.clone()),
      db,
    })
  }
}

impl Store for SqliteStore {
  type Transaction = Transaction;
  type Calls = SqliteCalls;
  type Callhandlings = SqliteCallhandlings;
  type Events = SqliteEvents;

  fn calls(&self) -> &SqliteCalls { &self.calls }

  fn callhandlings(&self) -> &SqliteCallhandlings { &self.callhandlings }

  fn events(&self) -> &SqliteEvents { &self.events }

  async fn begin(&self, ctx: &Context<'_, Transaction>) -> CoreResult<Transaction> {
    Transaction::begin(&self.db, ctx.deadline())
      .await
      .map_err(|e| e.during(Operation::new(Action::Begin, Subject::Transaction)))
  }

  async fn commit(&self, tx: Transaction) -> CoreResult<()> {
    tx.commit()
      .await
      .map_err(|e| e.during(Operation::new(Action::Commit, Subject::Transaction)))
  }

  async fn rollback(&self, tx: Transaction) -> CoreResult<()> {
    tx.rollback()
      .await
      .map_err(|e| e.during(Operation::new(Action::Rollback, Subject::Transaction)))
  }

  async fn ping(&self, ctx: &Context<'_, Transaction>) -> CoreResult<()> {
    self
      .db
      .run(Scope::Standalone, ctx.deadline(), Statement::Ping, |stmt| {
        stmt.query_row(rusqlite::params![], |row| row.get::<_, i64>(0))
      })
      .await
      .map_err(|e| e.during(Operation::new(Action::Ping, Subject::Database)))?;
    Ok(())
  }
}
