//! Error type for `callhandling-store-sqlite`.
//!
//! Returned directly only when opening a store. Every request-scoped
//! operation converts it into the shared taxonomy with
//! [`Error::during`], attaching the operation that failed.

use callhandling_core::error::Operation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("unknown event type stored: {0:?}")]
  EventType(String),

  #[error("deadline exceeded")]
  Timeout,

  /// The connection left the transaction, typically because an interrupted
  /// statement made SQLite roll it back.
  #[error("transaction is no longer active")]
  TransactionLost,
}

impl Error {
  /// Convert into the shared taxonomy, tagged with `op`.
  pub fn during(self, op: Operation) -> callhandling_core::Error {
    match self {
      Error::Timeout => callhandling_core::Error::timeout(op),
      other => callhandling_core::Error::store(op, other),
    }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self { Error::Database(e.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
