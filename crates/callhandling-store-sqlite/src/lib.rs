//! SQLite backend for the call handling store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every statement is bounded by the
//! deadline of the [`Context`](callhandling_core::context::Context) it is
//! issued under.

mod callhandlings;
mod calls;
mod encode;
mod events;
mod exec;
mod schema;
mod statements;
mod store;
mod transaction;

pub mod error;

pub use callhandlings::SqliteCallhandlings;
pub use calls::SqliteCalls;
pub use error::{Error, Result};
pub use events::SqliteEvents;
pub use store::SqliteStore;
pub use transaction::Transaction;
