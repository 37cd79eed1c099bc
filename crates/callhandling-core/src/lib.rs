//! Core types and trait definitions for the call handling store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It defines the three persisted records, the error taxonomy every store
//! operation normalizes to, the request [`Context`](context::Context) that
//! carries deadlines and borrowed transactions, and the capability traits
//! storage backends implement.

pub mod call;
pub mod callhandling;
pub mod context;
pub mod error;
pub mod event;
pub mod store;

pub use error::{Error, ErrorKind, Result};
