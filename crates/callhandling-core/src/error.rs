//! Error taxonomy shared by every store operation.
//!
//! Each failure is one of a small fixed set of kinds. Failures raised while
//! executing a statement carry the [`Operation`] that failed: what was being
//! done and to which key or record, so upstream logs can identify the call
//! without a stack trace.

use std::fmt;

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;
use uuid::Uuid;

use crate::{call::Call, callhandling::Callhandling, event::Event};

// ─── Operation context ───────────────────────────────────────────────────────

/// What a failing operation was doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
  Get,
  List,
  Create,
  Update,
  Delete,
  Begin,
  Commit,
  Rollback,
  Ping,
}

/// The key or record an operation was applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
  CallId(i64),
  Call(Call),
  CallhandlingId(Uuid),
  Callhandling(Callhandling),
  /// Events are looked up by the call they belong to.
  EventsOf(i64),
  Event(Event),
  Transaction,
  Database,
}

impl Subject {
  pub fn entity(&self) -> &'static str {
    match self {
      Subject::CallId(_) | Subject::Call(_) => "call",
      Subject::CallhandlingId(_) | Subject::Callhandling(_) => "callhandling",
      Subject::EventsOf(_) | Subject::Event(_) => "event",
      Subject::Transaction => "transaction",
      Subject::Database => "database",
    }
  }
}

/// An action applied to a subject, e.g. `get call - 1000`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
  pub action:  Action,
  pub subject: Subject,
}

impl Operation {
  pub fn new(action: Action, subject: Subject) -> Self { Self { action, subject } }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.action, self.subject.entity())?;
    match &self.subject {
      Subject::CallId(id) | Subject::EventsOf(id) => write!(f, " - {id}"),
      Subject::CallhandlingId(id) => write!(f, " - {id}"),
      Subject::Call(call) => write!(f, " - {call:?}"),
      Subject::Callhandling(ch) => write!(f, " - {ch:?}"),
      Subject::Event(event) => write!(f, " - {event:?}"),
      Subject::Transaction | Subject::Database => Ok(()),
    }
  }
}

// ─── Error ───────────────────────────────────────────────────────────────────

/// Plain discriminant of an [`Error`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
  NotFound,
  NoRowsAffected,
  NoTransactionInContext,
  MalformedIdentifier,
  Timeout,
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  /// A lookup or delete targeted zero existing rows.
  #[error(
    "error executing {op}: the record you are attempting to find or update is not found"
  )]
  NotFound { op: Box<Operation> },

  /// A write reported zero affected rows.
  #[error("error executing {op}: no rows were affected")]
  NoRowsAffected { op: Box<Operation> },

  /// A transactional entry point was called without an attached transaction.
  #[error("no transaction attached to the request context")]
  NoTransactionInContext,

  #[error("malformed identifier {input:?}: {source}")]
  MalformedIdentifier {
    input:  String,
    #[source]
    source: uuid::Error,
  },

  /// The request deadline passed before the statement completed. Nothing
  /// was written.
  #[error("error executing {op}: deadline exceeded")]
  Timeout { op: Box<Operation> },

  /// Any other lower-level failure: connectivity, constraints, decoding.
  #[error("error executing {op}: {source}")]
  Store {
    op:     Box<Operation>,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  pub fn not_found(op: Operation) -> Self { Error::NotFound { op: Box::new(op) } }

  pub fn no_rows_affected(op: Operation) -> Self {
    Error::NoRowsAffected { op: Box::new(op) }
  }

  pub fn timeout(op: Operation) -> Self { Error::Timeout { op: Box::new(op) } }

  pub fn store(
    op: Operation,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
  ) -> Self {
    Error::Store { op: Box::new(op), source: source.into() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::NotFound { .. } => ErrorKind::NotFound,
      Error::NoRowsAffected { .. } => ErrorKind::NoRowsAffected,
      Error::NoTransactionInContext => ErrorKind::NoTransactionInContext,
      Error::MalformedIdentifier { .. } => ErrorKind::MalformedIdentifier,
      Error::Timeout { .. } => ErrorKind::Timeout,
      Error::Store { .. } => ErrorKind::Store,
    }
  }

  /// The failing operation, when the error came from statement execution.
  pub fn operation(&self) -> Option<&Operation> {
    match self {
      Error::NotFound { op }
      | Error::NoRowsAffected { op }
      | Error::Timeout { op }
      | Error::Store { op, .. } => Some(&**op),
      Error::NoTransactionInContext | Error::MalformedIdentifier { .. } => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::EventType;

  #[test]
  fn not_found_names_operation_and_key() {
    let err = Error::not_found(Operation::new(Action::Get, Subject::CallId(2000)));
    assert_eq!(
      err.to_string(),
      "error executing get call - 2000: the record you are attempting to find \
       or update is not found"
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[test]
  fn record_snapshot_is_rendered_in_full() {
    let event = Event {
      call_id:     2000,
      event_type:  EventType::Ringing,
      identity_id: 9090,
      timestamp:   20200101,
      meta:        "twilio_meta".into(),
    };
    let err = Error::no_rows_affected(Operation::new(
      Action::Create,
      Subject::Event(event.clone()),
    ));
    let msg = err.to_string();
    assert!(msg.starts_with("error executing create event - Event {"));
    assert!(msg.contains("twilio_meta"));
    assert!(msg.contains("9090"));
    assert_eq!(
      err.operation().map(|op| &op.subject),
      Some(&Subject::Event(event))
    );
  }

  #[test]
  fn transaction_operations_have_no_key() {
    let op = Operation::new(Action::Commit, Subject::Transaction);
    assert_eq!(op.to_string(), "commit transaction");
  }

  #[test]
  fn store_error_keeps_source() {
    let err = Error::store(
      Operation::new(Action::Ping, Subject::Database),
      "connection refused",
    );
    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(
      err.to_string(),
      "error executing ping database: connection refused"
    );
  }

  #[test]
  fn kind_labels_are_snake_case() {
    let label: &'static str = ErrorKind::NoRowsAffected.into();
    assert_eq!(label, "no_rows_affected");
  }
}
