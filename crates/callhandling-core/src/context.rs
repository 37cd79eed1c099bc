//! Per-request context: a deadline plus an optionally attached transaction.
//!
//! A [`Context`] is built by the dispatch layer for every inbound call and
//! handed by reference to store operations. Attaching a transaction never
//! transfers ownership; the context only borrows it, so the caller that began
//! the transaction is always the one that commits or rolls it back.

use std::{
  fmt,
  time::{Duration, Instant},
};

use crate::{Error, Result};

/// Request-scoped context, generic over the backend's transaction handle.
pub struct Context<'t, T> {
  deadline:    Option<Instant>,
  transaction: Option<&'t T>,
}

impl<T> Context<'static, T> {
  /// A context with no deadline and no transaction.
  pub fn background() -> Self { Self { deadline: None, transaction: None } }

  /// A fresh context that expires `timeout` from now.
  pub fn with_timeout(timeout: Duration) -> Self {
    Self::background().with_deadline(Instant::now() + timeout)
  }
}

impl<'t, T> Context<'t, T> {
  /// Narrow the deadline. A child can never outlive its parent, so the
  /// earlier of the existing and the new deadline wins.
  pub fn with_deadline(self, deadline: Instant) -> Self {
    let deadline = match self.deadline {
      Some(current) => current.min(deadline),
      None => deadline,
    };
    Self { deadline: Some(deadline), ..self }
  }

  /// Derive a child context expiring at most `timeout` from now, keeping any
  /// attached transaction.
  pub fn child(&self, timeout: Duration) -> Self {
    (*self).with_deadline(Instant::now() + timeout)
  }

  pub fn deadline(&self) -> Option<Instant> { self.deadline }

  pub fn is_expired(&self) -> bool {
    self.deadline.is_some_and(|d| d <= Instant::now())
  }

  /// Return a new context carrying `tx`. The deadline is inherited.
  pub fn with_transaction<'u>(&self, tx: &'u T) -> Context<'u, T> {
    Context { deadline: self.deadline, transaction: Some(tx) }
  }

  /// The attached transaction, or [`Error::NoTransactionInContext`].
  pub fn transaction(&self) -> Result<&'t T> {
    self.transaction.ok_or(Error::NoTransactionInContext)
  }
}

impl<T> Clone for Context<'_, T> {
  fn clone(&self) -> Self { *self }
}

impl<T> Copy for Context<'_, T> {}

impl<T> Default for Context<'static, T> {
  fn default() -> Self { Self::background() }
}

impl<T> fmt::Debug for Context<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Context")
      .field("deadline", &self.deadline)
      .field("transaction", &self.transaction.is_some())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  #[derive(Debug)]
  struct FakeTx(u32);

  #[test]
  fn background_has_no_transaction() {
    let ctx = Context::<FakeTx>::background();
    let err = ctx.transaction().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoTransactionInContext);
    assert!(ctx.deadline().is_none());
  }

  #[test]
  fn attached_transaction_is_extracted() {
    let tx = FakeTx(7);
    let ctx = Context::background().with_transaction(&tx);
    assert_eq!(ctx.transaction().unwrap().0, 7);
  }

  #[test]
  fn attaching_keeps_the_deadline() {
    let tx = FakeTx(1);
    let parent = Context::<FakeTx>::with_timeout(Duration::from_secs(1));
    let child = parent.with_transaction(&tx);
    assert_eq!(child.deadline(), parent.deadline());
  }

  #[test]
  fn child_never_extends_parent_deadline() {
    let parent = Context::<FakeTx>::with_timeout(Duration::from_millis(10));
    let child = parent.child(Duration::from_secs(60));
    assert_eq!(child.deadline(), parent.deadline());

    let relaxed = Context::<FakeTx>::with_timeout(Duration::from_secs(60));
    let tighter = relaxed.child(Duration::ZERO);
    assert!(tighter.deadline() < relaxed.deadline());
  }

  #[test]
  fn past_deadline_is_expired() {
    let ctx = Context::<FakeTx>::background().with_deadline(Instant::now());
    assert!(ctx.is_expired());
    assert!(!Context::<FakeTx>::background().is_expired());
  }
}
