//! The statement registry.
//!
//! Every query the store runs is listed here under a stable key
//! (`get-call`, `create-event`, ...). All of them are prepared when the store
//! opens and then served from the connection's statement cache, whether the
//! caller runs standalone or inside a transaction.
//!
//! Inserts use `INSERT OR IGNORE`: a constraint-driven no-op reports zero
//! affected rows instead of an error, which the record services surface as
//! `NoRowsAffected`.

use strum::{EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Statement {
  GetCall,
  CreateCall,
  UpdateCall,
  DeleteCall,
  GetCallhandling,
  CreateCallhandling,
  UpdateCallhandling,
  DeleteCallhandling,
  GetEvent,
  CreateEvent,
  ListEvents,
  Ping,
}

impl Statement {
  pub fn key(self) -> &'static str { self.into() }

  pub fn sql(self) -> &'static str {
    match self {
      // ?1 call_id
      Statement::GetCall => {
        "SELECT call_id, sid, conversation_id, ANI, DNIS, status
           FROM calls
          WHERE call_id = ?1"
      }
      Statement::CreateCall => {
        "INSERT OR IGNORE INTO calls (call_id, sid, conversation_id, ANI, DNIS, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
      }
      // ?1 is the key; the remaining parameters follow column order.
      Statement::UpdateCall => {
        "UPDATE calls
            SET sid = ?2, conversation_id = ?3, ANI = ?4, DNIS = ?5, status = ?6
          WHERE call_id = ?1"
      }
      Statement::DeleteCall => "DELETE FROM calls WHERE call_id = ?1",

      // Soft-deleted rows are invisible to everything below.
      Statement::GetCallhandling => {
        "SELECT callhandling_id, name
           FROM callhandlings
          WHERE callhandling_id = ?1
            AND deleted_at IS NULL"
      }
      Statement::CreateCallhandling => {
        "INSERT OR IGNORE INTO callhandlings (callhandling_id, name)
         VALUES (?1, ?2)"
      }
      Statement::UpdateCallhandling => {
        "UPDATE callhandlings
            SET name = ?2
          WHERE callhandling_id = ?1
            AND deleted_at IS NULL"
      }
      // ?2 deleted_at
      Statement::DeleteCallhandling => {
        "UPDATE callhandlings
            SET deleted_at = ?2
          WHERE callhandling_id = ?1
            AND deleted_at IS NULL"
      }

      Statement::GetEvent => {
        "SELECT call_id, type, identity_id, timestamp, meta
           FROM events
          WHERE call_id = ?1
          ORDER BY timestamp DESC, event_id DESC
          LIMIT 1"
      }
      Statement::CreateEvent => {
        "INSERT OR IGNORE INTO events (call_id, type, identity_id, timestamp, meta)
         VALUES (?1, ?2, ?3, ?4, ?5)"
      }
      Statement::ListEvents => {
        "SELECT call_id, type, identity_id, timestamp, meta
           FROM events
          WHERE call_id = ?1
          ORDER BY timestamp ASC, event_id ASC"
      }

      Statement::Ping => "SELECT 1",
    }
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn keys_are_kebab_case_and_unique() {
    assert_eq!(Statement::GetCall.key(), "get-call");
    assert_eq!(Statement::CreateEvent.key(), "create-event");
    assert_eq!(Statement::DeleteCallhandling.key(), "delete-callhandling");

    let keys: HashSet<_> = Statement::iter().map(Statement::key).collect();
    assert_eq!(keys.len(), Statement::iter().count());
  }

  #[test]
  fn every_statement_prepares_against_the_schema() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(crate::schema::SCHEMA).unwrap();
    for stmt in Statement::iter() {
      assert!(conn.prepare(stmt.sql()).is_ok(), "{} failed", stmt.key());
    }
  }
}
