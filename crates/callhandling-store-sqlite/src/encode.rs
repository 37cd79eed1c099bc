//! Encoding and decoding helpers between domain records and the plain
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings, timestamps the store
//! assigns itself (`deleted_at`) as RFC 3339 strings, event types as their
//! label.

use std::str::FromStr as _;

use callhandling_core::{
  call::Call,
  callhandling::Callhandling,
  event::{Event, EventType},
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── EventType ───────────────────────────────────────────────────────────────

pub fn decode_event_type(s: &str) -> Result<EventType> {
  EventType::from_str(s).map_err(|_| Error::EventType(s.to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Every `calls` column maps onto a primitive, so no raw form is needed.
pub fn read_call(row: &rusqlite::Row<'_>) -> rusqlite::Result<Call> {
  Ok(Call {
    call_id:         row.get(0)?,
    sid:             row.get(1)?,
    conversation_id: row.get(2)?,
    ani:             row.get(3)?,
    dnis:            row.get(4)?,
    status:          row.get(5)?,
  })
}

/// Raw strings read directly from a `callhandlings` row.
pub struct RawCallhandling {
  pub id:   String,
  pub name: String,
}

impl RawCallhandling {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, name: row.get(1)? })
  }

  pub fn into_callhandling(self) -> Result<Callhandling> {
    Ok(Callhandling { id: decode_uuid(&self.id)?, name: self.name })
  }
}

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub call_id:     i64,
  pub event_type:  String,
  pub identity_id: i64,
  pub timestamp:   i64,
  pub meta:        String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      call_id:     row.get(0)?,
      event_type:  row.get(1)?,
      identity_id: row.get(2)?,
      timestamp:   row.get(3)?,
      meta:        row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      call_id:     self.call_id,
      event_type:  decode_event_type(&self.event_type)?,
      identity_id: self.identity_id,
      timestamp:   self.timestamp,
      meta:        self.meta,
    })
  }
}
