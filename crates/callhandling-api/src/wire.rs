//! Request and response bodies, and their mapping to domain records.
//!
//! Every field defaults to its zero value when absent from the JSON body.
//! Mapping is total for calls and events; a callhandling built from a path
//! segment can fail with `MalformedIdentifier`.

use callhandling_core::{
  Result,
  call::Call,
  callhandling::{Callhandling, parse_id},
  event::{Event, EventType},
};
use serde::{Deserialize, Serialize};

// ─── Calls ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallMessage {
  pub call_id:         i64,
  pub sid:             i64,
  pub conversation_id: i64,
  pub ani:             String,
  pub dnis:            String,
  pub status:          String,
}

/// `{"call": {...}}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallRequest {
  pub call: CallMessage,
}

/// `{"status": "..."}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusRequest {
  pub status: String,
}

impl From<CallMessage> for Call {
  fn from(m: CallMessage) -> Self {
    Call {
      call_id:         m.call_id,
      sid:             m.sid,
      conversation_id: m.conversation_id,
      ani:             m.ani,
      dnis:            m.dnis,
      status:          m.status,
    }
  }
}

impl From<Call> for CallMessage {
  fn from(c: Call) -> Self {
    CallMessage {
      call_id:         c.call_id,
      sid:             c.sid,
      conversation_id: c.conversation_id,
      ani:             c.ani,
      dnis:            c.dnis,
      status:          c.status,
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// An event as it travels over the wire. On the way in `event_type` is
/// ignored; the route decides the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMessage {
  pub call_id:     i64,
  pub event_type:  String,
  pub identity_id: i64,
  pub timestamp:   i64,
  pub meta:        String,
}

/// `{"event": {...}}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventRequest {
  pub event: EventMessage,
}

/// Build the event recorded by a per-type route.
pub fn new_event(m: EventMessage, event_type: EventType) -> Event {
  Event {
    call_id: m.call_id,
    event_type,
    identity_id: m.identity_id,
    timestamp: m.timestamp,
    meta: m.meta,
  }
}

impl From<Event> for EventMessage {
  fn from(e: Event) -> Self {
    EventMessage {
      call_id:     e.call_id,
      event_type:  e.event_type.label().to_owned(),
      identity_id: e.identity_id,
      timestamp:   e.timestamp,
      meta:        e.meta,
    }
  }
}

/// Event creation acknowledges with an empty object.
#[derive(Debug, Default, Serialize)]
pub struct Empty {}

// ─── Callhandlings ───────────────────────────────────────────────────────────

/// `{"name": "..."}`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CallhandlingRequest {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallhandlingResponse {
  pub id:   String,
  pub name: String,
}

/// Build a callhandling from its textual id and a request body.
pub fn new_callhandling(
  id: &str,
  req: CallhandlingRequest,
) -> Result<Callhandling> {
  Ok(Callhandling { id: parse_id(id)?, name: req.name })
}

impl From<Callhandling> for CallhandlingResponse {
  fn from(c: Callhandling) -> Self {
    CallhandlingResponse { id: c.id.to_string(), name: c.name }
  }
}

// ─── Ping ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PingParams {
  pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
  pub data: String,
}

#[cfg(test)]
mod tests {
  use callhandling_core::ErrorKind;

  use super::*;

  #[test]
  fn new_event_takes_type_from_route() {
    let m = EventMessage {
      call_id:     1000,
      event_type:  "ringing".into(),
      identity_id: 2000,
      timestamp:   20200101,
      meta:        "twilio_meta".into(),
    };
    let e = new_event(m, EventType::Dialing);
    assert_eq!(e.call_id, 1000);
    assert_eq!(e.event_type, EventType::Dialing);
    assert_eq!(e.identity_id, 2000);
    assert_eq!(e.timestamp, 20200101);
    assert_eq!(e.meta, "twilio_meta");
  }

  #[test]
  fn event_response_carries_label() {
    let e = Event {
      call_id:     1,
      event_type:  EventType::VoicemailCreated,
      identity_id: 2,
      timestamp:   3,
      meta:        String::new(),
    };
    assert_eq!(EventMessage::from(e).event_type, "voicemail created");
  }

  #[test]
  fn missing_fields_default_to_zero() {
    let req: CallRequest =
      serde_json::from_str(r#"{"call":{"call_id":7}}"#).unwrap();
    let call = Call::from(req.call);
    assert_eq!(call.call_id, 7);
    assert_eq!(call.sid, 0);
    assert_eq!(call.status, "");

    let req: EventRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(req.event, EventMessage::default());
  }

  #[test]
  fn malformed_callhandling_id_is_rejected() {
    let err = new_callhandling("abc", CallhandlingRequest::default())
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedIdentifier);

    let ch = new_callhandling(
      "72bc87f3-4a9f-4d05-93fe-844d3cd94c65",
      CallhandlingRequest { name: "main".into() },
    )
    .unwrap();
    assert_eq!(
      CallhandlingResponse::from(ch).id,
      "72bc87f3-4a9f-4d05-93fe-844d3cd94c65"
    );
  }
}
