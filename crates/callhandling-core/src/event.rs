//! Events: the append-only lifecycle history of a call.
//!
//! An event is an immutable fact: once recorded it is never updated or
//! deleted. The call's current state is whatever its latest event says.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The fixed set of lifecycle transitions a call can go through.
///
/// Stored and rendered as the human-readable label (`"party joined"`, not
/// `PartyJoined`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum EventType {
  #[serde(rename = "dialing")]
  #[strum(serialize = "dialing")]
  Dialing,
  #[serde(rename = "ringing")]
  #[strum(serialize = "ringing")]
  Ringing,
  #[serde(rename = "connected")]
  #[strum(serialize = "connected")]
  Connected,
  #[serde(rename = "disconnected")]
  #[strum(serialize = "disconnected")]
  Disconnected,
  #[serde(rename = "party joined")]
  #[strum(serialize = "party joined")]
  PartyJoined,
  #[serde(rename = "party exited")]
  #[strum(serialize = "party exited")]
  PartyExited,
  #[serde(rename = "dispositioned")]
  #[strum(serialize = "dispositioned")]
  Dispositioned,
  #[serde(rename = "enqueued")]
  #[strum(serialize = "enqueued")]
  Enqueued,
  #[serde(rename = "voicemail created")]
  #[strum(serialize = "voicemail created")]
  VoicemailCreated,
}

impl EventType {
  /// The label persisted in the `events.type` column.
  pub fn label(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  /// The call this event belongs to. Not enforced as a foreign key.
  pub call_id:     i64,
  pub event_type:  EventType,
  /// The party that triggered the transition.
  pub identity_id: i64,
  /// Caller-supplied; never replaced by server time.
  pub timestamp:   i64,
  /// Opaque provider-specific payload.
  pub meta:        String,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn labels_round_trip_through_from_str() {
    for ty in EventType::iter() {
      assert_eq!(EventType::from_str(ty.label()).unwrap(), ty);
    }
  }

  #[test]
  fn multi_word_labels_use_spaces() {
    assert_eq!(EventType::PartyJoined.label(), "party joined");
    assert_eq!(EventType::VoicemailCreated.to_string(), "voicemail created");
  }

  #[test]
  fn unknown_label_is_rejected() {
    assert!(EventType::from_str("on hold").is_err());
  }
}
