//! Call: one row of the `calls` table.

use serde::{Deserialize, Serialize};

/// A single telephony call.
///
/// Created once when the call is first seen. `status` is the only field
/// expected to change over the call's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
  /// Caller-assigned identifier; the primary key.
  pub call_id:         i64,
  /// Routing/session identifier.
  pub sid:             i64,
  pub conversation_id: i64,
  /// Origin number.
  pub ani:             String,
  /// Destination number.
  pub dnis:            String,
  /// Free-text lifecycle label, e.g. `"active"`.
  pub status:          String,
}
