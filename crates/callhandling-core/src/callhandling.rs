//! Callhandling: an independent, soft-deletable routing configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Callhandling {
  pub id:   Uuid,
  pub name: String,
}

/// Parse the textual form of a callhandling identifier.
///
/// This is the only fallible step when building records from wire requests.
pub fn parse_id(input: &str) -> Result<Uuid> {
  Uuid::parse_str(input).map_err(|source| Error::MalformedIdentifier {
    input: input.to_owned(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ErrorKind;

  #[test]
  fn parses_hyphenated_uuid() {
    let id = parse_id("72bc87f3-4a9f-4d05-93fe-844d3cd94c65").unwrap();
    assert_eq!(id.to_string(), "72bc87f3-4a9f-4d05-93fe-844d3cd94c65");
  }

  #[test]
  fn rejects_garbage_with_malformed_identifier() {
    let err = parse_id("not-a-uuid").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedIdentifier);
    assert!(err.to_string().contains("not-a-uuid"));
  }
}
