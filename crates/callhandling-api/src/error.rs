//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use callhandling_core::{Error, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Wraps the store taxonomy and decides
/// the status code from its kind.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self.0.kind() {
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::MalformedIdentifier => StatusCode::BAD_REQUEST,
      ErrorKind::NoRowsAffected
      | ErrorKind::NoTransactionInContext
      | ErrorKind::Timeout
      | ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let kind: &'static str = self.0.kind().into();
    let message = self.0.to_string();

    if status.is_server_error() {
      tracing::error!(kind, error = %message, "request failed");
    }
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use callhandling_core::{
    callhandling::parse_id,
    error::{Action, Operation, Subject},
  };

  use super::*;

  #[test]
  fn statuses_follow_kind() {
    let op = || Operation::new(Action::Get, Subject::CallId(1));

    assert_eq!(ApiError(Error::not_found(op())).status(), StatusCode::NOT_FOUND);
    assert_eq!(
      ApiError(parse_id("nope").unwrap_err()).status(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError(Error::no_rows_affected(op())).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      ApiError(Error::timeout(op())).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      ApiError(Error::NoTransactionInContext).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
