//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure surfaces as `{ "errors": [{title, detail, code}, ...] }`.
//! Store errors are classified through [`StoreFault`] so this layer never
//! matches on a concrete backend's variants; internal details are logged
//! here and replaced with a generic message before they reach the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use census_core::store::{Fault, StoreFault};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One error item in the response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorItem {
  pub title:  String,
  pub detail: String,
  pub code:   String,
}

impl ErrorItem {
  fn new(title: &str, detail: impl Into<String>, code: &str) -> Self {
    Self {
      title:  title.to_owned(),
      detail: detail.into(),
      code:   code.to_owned(),
    }
  }
}

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failure")]
  Validation(Vec<String>),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error")]
  Internal,
}

impl ApiError {
  /// Map a store error onto the wire shape via its fault classification.
  pub fn from_store<E>(error: E) -> Self
  where
    E: std::error::Error + StoreFault,
  {
    match error.fault() {
      Fault::NotFound => Self::NotFound(error.to_string()),
      Fault::Validation(v) => Self::Validation(v.messages.clone()),
      Fault::BadQuery => Self::BadRequest(error.to_string()),
      Fault::Conflict => Self::Conflict(error.to_string()),
      Fault::Internal => {
        tracing::error!(error = %error, "store error");
        Self::Internal
      }
    }
  }

  fn items(&self) -> Vec<ErrorItem> {
    match self {
      Self::NotFound(detail) => {
        vec![ErrorItem::new("Not found", detail.clone(), "E_NOT_FOUND")]
      }
      Self::BadRequest(detail) => vec![ErrorItem::new(
        "Invalid request parameter",
        detail.clone(),
        "E_QUERY",
      )],
      Self::Validation(messages) => messages
        .iter()
        .map(|m| ErrorItem::new("Validation failure", m.clone(), "E_VALIDATION"))
        .collect(),
      Self::Conflict(detail) => {
        vec![ErrorItem::new("Conflict", detail.clone(), "E_CONFLICT")]
      }
      Self::Internal => vec![ErrorItem::new(
        "Internal error",
        "an unexpected error occurred",
        "E_INTERNAL",
      )],
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "errors": self.items() }))).into_response()
  }
}
