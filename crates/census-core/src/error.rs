//! Error types for `census-core`.

use thiserror::Error;

use crate::dimension::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid type key: {0:?}")]
  InvalidTypeKey(String),

  #[error("invalid tag pathname: {0:?}")]
  InvalidTagPathname(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
