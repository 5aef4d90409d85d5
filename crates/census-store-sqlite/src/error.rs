//! Error type for `census-store-sqlite`.

use census_core::{
  dimension::ValidationError,
  key::TypeKey,
  kind::EntityKind,
  store::{Fault, StoreFault},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] census_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("{kind} type not found: {key}")]
  TypeNotFound { kind: EntityKind, key: TypeKey },

  #[error("{kind} type key already taken: {key}")]
  DuplicateTypeKey { kind: EntityKind, key: TypeKey },

  #[error("{kind} type {key} is referenced by {count} record(s)")]
  TypeInUse { kind: EntityKind, key: TypeKey, count: u64 },

  #[error("{kind} not found: {id}")]
  RecordNotFound { kind: EntityKind, id: Uuid },

  #[error("unknown sort field: {0:?}")]
  UnknownSortField(String),

  #[error("unknown search field: {0:?}")]
  UnknownSearchField(String),
}

impl Error {
  /// Whether the underlying database error is a uniqueness or foreign-key
  /// constraint violation.
  fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _),
      )) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

impl StoreFault for Error {
  fn fault(&self) -> Fault<'_> {
    match self {
      Error::Validation(e) => Fault::Validation(e),
      Error::Core(census_core::Error::Validation(e)) => Fault::Validation(e),
      Error::Core(
        census_core::Error::InvalidTypeKey(_)
        | census_core::Error::InvalidTagPathname(_),
      ) => Fault::BadQuery,
      Error::TypeNotFound { .. } | Error::RecordNotFound { .. } => {
        Fault::NotFound
      }
      Error::DuplicateTypeKey { .. } | Error::TypeInUse { .. } => {
        Fault::Conflict
      }
      Error::UnknownSortField(_) | Error::UnknownSearchField(_) => {
        Fault::BadQuery
      }
      e if e.is_constraint_violation() => Fault::Conflict,
      _ => Fault::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
