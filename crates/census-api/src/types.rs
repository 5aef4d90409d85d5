//! Handlers for `/types/{kind}` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/types/{kind}` | List params; search defaults to `name` |
//! | `POST`   | `/types/{kind}` | Body: [`NewEntityType`]; key slugified from name when absent |
//! | `GET`    | `/types/{kind}/{key}` | 404 if not found |
//! | `PATCH`  | `/types/{kind}/{key}` | Key rename cascades to instances |
//! | `DELETE` | `/types/{kind}/{key}` | 409 while instances reference it |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  entity::{EntityType, NewEntityType, UpdateEntityType},
  key::TypeKey,
  kind::EntityKind,
  store::CensusStore,
};

use crate::{
  document::{Document, ListDocument},
  error::ApiError,
  params::list_query_from_pairs,
};

/// `GET /types/{kind}`
pub async fn list<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(kind): Path<EntityKind>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListDocument<EntityType>>, ApiError> {
  let query = list_query_from_pairs(&pairs)?;
  let page = store
    .list_types(kind, &query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /types/{kind}`
pub async fn create<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(kind): Path<EntityKind>,
  Json(body): Json<NewEntityType>,
) -> Result<impl IntoResponse, ApiError> {
  let entity_type = store
    .create_type(kind, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Document::new(entity_type))))
}

/// `GET /types/{kind}/{key}`
pub async fn get_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path((kind, key)): Path<(EntityKind, TypeKey)>,
) -> Result<Json<Document<EntityType>>, ApiError> {
  let entity_type = store
    .get_type(kind, &key)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("{kind} type {key} not found")))?;
  Ok(Json(Document::new(entity_type)))
}

/// `PATCH /types/{kind}/{key}`
pub async fn update_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path((kind, key)): Path<(EntityKind, TypeKey)>,
  Json(body): Json<UpdateEntityType>,
) -> Result<Json<Document<EntityType>>, ApiError> {
  let entity_type = store
    .update_type(kind, &key, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(entity_type)))
}

/// `DELETE /types/{kind}/{key}`
pub async fn delete_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path((kind, key)): Path<(EntityKind, TypeKey)>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_type(kind, &key)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}
