//! Handlers for `/resources` endpoints. Same shape as `/people`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  entity::{NewResource, Resource, UpdateResource},
  kind::EntityKind,
  store::CensusStore,
};
use uuid::Uuid;

use crate::{
  document::{Document, ListDocument},
  error::ApiError,
  params::list_query_from_pairs,
  tags::TagsBody,
};

/// `GET /resources`
pub async fn list<S: CensusStore>(
  State(store): State<Arc<S>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListDocument<Resource>>, ApiError> {
  let query = list_query_from_pairs(&pairs)?;
  let page = store
    .list_resources(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /resources`
pub async fn create<S: CensusStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewResource>,
) -> Result<impl IntoResponse, ApiError> {
  let resource = store
    .create_resource(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Document::new(resource))))
}

/// `GET /resources/{id}`
pub async fn get_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Document<Resource>>, ApiError> {
  let resource = store
    .get_resource(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("resource {id} not found")))?;
  Ok(Json(Document::new(resource)))
}

/// `PATCH /resources/{id}`
pub async fn update_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateResource>,
) -> Result<Json<Document<Resource>>, ApiError> {
  let resource = store
    .update_resource(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(resource)))
}

/// `DELETE /resources/{id}`
pub async fn delete_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_resource(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /resources/{id}/tags`
pub async fn set_tags<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TagsBody>,
) -> Result<Json<Document<Vec<String>>>, ApiError> {
  let tags = store
    .set_tags(id, EntityKind::Resource, &body.tags, true)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(tags)))
}
