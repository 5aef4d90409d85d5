//! Handlers for `/events` endpoints. Same shape as `/people`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  entity::{Event, NewEvent, UpdateEvent},
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

/// `GET /events`
pub async fn list<S: CensusStore>(
  State(store): State<Arc<S>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListDocument<Event>>, ApiError> {
  let query = list_query_from_pairs(&pairs)?;
  let page = store
    .list_events(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /events`
pub async fn create<S: CensusStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
  let event = store
    .create_event(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Document::new(event))))
}

/// `GET /events/{id}`
pub async fn get_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Document<Event>>, ApiError> {
  let event = store
    .get_event(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(Document::new(event)))
}

/// `PATCH /events/{id}`
pub async fn update_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateEvent>,
) -> Result<Json<Document<Event>>, ApiError> {
  let event = store
    .update_event(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(event)))
}

/// `DELETE /events/{id}`
pub async fn delete_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_event(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /events/{id}/tags`
pub async fn set_tags<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TagsBody>,
) -> Result<Json<Document<Vec<String>>>, ApiError> {
  let tags = store
    .set_tags(id, EntityKind::Event, &body.tags, true)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(tags)))
}
