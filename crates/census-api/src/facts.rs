//! Handlers for `/facts` endpoints. Same shape as `/people`; the default
//! list order is observed-at descending.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  entity::{Fact, NewFact, UpdateFact},
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

/// `GET /facts`
pub async fn list<S: CensusStore>(
  State(store): State<Arc<S>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListDocument<Fact>>, ApiError> {
  let query = list_query_from_pairs(&pairs)?;
  let page = store
    .list_facts(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /facts`
pub async fn create<S: CensusStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFact>,
) -> Result<impl IntoResponse, ApiError> {
  let fact = store
    .create_fact(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Document::new(fact))))
}

/// `GET /facts/{id}`
pub async fn get_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Document<Fact>>, ApiError> {
  let fact = store
    .get_fact(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("fact {id} not found")))?;
  Ok(Json(Document::new(fact)))
}

/// `PATCH /facts/{id}`
pub async fn update_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateFact>,
) -> Result<Json<Document<Fact>>, ApiError> {
  let fact = store
    .update_fact(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(fact)))
}

/// `DELETE /facts/{id}`
pub async fn delete_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store.delete_fact(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /facts/{id}/tags`
pub async fn set_tags<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TagsBody>,
) -> Result<Json<Document<Vec<String>>>, ApiError> {
  let tags = store
    .set_tags(id, EntityKind::Fact, &body.tags, true)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(tags)))
}
