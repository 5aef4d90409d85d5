//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | List params; plain search matches family name |
//! | `POST`   | `/people` | Body: [`NewPerson`]; 201 + stored record |
//! | `GET`    | `/people/{id}` | 404 if not found |
//! | `PATCH`  | `/people/{id}` | Partial update; tags are full-replace |
//! | `DELETE` | `/people/{id}` | 204; cascades tag associations |
//! | `PUT`    | `/people/{id}/tags` | Body: `{"tags": [...]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  entity::{NewPerson, Person, UpdatePerson},
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

/// `GET /people`
pub async fn list<S: CensusStore>(
  State(store): State<Arc<S>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListDocument<Person>>, ApiError> {
  let query = list_query_from_pairs(&pairs)?;
  let page = store
    .list_people(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}

/// `POST /people`
pub async fn create<S: CensusStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  let person = store
    .create_person(body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(Document::new(person))))
}

/// `GET /people/{id}`
pub async fn get_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Document<Person>>, ApiError> {
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(Document::new(person)))
}

/// `PATCH /people/{id}`
pub async fn update_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdatePerson>,
) -> Result<Json<Document<Person>>, ApiError> {
  let person = store
    .update_person(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(person)))
}

/// `DELETE /people/{id}`
pub async fn delete_one<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  store
    .delete_person(id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PUT /people/{id}/tags` — replace the association set.
pub async fn set_tags<S: CensusStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TagsBody>,
) -> Result<Json<Document<Vec<String>>>, ApiError> {
  let tags = store
    .set_tags(id, EntityKind::Person, &body.tags, true)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Document::new(tags)))
}
