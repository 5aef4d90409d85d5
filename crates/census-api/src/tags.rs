//! Handler for `GET /tags` and the shared tag-replacement body.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use census_core::{store::CensusStore, tag::Tag};
use serde::Deserialize;

use crate::{
  document::ListDocument,
  error::ApiError,
  params::list_query_from_pairs,
};

/// JSON body accepted by the per-entity `PUT .../tags` endpoints.
#[derive(Debug, Deserialize)]
pub struct TagsBody {
  pub tags: Vec<String>,
}

/// `GET /tags[?search=...]` — tag pickers use this for autocompletion.
pub async fn list<S: CensusStore>(
  State(store): State<Arc<S>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListDocument<Tag>>, ApiError> {
  let query = list_query_from_pairs(&pairs)?;
  let page = store
    .list_tags(&query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(page.into()))
}
