//! JSON REST API for Census.
//!
//! Exposes an axum [`Router`] backed by any [`census_core::store::CensusStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", census_api::api_router(store.clone()))
//! ```

pub mod document;
pub mod error;
pub mod events;
pub mod facts;
pub mod params;
pub mod people;
pub mod resources;
pub mod tags;
pub mod types;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use census_core::store::CensusStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CensusStore + 'static,
{
  Router::new()
    // Type records
    .route(
      "/types/{kind}",
      get(types::list::<S>).post(types::create::<S>),
    )
    .route(
      "/types/{kind}/{key}",
      get(types::get_one::<S>)
        .patch(types::update_one::<S>)
        .delete(types::delete_one::<S>),
    )
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>)
        .patch(people::update_one::<S>)
        .delete(people::delete_one::<S>),
    )
    .route("/people/{id}/tags", put(people::set_tags::<S>))
    // Resources
    .route(
      "/resources",
      get(resources::list::<S>).post(resources::create::<S>),
    )
    .route(
      "/resources/{id}",
      get(resources::get_one::<S>)
        .patch(resources::update_one::<S>)
        .delete(resources::delete_one::<S>),
    )
    .route("/resources/{id}/tags", put(resources::set_tags::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route(
      "/events/{id}",
      get(events::get_one::<S>)
        .patch(events::update_one::<S>)
        .delete(events::delete_one::<S>),
    )
    .route("/events/{id}/tags", put(events::set_tags::<S>))
    // Facts
    .route("/facts", get(facts::list::<S>).post(facts::create::<S>))
    .route(
      "/facts/{id}",
      get(facts::get_one::<S>)
        .patch(facts::update_one::<S>)
        .delete(facts::delete_one::<S>),
    )
    .route("/facts/{id}/tags", put(facts::set_tags::<S>))
    // Tags
    .route("/tags", get(tags::list::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
  };
  use census_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::api_router;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder.body(Body::from(json.to_string())).unwrap()
      }
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
  }

  fn worker_type_body() -> Value {
    json!({
      "name": "Field Worker",
      "dimensionSchemas": [
        { "key": "age", "name": "Age", "dataType": "number",
          "isRequired": true }
      ]
    })
  }

  fn person_body(family: &str) -> Value {
    json!({
      "typeKey": "field_worker",
      "givenName": "Ada",
      "familyName": family,
      "dimensions": [{ "key": "age", "value": 34 }],
      "tags": ["crew/alpha"]
    })
  }

  async fn seed_worker_type(app: &Router) {
    let (status, _) =
      send(app, "POST", "/types/person", Some(worker_type_body())).await;
    assert_eq!(status, StatusCode::CREATED);
  }

  // ── Types ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_type_slugifies_and_wraps_in_data() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/types/person", Some(worker_type_body())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["key"], "field_worker");
    assert_eq!(body["data"]["dimensionSchemas"][0]["dataType"], "number");
  }

  #[tokio::test]
  async fn duplicate_type_key_is_a_conflict() {
    let app = app().await;
    seed_worker_type(&app).await;

    let (status, body) =
      send(&app, "POST", "/types/person", Some(worker_type_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["code"], "E_CONFLICT");
  }

  #[tokio::test]
  async fn unknown_kind_in_path_is_a_client_error() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/types/widget", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── People ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn person_create_get_round_trip() {
    let app = app().await;
    seed_worker_type(&app).await;

    let (status, body) =
      send(&app, "POST", "/people", Some(person_body("Liddell"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["personId"].as_str().unwrap().to_owned();
    assert_eq!(body["data"]["tags"], json!(["crew/alpha"]));

    let (status, body) =
      send(&app, "GET", &format!("/people/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["familyName"], "Liddell");
    assert_eq!(body["data"]["dimensions"][0]["value"]["kind"], "number");
  }

  #[tokio::test]
  async fn list_envelope_carries_the_filter_only_count() {
    let app = app().await;
    seed_worker_type(&app).await;
    for family in ["Liddell", "Moreno", "Zhang"] {
      send(&app, "POST", "/people", Some(person_body(family))).await;
    }

    let (status, body) = send(&app, "GET", "/people?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["count"], 3);
  }

  #[tokio::test]
  async fn bracketed_search_params_filter_the_list() {
    let app = app().await;
    seed_worker_type(&app).await;
    for family in ["Liddell", "Moreno"] {
      send(&app, "POST", "/people", Some(person_body(family))).await;
    }

    let (status, body) = send(
      &app,
      "GET",
      "/people?search%5BfamilyName%5D=lidd",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["familyName"], "Liddell");
  }

  #[tokio::test]
  async fn validation_failures_list_every_problem() {
    let app = app().await;
    seed_worker_type(&app).await;

    let mut body = person_body("Liddell");
    body["dimensions"] = json!([{ "key": "age", "value": "abc" }]);
    let (status, body) = send(&app, "POST", "/people", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"][0]["code"], "E_VALIDATION");
    assert_eq!(body["errors"][0]["detail"], "Expected number but got 'abc'");
  }

  #[tokio::test]
  async fn missing_person_is_not_found() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "GET",
      "/people/00000000-0000-4000-8000-000000000000",
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["code"], "E_NOT_FOUND");
  }

  #[tokio::test]
  async fn delete_returns_no_content_and_then_404() {
    let app = app().await;
    seed_worker_type(&app).await;
    let (_, created) =
      send(&app, "POST", "/people", Some(person_body("Liddell"))).await;
    let id = created["data"]["personId"].as_str().unwrap().to_owned();

    let (status, body) =
      send(&app, "DELETE", &format!("/people/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "GET", &format!("/people/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn put_tags_replaces_the_association_set() {
    let app = app().await;
    seed_worker_type(&app).await;
    let (_, created) =
      send(&app, "POST", "/people", Some(person_body("Liddell"))).await;
    let id = created["data"]["personId"].as_str().unwrap().to_owned();

    let (status, body) = send(
      &app,
      "PUT",
      &format!("/people/{id}/tags"),
      Some(json!({ "tags": ["a/c"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["a/c"]));

    let (_, fetched) =
      send(&app, "GET", &format!("/people/{id}"), None).await;
    assert_eq!(fetched["data"]["tags"], json!(["a/c"]));
  }

  // ── Parameters ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bad_order_parameter_is_a_bad_request() {
    let app = app().await;
    let (status, body) =
      send(&app, "GET", "/people?sort=familyName&order=sideways", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["code"], "E_QUERY");
  }

  #[tokio::test]
  async fn unknown_sort_field_is_a_bad_request() {
    let app = app().await;
    let (status, _) =
      send(&app, "GET", "/people?sort=passwordHash", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Tags ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tag_listing_supports_search() {
    let app = app().await;
    seed_worker_type(&app).await;
    send(&app, "POST", "/people", Some(person_body("Liddell"))).await;

    let mut second = person_body("Moreno");
    second["tags"] = json!(["region/north"]);
    send(&app, "POST", "/people", Some(second)).await;

    let (status, body) =
      send(&app, "GET", "/tags?search=region", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["count"], 1);
    assert_eq!(body["data"][0]["pathname"], "region/north");
  }
}
