//! The `CensusStore` trait and supporting result types.
//!
//! The trait is implemented by storage backends (e.g. `census-store-sqlite`).
//! Higher layers (`census-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  dimension::ValidationError,
  entity::{
    Event, EntityType, Fact, NewEntityType, NewEvent, NewFact, NewPerson,
    NewResource, Person, Resource, UpdateEntityType, UpdateEvent, UpdateFact,
    UpdatePerson, UpdateResource,
  },
  key::TypeKey,
  kind::EntityKind,
  query::ListQuery,
  tag::Tag,
};

// ─── Pages ───────────────────────────────────────────────────────────────────

/// A list result bundled with the filter-only total row count. `total` comes
/// from the parallel count query and ignores the pagination window.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
}

// ─── Fault classification ────────────────────────────────────────────────────

/// What a store error means to a caller, independent of the backend.
#[derive(Debug)]
pub enum Fault<'a> {
  /// The referenced record does not exist.
  NotFound,
  /// Dimension or schema validation refused the write.
  Validation(&'a ValidationError),
  /// Unknown sort/search field or otherwise malformed list parameters.
  BadQuery,
  /// A uniqueness or reference constraint was violated.
  Conflict,
  /// Anything else; details stay server-side.
  Internal,
}

/// Classify an error for boundary mapping without losing the typed error.
pub trait StoreFault {
  fn fault(&self) -> Fault<'_>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Census registry backend.
///
/// Writes that touch more than one table (instance row + tag associations,
/// type rename cascades) are transactional: they commit together or not at
/// all. Updates are last-write-wins; there is no version column.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CensusStore: Send + Sync {
  type Error: std::error::Error + StoreFault + Send + Sync + 'static;

  // ── Type records ──────────────────────────────────────────────────────

  /// Create a type record. The key is taken from the input or slugified
  /// from the name; duplicate keys within the kind are refused.
  fn create_type(
    &self,
    kind: EntityKind,
    input: NewEntityType,
  ) -> impl Future<Output = Result<EntityType, Self::Error>> + Send + '_;

  fn get_type<'a>(
    &'a self,
    kind: EntityKind,
    key: &'a TypeKey,
  ) -> impl Future<Output = Result<Option<EntityType>, Self::Error>> + Send + 'a;

  fn list_types<'a>(
    &'a self,
    kind: EntityKind,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<EntityType>, Self::Error>> + Send + 'a;

  /// Partial update. A new key cascades to instance rows; a new schema list
  /// replaces the old one wholesale.
  fn update_type<'a>(
    &'a self,
    kind: EntityKind,
    key: &'a TypeKey,
    update: UpdateEntityType,
  ) -> impl Future<Output = Result<EntityType, Self::Error>> + Send + 'a;

  /// Refused while instance rows still reference the type.
  fn delete_type<'a>(
    &'a self,
    kind: EntityKind,
    key: &'a TypeKey,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── People ────────────────────────────────────────────────────────────

  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  fn list_people<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Person>, Self::Error>> + Send + 'a;

  fn update_person(
    &self,
    id: Uuid,
    update: UpdatePerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Resources ─────────────────────────────────────────────────────────

  fn create_resource(
    &self,
    input: NewResource,
  ) -> impl Future<Output = Result<Resource, Self::Error>> + Send + '_;

  fn get_resource(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Resource>, Self::Error>> + Send + '_;

  fn list_resources<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Resource>, Self::Error>> + Send + 'a;

  fn update_resource(
    &self,
    id: Uuid,
    update: UpdateResource,
  ) -> impl Future<Output = Result<Resource, Self::Error>> + Send + '_;

  fn delete_resource(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  fn list_events<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Event>, Self::Error>> + Send + 'a;

  fn update_event(
    &self,
    id: Uuid,
    update: UpdateEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn delete_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Facts ─────────────────────────────────────────────────────────────

  fn create_fact(
    &self,
    input: NewFact,
  ) -> impl Future<Output = Result<Fact, Self::Error>> + Send + '_;

  fn get_fact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Fact>, Self::Error>> + Send + '_;

  fn list_facts<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Fact>, Self::Error>> + Send + 'a;

  fn update_fact(
    &self,
    id: Uuid,
    update: UpdateFact,
  ) -> impl Future<Output = Result<Fact, Self::Error>> + Send + '_;

  fn delete_fact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Tags ──────────────────────────────────────────────────────────────

  /// Replace (`is_update == true`) or extend (`false`) the association set
  /// for an object, creating unseen pathnames lazily. Runs in a single
  /// transaction; the object must exist. Returns the resulting pathnames,
  /// sorted.
  fn set_tags<'a>(
    &'a self,
    object_id: Uuid,
    kind: EntityKind,
    pathnames: &'a [String],
    is_update: bool,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + 'a;

  fn list_tags<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Tag>, Self::Error>> + Send + 'a;
}
