//! Type records and the four instance entity shapes.
//!
//! A type record declares a dimension schema list; instance records reference
//! their type by [`TypeKey`] and carry validated dimensions plus tag
//! pathnames. API-facing structs serialize in camelCase — the object layer's
//! convention — while the storage layer speaks snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  dimension::{Dimension, DimensionInput, DimensionSchema},
  key::TypeKey,
  kind::EntityKind,
};

// ─── Type records ────────────────────────────────────────────────────────────

/// A type record: the owner of a dimension schema list. One table serves all
/// four kinds; `key` is unique within its kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityType {
  pub key:               TypeKey,
  pub kind:              EntityKind,
  pub name:              String,
  pub dimension_schemas: Vec<DimensionSchema>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to `create_type`. When `key` is absent it is derived from `name`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntityType {
  pub name:              String,
  pub key:               Option<TypeKey>,
  #[serde(default)]
  pub dimension_schemas: Vec<DimensionSchema>,
}

impl NewEntityType {
  /// The key to store: the supplied one, or a slug of the name.
  pub fn resolve_key(&self) -> Result<TypeKey> {
    match &self.key {
      Some(key) => Ok(key.clone()),
      None => TypeKey::from_name(&self.name),
    }
  }
}

/// Partial update for a type record. A new `key` cascades through instance
/// rows; a new schema list replaces the old one wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntityType {
  pub name:              Option<String>,
  pub key:               Option<TypeKey>,
  pub dimension_schemas: Option<Vec<DimensionSchema>>,
}

// ─── People ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub person_id:   Uuid,
  pub type_key:    TypeKey,
  pub given_name:  String,
  pub family_name: String,
  pub dimensions:  Vec<Dimension>,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
  pub type_key:    TypeKey,
  pub given_name:  String,
  pub family_name: String,
  #[serde(default)]
  pub dimensions:  Vec<DimensionInput>,
  #[serde(default)]
  pub tags:        Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerson {
  pub type_key:    Option<TypeKey>,
  pub given_name:  Option<String>,
  pub family_name: Option<String>,
  pub dimensions:  Option<Vec<DimensionInput>>,
  /// Full-replace semantics: `Some` replaces the association set, `None`
  /// leaves it untouched.
  pub tags:        Option<Vec<String>>,
}

// ─── Resources ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
  pub resource_id: Uuid,
  pub type_key:    TypeKey,
  pub name:        String,
  pub dimensions:  Vec<Dimension>,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
  pub type_key:   TypeKey,
  pub name:       String,
  #[serde(default)]
  pub dimensions: Vec<DimensionInput>,
  #[serde(default)]
  pub tags:       Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResource {
  pub type_key:   Option<TypeKey>,
  pub name:       Option<String>,
  pub dimensions: Option<Vec<DimensionInput>>,
  pub tags:       Option<Vec<String>>,
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub event_id:    Uuid,
  pub type_key:    TypeKey,
  pub name:        String,
  pub occurred_at: DateTime<Utc>,
  pub dimensions:  Vec<Dimension>,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
  pub type_key:    TypeKey,
  pub name:        String,
  pub occurred_at: DateTime<Utc>,
  #[serde(default)]
  pub dimensions:  Vec<DimensionInput>,
  #[serde(default)]
  pub tags:        Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
  pub type_key:    Option<TypeKey>,
  pub name:        Option<String>,
  pub occurred_at: Option<DateTime<Utc>>,
  pub dimensions:  Option<Vec<DimensionInput>>,
  pub tags:        Option<Vec<String>>,
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// An observation record. Facts carry their data almost entirely in
/// dimensions; `note` is the only free-text column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
  pub fact_id:     Uuid,
  pub type_key:    TypeKey,
  pub observed_at: DateTime<Utc>,
  pub note:        Option<String>,
  pub dimensions:  Vec<Dimension>,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFact {
  pub type_key:    TypeKey,
  pub observed_at: DateTime<Utc>,
  pub note:        Option<String>,
  #[serde(default)]
  pub dimensions:  Vec<DimensionInput>,
  #[serde(default)]
  pub tags:        Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFact {
  pub type_key:    Option<TypeKey>,
  pub observed_at: Option<DateTime<Utc>>,
  pub note:        Option<String>,
  pub dimensions:  Option<Vec<DimensionInput>>,
  pub tags:        Option<Vec<String>>,
}
