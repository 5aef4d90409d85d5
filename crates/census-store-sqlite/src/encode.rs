//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Dimension values and schema
//! lists are stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use census_core::{
  dimension::{Dimension, DimensionSchema},
  entity::{EntityType, Event, Fact, Person, Resource},
  key::TypeKey,
  kind::EntityKind,
  tag::Tag,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_type_key(s: &str) -> Result<TypeKey> {
  TypeKey::parse(s).map_err(Error::Core)
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_dimensions(dims: &[Dimension]) -> Result<String> {
  Ok(serde_json::to_string(dims)?)
}

pub fn decode_dimensions(s: &str) -> Result<Vec<Dimension>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_schemas(schemas: &[DimensionSchema]) -> Result<String> {
  Ok(serde_json::to_string(schemas)?)
}

pub fn decode_schemas(s: &str) -> Result<Vec<DimensionSchema>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read from an `entity_types` row. The kind is not selected —
/// every query is already scoped to one kind.
pub struct RawEntityType {
  pub key:               String,
  pub name:              String,
  pub dimension_schemas: String,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawEntityType {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      key:               row.get(0)?,
      name:              row.get(1)?,
      dimension_schemas: row.get(2)?,
      created_at:        row.get(3)?,
      updated_at:        row.get(4)?,
    })
  }

  pub fn into_entity_type(self, kind: EntityKind) -> Result<EntityType> {
    Ok(EntityType {
      key: decode_type_key(&self.key)?,
      kind,
      name: self.name,
      dimension_schemas: decode_schemas(&self.dimension_schemas)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `people` row.
pub struct RawPerson {
  pub person_id:   String,
  pub type_key:    String,
  pub given_name:  String,
  pub family_name: String,
  pub dimensions:  String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:   row.get(0)?,
      type_key:    row.get(1)?,
      given_name:  row.get(2)?,
      family_name: row.get(3)?,
      dimensions:  row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_person(self, tags: Vec<String>) -> Result<Person> {
    Ok(Person {
      person_id: decode_uuid(&self.person_id)?,
      type_key: decode_type_key(&self.type_key)?,
      given_name: self.given_name,
      family_name: self.family_name,
      dimensions: decode_dimensions(&self.dimensions)?,
      tags,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `resources` row.
pub struct RawResource {
  pub resource_id: String,
  pub type_key:    String,
  pub name:        String,
  pub dimensions:  String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawResource {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      resource_id: row.get(0)?,
      type_key:    row.get(1)?,
      name:        row.get(2)?,
      dimensions:  row.get(3)?,
      created_at:  row.get(4)?,
      updated_at:  row.get(5)?,
    })
  }

  pub fn into_resource(self, tags: Vec<String>) -> Result<Resource> {
    Ok(Resource {
      resource_id: decode_uuid(&self.resource_id)?,
      type_key: decode_type_key(&self.type_key)?,
      name: self.name,
      dimensions: decode_dimensions(&self.dimensions)?,
      tags,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from an `events` row.
pub struct RawEvent {
  pub event_id:    String,
  pub type_key:    String,
  pub name:        String,
  pub occurred_at: String,
  pub dimensions:  String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      type_key:    row.get(1)?,
      name:        row.get(2)?,
      occurred_at: row.get(3)?,
      dimensions:  row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_event(self, tags: Vec<String>) -> Result<Event> {
    Ok(Event {
      event_id: decode_uuid(&self.event_id)?,
      type_key: decode_type_key(&self.type_key)?,
      name: self.name,
      occurred_at: decode_dt(&self.occurred_at)?,
      dimensions: decode_dimensions(&self.dimensions)?,
      tags,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `facts` row.
pub struct RawFact {
  pub fact_id:     String,
  pub type_key:    String,
  pub observed_at: String,
  pub note:        Option<String>,
  pub dimensions:  String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawFact {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self {
      fact_id:     row.get(0)?,
      type_key:    row.get(1)?,
      observed_at: row.get(2)?,
      note:        row.get(3)?,
      dimensions:  row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_fact(self, tags: Vec<String>) -> Result<Fact> {
    Ok(Fact {
      fact_id: decode_uuid(&self.fact_id)?,
      type_key: decode_type_key(&self.type_key)?,
      observed_at: decode_dt(&self.observed_at)?,
      note: self.note,
      dimensions: decode_dimensions(&self.dimensions)?,
      tags,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read from a `tags` row.
pub struct RawTag {
  pub tag_id:   String,
  pub pathname: String,
}

impl RawTag {
  pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
    Ok(Self { tag_id: row.get(0)?, pathname: row.get(1)? })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag { tag_id: decode_uuid(&self.tag_id)?, pathname: self.pathname })
  }
}
