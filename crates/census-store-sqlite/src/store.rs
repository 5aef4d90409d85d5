//! [`SqliteStore`] — the SQLite implementation of [`CensusStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use census_core::{
  dimension::{
    Dimension, DimensionInput, validate_dimensions, validate_schema_list,
  },
  entity::{
    EntityType, Event, Fact, NewEntityType, NewEvent, NewFact, NewPerson,
    NewResource, Person, Resource, UpdateEntityType, UpdateEvent, UpdateFact,
    UpdatePerson, UpdateResource,
  },
  key::TypeKey,
  kind::EntityKind,
  query::ListQuery,
  store::{CensusStore, Page},
  tag::{Tag, validate_pathname},
};

use crate::{
  Error, Result,
  encode::{
    RawEntityType, RawEvent, RawFact, RawPerson, RawResource, RawTag,
    encode_dimensions, encode_dt, encode_schemas, encode_uuid,
  },
  query::{self, BuiltQuery, build_list_query},
  schema::SCHEMA,
  tags,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Census registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Shared plumbing ───────────────────────────────────────────────────────

  /// Execute a built list query: the result statement, then the count
  /// statement against the same parameters.
  async fn run_list<R>(
    &self,
    built: BuiltQuery,
    map_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
  ) -> Result<(Vec<R>, u64)>
  where
    R: Send + 'static,
  {
    let (rows, count) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&built.sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(built.params.iter()),
            map_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let count: i64 = conn.query_row(
          &built.count_sql,
          rusqlite::params_from_iter(built.params.iter()),
          |r| r.get(0),
        )?;

        Ok((rows, count))
      })
      .await?;
    Ok((rows, count.max(0) as u64))
  }

  async fn fetch_type(
    &self,
    kind: EntityKind,
    key: TypeKey,
  ) -> Result<Option<EntityType>> {
    let kind_str = kind.to_string();
    let key_str = key.to_string();

    let raw: Option<RawEntityType> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT key, name, dimension_schemas, created_at, updated_at
               FROM entity_types WHERE kind = ?1 AND key = ?2",
              rusqlite::params![kind_str, key_str],
              RawEntityType::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|r| r.into_entity_type(kind)).transpose()
  }

  /// The type record an instance write is validated against.
  async fn require_type(
    &self,
    kind: EntityKind,
    key: &TypeKey,
  ) -> Result<EntityType> {
    self
      .fetch_type(kind, key.clone())
      .await?
      .ok_or_else(|| Error::TypeNotFound { kind, key: key.clone() })
  }

  async fn load_tags(
    &self,
    kind: EntityKind,
    object_id: Uuid,
  ) -> Result<Vec<String>> {
    let tags = self
      .conn
      .call(move |conn| Ok(tags::tags_for_object(conn, object_id, kind)?))
      .await?;
    Ok(tags)
  }

  async fn load_tags_many(
    &self,
    kind: EntityKind,
    object_ids: Vec<String>,
  ) -> Result<HashMap<String, Vec<String>>> {
    let map = self
      .conn
      .call(move |conn| {
        Ok(tags::tags_for_objects(conn, kind, &object_ids)?)
      })
      .await?;
    Ok(map)
  }
}

/// Validate every pathname in a tag list before it reaches the store.
fn check_pathnames(pathnames: &[String]) -> Result<()> {
  for pathname in pathnames {
    validate_pathname(pathname).map_err(Error::Core)?;
  }
  Ok(())
}

fn sorted(mut tags: Vec<String>) -> Vec<String> {
  tags.sort();
  tags
}

// ─── CensusStore impl ────────────────────────────────────────────────────────

impl CensusStore for SqliteStore {
  type Error = Error;

  // ── Type records ──────────────────────────────────────────────────────────

  async fn create_type(
    &self,
    kind: EntityKind,
    input: NewEntityType,
  ) -> Result<EntityType> {
    validate_schema_list(&input.dimension_schemas)?;
    let key = input.resolve_key().map_err(Error::Core)?;

    if self.fetch_type(kind, key.clone()).await?.is_some() {
      return Err(Error::DuplicateTypeKey { kind, key });
    }

    let now = Utc::now();
    let entity_type = EntityType {
      key,
      kind,
      name: input.name,
      dimension_schemas: input.dimension_schemas,
      created_at: now,
      updated_at: now,
    };

    let kind_str    = kind.to_string();
    let key_str     = entity_type.key.to_string();
    let name        = entity_type.name.clone();
    let schemas_str = encode_schemas(&entity_type.dimension_schemas)?;
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entity_types
             (kind, key, name, dimension_schemas, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            kind_str, key_str, name, schemas_str, at_str, at_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(entity_type)
  }

  async fn get_type(
    &self,
    kind: EntityKind,
    key: &TypeKey,
  ) -> Result<Option<EntityType>> {
    self.fetch_type(kind, key.clone()).await
  }

  async fn list_types(
    &self,
    kind: EntityKind,
    query: &ListQuery,
  ) -> Result<Page<EntityType>> {
    let built = build_list_query(&query::TYPES, query, &[(
      "entity_types.kind = ?",
      kind.to_string(),
    )])?;
    let (raws, total) =
      self.run_list(built, RawEntityType::from_row).await?;
    let items = raws
      .into_iter()
      .map(|r| r.into_entity_type(kind))
      .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total })
  }

  async fn update_type(
    &self,
    kind: EntityKind,
    key: &TypeKey,
    update: UpdateEntityType,
  ) -> Result<EntityType> {
    let existing = self.require_type(kind, key).await?;

    if let Some(schemas) = &update.dimension_schemas {
      validate_schema_list(schemas)?;
    }

    let new_key = update.key.unwrap_or_else(|| existing.key.clone());
    if new_key != existing.key
      && self.fetch_type(kind, new_key.clone()).await?.is_some()
    {
      return Err(Error::DuplicateTypeKey { kind, key: new_key });
    }

    let merged = EntityType {
      key:               new_key,
      kind,
      name:              update.name.unwrap_or(existing.name),
      dimension_schemas: update
        .dimension_schemas
        .unwrap_or(existing.dimension_schemas),
      created_at:        existing.created_at,
      updated_at:        Utc::now(),
    };

    let kind_str    = kind.to_string();
    let old_key_str = key.to_string();
    let new_key_str = merged.key.to_string();
    let name        = merged.name.clone();
    let schemas_str = encode_schemas(&merged.dimension_schemas)?;
    let at_str      = encode_dt(merged.updated_at);

    // A key change cascades through instance rows via the composite foreign
    // key's ON UPDATE CASCADE.
    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE entity_types
           SET key = ?1, name = ?2, dimension_schemas = ?3, updated_at = ?4
           WHERE kind = ?5 AND key = ?6",
          rusqlite::params![
            new_key_str, name, schemas_str, at_str, kind_str, old_key_str
          ],
        )?;
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::TypeNotFound { kind, key: key.clone() });
    }
    Ok(merged)
  }

  async fn delete_type(&self, kind: EntityKind, key: &TypeKey) -> Result<()> {
    let kind_str = kind.to_string();
    let key_str = key.to_string();
    let count_sql =
      format!("SELECT COUNT(*) FROM {} WHERE type_key = ?1", kind.table());

    let (in_use, deleted) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let in_use: i64 = tx.query_row(
          &count_sql,
          rusqlite::params![key_str],
          |r| r.get(0),
        )?;
        if in_use > 0 {
          return Ok((in_use, 0));
        }
        let deleted = tx.execute(
          "DELETE FROM entity_types WHERE kind = ?1 AND key = ?2",
          rusqlite::params![kind_str, key_str],
        )?;
        tx.commit()?;
        Ok((0, deleted))
      })
      .await?;

    if in_use > 0 {
      return Err(Error::TypeInUse {
        kind,
        key: key.clone(),
        count: in_use as u64,
      });
    }
    if deleted == 0 {
      return Err(Error::TypeNotFound { kind, key: key.clone() });
    }
    Ok(())
  }

  // ── People ────────────────────────────────────────────────────────────────

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let kind = EntityKind::Person;
    let entity_type = self.require_type(kind, &input.type_key).await?;
    let dimensions =
      validate_dimensions(&input.dimensions, &entity_type.dimension_schemas)?;
    check_pathnames(&input.tags)?;

    let now = Utc::now();
    let person = Person {
      person_id: Uuid::new_v4(),
      type_key: input.type_key,
      given_name: input.given_name,
      family_name: input.family_name,
      dimensions,
      tags: sorted(input.tags.clone()),
      created_at: now,
      updated_at: now,
    };

    let id          = person.person_id;
    let id_str      = encode_uuid(id);
    let type_key    = person.type_key.to_string();
    let given_name  = person.given_name.clone();
    let family_name = person.family_name.clone();
    let dims_str    = encode_dimensions(&person.dimensions)?;
    let at_str      = encode_dt(now);
    let insert_tags = input.tags;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO people
             (person_id, type_key, given_name, family_name, dimensions,
              created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, type_key, given_name, family_name, dims_str, at_str,
            at_str
          ],
        )?;
        tags::set_tags_for_object(&tx, id, kind, &insert_tags, false)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT person_id, type_key, given_name, family_name,
                      dimensions, created_at, updated_at
               FROM people WHERE person_id = ?1",
              rusqlite::params![id_str],
              RawPerson::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      None => Ok(None),
      Some(raw) => {
        let tags = self.load_tags(EntityKind::Person, id).await?;
        Ok(Some(raw.into_person(tags)?))
      }
    }
  }

  async fn list_people(&self, query: &ListQuery) -> Result<Page<Person>> {
    let built = build_list_query(&query::PEOPLE, query, &[])?;
    let (raws, total) = self.run_list(built, RawPerson::from_row).await?;

    let ids: Vec<String> =
      raws.iter().map(|r| r.person_id.clone()).collect();
    let mut tag_map =
      self.load_tags_many(EntityKind::Person, ids).await?;

    let items = raws
      .into_iter()
      .map(|raw| {
        let tags = tag_map.remove(&raw.person_id).unwrap_or_default();
        raw.into_person(tags)
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total })
  }

  async fn update_person(
    &self,
    id: Uuid,
    update: UpdatePerson,
  ) -> Result<Person> {
    let kind = EntityKind::Person;
    let existing = self
      .get_person(id)
      .await?
      .ok_or(Error::RecordNotFound { kind, id })?;

    let type_key = update.type_key.unwrap_or(existing.type_key);
    let entity_type = self.require_type(kind, &type_key).await?;

    // Either the submitted dimensions or the stored ones — both must satisfy
    // the (possibly newly referenced) type's schema list.
    let dim_inputs: Vec<DimensionInput> = match update.dimensions {
      Some(inputs) => inputs,
      None => existing.dimensions.iter().map(Dimension::to_input).collect(),
    };
    let dimensions =
      validate_dimensions(&dim_inputs, &entity_type.dimension_schemas)?;

    if let Some(tags) = &update.tags {
      check_pathnames(tags)?;
    }
    let final_tags = match &update.tags {
      Some(tags) => sorted(tags.clone()),
      None => existing.tags,
    };

    let person = Person {
      person_id: id,
      type_key,
      given_name: update.given_name.unwrap_or(existing.given_name),
      family_name: update.family_name.unwrap_or(existing.family_name),
      dimensions,
      tags: final_tags,
      created_at: existing.created_at,
      updated_at: Utc::now(),
    };

    let id_str      = encode_uuid(id);
    let type_key    = person.type_key.to_string();
    let given_name  = person.given_name.clone();
    let family_name = person.family_name.clone();
    let dims_str    = encode_dimensions(&person.dimensions)?;
    let at_str      = encode_dt(person.updated_at);
    let update_tags = update.tags;

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE people
           SET type_key = ?1, given_name = ?2, family_name = ?3,
               dimensions = ?4, updated_at = ?5
           WHERE person_id = ?6",
          rusqlite::params![
            type_key, given_name, family_name, dims_str, at_str, id_str
          ],
        )?;
        if n > 0 {
          if let Some(tags) = &update_tags {
            tags::set_tags_for_object(&tx, id, kind, tags, true)?;
          }
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(person)
  }

  async fn delete_person(&self, id: Uuid) -> Result<()> {
    let kind = EntityKind::Person;
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM people WHERE person_id = ?1",
          rusqlite::params![id_str],
        )?;
        if n > 0 {
          tags::delete_tags_for_object(&tx, id, kind)?;
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(())
  }

  // ── Resources ─────────────────────────────────────────────────────────────

  async fn create_resource(&self, input: NewResource) -> Result<Resource> {
    let kind = EntityKind::Resource;
    let entity_type = self.require_type(kind, &input.type_key).await?;
    let dimensions =
      validate_dimensions(&input.dimensions, &entity_type.dimension_schemas)?;
    check_pathnames(&input.tags)?;

    let now = Utc::now();
    let resource = Resource {
      resource_id: Uuid::new_v4(),
      type_key: input.type_key,
      name: input.name,
      dimensions,
      tags: sorted(input.tags.clone()),
      created_at: now,
      updated_at: now,
    };

    let id          = resource.resource_id;
    let id_str      = encode_uuid(id);
    let type_key    = resource.type_key.to_string();
    let name        = resource.name.clone();
    let dims_str    = encode_dimensions(&resource.dimensions)?;
    let at_str      = encode_dt(now);
    let insert_tags = input.tags;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO resources
             (resource_id, type_key, name, dimensions, created_at,
              updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, type_key, name, dims_str, at_str, at_str],
        )?;
        tags::set_tags_for_object(&tx, id, kind, &insert_tags, false)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(resource)
  }

  async fn get_resource(&self, id: Uuid) -> Result<Option<Resource>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawResource> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT resource_id, type_key, name, dimensions, created_at,
                      updated_at
               FROM resources WHERE resource_id = ?1",
              rusqlite::params![id_str],
              RawResource::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      None => Ok(None),
      Some(raw) => {
        let tags = self.load_tags(EntityKind::Resource, id).await?;
        Ok(Some(raw.into_resource(tags)?))
      }
    }
  }

  async fn list_resources(
    &self,
    query: &ListQuery,
  ) -> Result<Page<Resource>> {
    let built = build_list_query(&query::RESOURCES, query, &[])?;
    let (raws, total) = self.run_list(built, RawResource::from_row).await?;

    let ids: Vec<String> =
      raws.iter().map(|r| r.resource_id.clone()).collect();
    let mut tag_map =
      self.load_tags_many(EntityKind::Resource, ids).await?;

    let items = raws
      .into_iter()
      .map(|raw| {
        let tags = tag_map.remove(&raw.resource_id).unwrap_or_default();
        raw.into_resource(tags)
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total })
  }

  async fn update_resource(
    &self,
    id: Uuid,
    update: UpdateResource,
  ) -> Result<Resource> {
    let kind = EntityKind::Resource;
    let existing = self
      .get_resource(id)
      .await?
      .ok_or(Error::RecordNotFound { kind, id })?;

    let type_key = update.type_key.unwrap_or(existing.type_key);
    let entity_type = self.require_type(kind, &type_key).await?;

    let dim_inputs: Vec<DimensionInput> = match update.dimensions {
      Some(inputs) => inputs,
      None => existing.dimensions.iter().map(Dimension::to_input).collect(),
    };
    let dimensions =
      validate_dimensions(&dim_inputs, &entity_type.dimension_schemas)?;

    if let Some(tags) = &update.tags {
      check_pathnames(tags)?;
    }
    let final_tags = match &update.tags {
      Some(tags) => sorted(tags.clone()),
      None => existing.tags,
    };

    let resource = Resource {
      resource_id: id,
      type_key,
      name: update.name.unwrap_or(existing.name),
      dimensions,
      tags: final_tags,
      created_at: existing.created_at,
      updated_at: Utc::now(),
    };

    let id_str      = encode_uuid(id);
    let type_key    = resource.type_key.to_string();
    let name        = resource.name.clone();
    let dims_str    = encode_dimensions(&resource.dimensions)?;
    let at_str      = encode_dt(resource.updated_at);
    let update_tags = update.tags;

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE resources
           SET type_key = ?1, name = ?2, dimensions = ?3, updated_at = ?4
           WHERE resource_id = ?5",
          rusqlite::params![type_key, name, dims_str, at_str, id_str],
        )?;
        if n > 0 {
          if let Some(tags) = &update_tags {
            tags::set_tags_for_object(&tx, id, kind, tags, true)?;
          }
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(resource)
  }

  async fn delete_resource(&self, id: Uuid) -> Result<()> {
    let kind = EntityKind::Resource;
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM resources WHERE resource_id = ?1",
          rusqlite::params![id_str],
        )?;
        if n > 0 {
          tags::delete_tags_for_object(&tx, id, kind)?;
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(())
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    let kind = EntityKind::Event;
    let entity_type = self.require_type(kind, &input.type_key).await?;
    let dimensions =
      validate_dimensions(&input.dimensions, &entity_type.dimension_schemas)?;
    check_pathnames(&input.tags)?;

    let now = Utc::now();
    let event = Event {
      event_id: Uuid::new_v4(),
      type_key: input.type_key,
      name: input.name,
      occurred_at: input.occurred_at,
      dimensions,
      tags: sorted(input.tags.clone()),
      created_at: now,
      updated_at: now,
    };

    let id           = event.event_id;
    let id_str       = encode_uuid(id);
    let type_key     = event.type_key.to_string();
    let name         = event.name.clone();
    let occurred_str = encode_dt(event.occurred_at);
    let dims_str     = encode_dimensions(&event.dimensions)?;
    let at_str       = encode_dt(now);
    let insert_tags  = input.tags;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO events
             (event_id, type_key, name, occurred_at, dimensions, created_at,
              updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, type_key, name, occurred_str, dims_str, at_str, at_str
          ],
        )?;
        tags::set_tags_for_object(&tx, id, kind, &insert_tags, false)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT event_id, type_key, name, occurred_at, dimensions,
                      created_at, updated_at
               FROM events WHERE event_id = ?1",
              rusqlite::params![id_str],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      None => Ok(None),
      Some(raw) => {
        let tags = self.load_tags(EntityKind::Event, id).await?;
        Ok(Some(raw.into_event(tags)?))
      }
    }
  }

  async fn list_events(&self, query: &ListQuery) -> Result<Page<Event>> {
    let built = build_list_query(&query::EVENTS, query, &[])?;
    let (raws, total) = self.run_list(built, RawEvent::from_row).await?;

    let ids: Vec<String> = raws.iter().map(|r| r.event_id.clone()).collect();
    let mut tag_map = self.load_tags_many(EntityKind::Event, ids).await?;

    let items = raws
      .into_iter()
      .map(|raw| {
        let tags = tag_map.remove(&raw.event_id).unwrap_or_default();
        raw.into_event(tags)
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total })
  }

  async fn update_event(
    &self,
    id: Uuid,
    update: UpdateEvent,
  ) -> Result<Event> {
    let kind = EntityKind::Event;
    let existing = self
      .get_event(id)
      .await?
      .ok_or(Error::RecordNotFound { kind, id })?;

    let type_key = update.type_key.unwrap_or(existing.type_key);
    let entity_type = self.require_type(kind, &type_key).await?;

    let dim_inputs: Vec<DimensionInput> = match update.dimensions {
      Some(inputs) => inputs,
      None => existing.dimensions.iter().map(Dimension::to_input).collect(),
    };
    let dimensions =
      validate_dimensions(&dim_inputs, &entity_type.dimension_schemas)?;

    if let Some(tags) = &update.tags {
      check_pathnames(tags)?;
    }
    let final_tags = match &update.tags {
      Some(tags) => sorted(tags.clone()),
      None => existing.tags,
    };

    let event = Event {
      event_id: id,
      type_key,
      name: update.name.unwrap_or(existing.name),
      occurred_at: update.occurred_at.unwrap_or(existing.occurred_at),
      dimensions,
      tags: final_tags,
      created_at: existing.created_at,
      updated_at: Utc::now(),
    };

    let id_str       = encode_uuid(id);
    let type_key     = event.type_key.to_string();
    let name         = event.name.clone();
    let occurred_str = encode_dt(event.occurred_at);
    let dims_str     = encode_dimensions(&event.dimensions)?;
    let at_str       = encode_dt(event.updated_at);
    let update_tags  = update.tags;

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE events
           SET type_key = ?1, name = ?2, occurred_at = ?3, dimensions = ?4,
               updated_at = ?5
           WHERE event_id = ?6",
          rusqlite::params![
            type_key, name, occurred_str, dims_str, at_str, id_str
          ],
        )?;
        if n > 0 {
          if let Some(tags) = &update_tags {
            tags::set_tags_for_object(&tx, id, kind, tags, true)?;
          }
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(event)
  }

  async fn delete_event(&self, id: Uuid) -> Result<()> {
    let kind = EntityKind::Event;
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM events WHERE event_id = ?1",
          rusqlite::params![id_str],
        )?;
        if n > 0 {
          tags::delete_tags_for_object(&tx, id, kind)?;
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(())
  }

  // ── Facts ─────────────────────────────────────────────────────────────────

  async fn create_fact(&self, input: NewFact) -> Result<Fact> {
    let kind = EntityKind::Fact;
    let entity_type = self.require_type(kind, &input.type_key).await?;
    let dimensions =
      validate_dimensions(&input.dimensions, &entity_type.dimension_schemas)?;
    check_pathnames(&input.tags)?;

    let now = Utc::now();
    let fact = Fact {
      fact_id: Uuid::new_v4(),
      type_key: input.type_key,
      observed_at: input.observed_at,
      note: input.note,
      dimensions,
      tags: sorted(input.tags.clone()),
      created_at: now,
      updated_at: now,
    };

    let id           = fact.fact_id;
    let id_str       = encode_uuid(id);
    let type_key     = fact.type_key.to_string();
    let observed_str = encode_dt(fact.observed_at);
    let note         = fact.note.clone();
    let dims_str     = encode_dimensions(&fact.dimensions)?;
    let at_str       = encode_dt(now);
    let insert_tags  = input.tags;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO facts
             (fact_id, type_key, observed_at, note, dimensions, created_at,
              updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, type_key, observed_str, note, dims_str, at_str, at_str
          ],
        )?;
        tags::set_tags_for_object(&tx, id, kind, &insert_tags, false)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(fact)
  }

  async fn get_fact(&self, id: Uuid) -> Result<Option<Fact>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawFact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT fact_id, type_key, observed_at, note, dimensions,
                      created_at, updated_at
               FROM facts WHERE fact_id = ?1",
              rusqlite::params![id_str],
              RawFact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      None => Ok(None),
      Some(raw) => {
        let tags = self.load_tags(EntityKind::Fact, id).await?;
        Ok(Some(raw.into_fact(tags)?))
      }
    }
  }

  async fn list_facts(&self, query: &ListQuery) -> Result<Page<Fact>> {
    let built = build_list_query(&query::FACTS, query, &[])?;
    let (raws, total) = self.run_list(built, RawFact::from_row).await?;

    let ids: Vec<String> = raws.iter().map(|r| r.fact_id.clone()).collect();
    let mut tag_map = self.load_tags_many(EntityKind::Fact, ids).await?;

    let items = raws
      .into_iter()
      .map(|raw| {
        let tags = tag_map.remove(&raw.fact_id).unwrap_or_default();
        raw.into_fact(tags)
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total })
  }

  async fn update_fact(&self, id: Uuid, update: UpdateFact) -> Result<Fact> {
    let kind = EntityKind::Fact;
    let existing = self
      .get_fact(id)
      .await?
      .ok_or(Error::RecordNotFound { kind, id })?;

    let type_key = update.type_key.unwrap_or(existing.type_key);
    let entity_type = self.require_type(kind, &type_key).await?;

    let dim_inputs: Vec<DimensionInput> = match update.dimensions {
      Some(inputs) => inputs,
      None => existing.dimensions.iter().map(Dimension::to_input).collect(),
    };
    let dimensions =
      validate_dimensions(&dim_inputs, &entity_type.dimension_schemas)?;

    if let Some(tags) = &update.tags {
      check_pathnames(tags)?;
    }
    let final_tags = match &update.tags {
      Some(tags) => sorted(tags.clone()),
      None => existing.tags,
    };

    let fact = Fact {
      fact_id: id,
      type_key,
      observed_at: update.observed_at.unwrap_or(existing.observed_at),
      note: update.note.or(existing.note),
      dimensions,
      tags: final_tags,
      created_at: existing.created_at,
      updated_at: Utc::now(),
    };

    let id_str       = encode_uuid(id);
    let type_key     = fact.type_key.to_string();
    let observed_str = encode_dt(fact.observed_at);
    let note         = fact.note.clone();
    let dims_str     = encode_dimensions(&fact.dimensions)?;
    let at_str       = encode_dt(fact.updated_at);
    let update_tags  = update.tags;

    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "UPDATE facts
           SET type_key = ?1, observed_at = ?2, note = ?3, dimensions = ?4,
               updated_at = ?5
           WHERE fact_id = ?6",
          rusqlite::params![
            type_key, observed_str, note, dims_str, at_str, id_str
          ],
        )?;
        if n > 0 {
          if let Some(tags) = &update_tags {
            tags::set_tags_for_object(&tx, id, kind, tags, true)?;
          }
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(fact)
  }

  async fn delete_fact(&self, id: Uuid) -> Result<()> {
    let kind = EntityKind::Fact;
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let n = tx.execute(
          "DELETE FROM facts WHERE fact_id = ?1",
          rusqlite::params![id_str],
        )?;
        if n > 0 {
          tags::delete_tags_for_object(&tx, id, kind)?;
        }
        tx.commit()?;
        Ok(n)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::RecordNotFound { kind, id });
    }
    Ok(())
  }

  // ── Tags ──────────────────────────────────────────────────────────────────

  async fn set_tags(
    &self,
    object_id: Uuid,
    kind: EntityKind,
    pathnames: &[String],
    is_update: bool,
  ) -> Result<Vec<String>> {
    check_pathnames(pathnames)?;
    let list = pathnames.to_vec();

    let applied = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !tags::object_exists(&tx, kind, object_id)? {
          return Ok(false);
        }
        tags::set_tags_for_object(&tx, object_id, kind, &list, is_update)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !applied {
      return Err(Error::RecordNotFound { kind, id: object_id });
    }
    self.load_tags(kind, object_id).await
  }

  async fn list_tags(&self, query: &ListQuery) -> Result<Page<Tag>> {
    let built = build_list_query(&query::TAGS, query, &[])?;
    let (raws, total) = self.run_list(built, RawTag::from_row).await?;
    let items = raws
      .into_iter()
      .map(RawTag::into_tag)
      .collect::<Result<Vec<_>>>()?;
    Ok(Page { items, total })
  }
}
