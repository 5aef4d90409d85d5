//! The tag association manager.
//!
//! Tags are resolved from pathnames lazily; associations are polymorphic
//! `(tag_id, object_id, object_type)` rows where `object_type` is the
//! [`EntityKind`] discriminant. Every function here takes the caller's
//! transaction or connection handle explicitly — there is no ambient
//! transaction state, and a failure anywhere rolls back the whole write.

use std::collections::HashMap;

use census_core::kind::EntityKind;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::encode::encode_uuid;

/// Kind-dispatched existence check for the association target. This replaces
/// the source system's trigger that interpolated `object_type` as a table
/// name: the table and id column come from the enum, never from the caller.
pub fn object_exists(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  object_id: Uuid,
) -> rusqlite::Result<bool> {
  let sql = format!(
    "SELECT 1 FROM {} WHERE {} = ?1",
    kind.table(),
    kind.id_column(),
  );
  let found: Option<i64> = conn
    .query_row(&sql, rusqlite::params![encode_uuid(object_id)], |r| r.get(0))
    .optional()?;
  Ok(found.is_some())
}

/// Replace (`is_update == true`) or extend (`false`) the association set for
/// an object. The create path skips the delete — no associations can exist
/// yet, so the redundant statement is avoided.
///
/// Pathnames are processed in input order without deduplication: a duplicate
/// in one call violates the unique triple constraint and fails fast, rolling
/// back the caller's transaction.
pub fn set_tags_for_object(
  tx: &rusqlite::Transaction,
  object_id: Uuid,
  kind: EntityKind,
  pathnames: &[String],
  is_update: bool,
) -> rusqlite::Result<()> {
  let id = encode_uuid(object_id);
  let object_type = kind.to_string();

  if is_update {
    tx.execute(
      "DELETE FROM tag_objects WHERE object_id = ?1 AND object_type = ?2",
      rusqlite::params![id, object_type],
    )?;
  }

  for pathname in pathnames {
    let existing: Option<String> = tx
      .query_row(
        "SELECT tag_id FROM tags WHERE pathname = ?1",
        rusqlite::params![pathname],
        |r| r.get(0),
      )
      .optional()?;

    let tag_id = match existing {
      Some(tag_id) => tag_id,
      None => {
        let tag_id = encode_uuid(Uuid::new_v4());
        tx.execute(
          "INSERT INTO tags (tag_id, pathname) VALUES (?1, ?2)",
          rusqlite::params![tag_id, pathname],
        )?;
        tag_id
      }
    };

    tx.execute(
      "INSERT INTO tag_objects (tag_id, object_id, object_type)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![tag_id, id, object_type],
    )?;
  }

  Ok(())
}

/// Remove all associations for an object. Called from the owning entity's
/// delete transaction so the cascade commits (or rolls back) with the row.
pub fn delete_tags_for_object(
  tx: &rusqlite::Transaction,
  object_id: Uuid,
  kind: EntityKind,
) -> rusqlite::Result<()> {
  tx.execute(
    "DELETE FROM tag_objects WHERE object_id = ?1 AND object_type = ?2",
    rusqlite::params![encode_uuid(object_id), kind.to_string()],
  )?;
  Ok(())
}

/// The pathnames associated with one object, sorted.
pub fn tags_for_object(
  conn: &rusqlite::Connection,
  object_id: Uuid,
  kind: EntityKind,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT t.pathname FROM tag_objects o
     JOIN tags t ON t.tag_id = o.tag_id
     WHERE o.object_id = ?1 AND o.object_type = ?2
     ORDER BY t.pathname",
  )?;
  stmt
    .query_map(
      rusqlite::params![encode_uuid(object_id), kind.to_string()],
      |r| r.get(0),
    )?
    .collect()
}

/// Batched tag load for list results: object id → sorted pathnames.
pub fn tags_for_objects(
  conn: &rusqlite::Connection,
  kind: EntityKind,
  object_ids: &[String],
) -> rusqlite::Result<HashMap<String, Vec<String>>> {
  if object_ids.is_empty() {
    return Ok(HashMap::new());
  }

  let placeholders = vec!["?"; object_ids.len()].join(", ");
  let sql = format!(
    "SELECT o.object_id, t.pathname FROM tag_objects o
     JOIN tags t ON t.tag_id = o.tag_id
     WHERE o.object_type = ? AND o.object_id IN ({placeholders})
     ORDER BY t.pathname",
  );

  let object_type = kind.to_string();
  let params = std::iter::once(&object_type).chain(object_ids.iter());

  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params_from_iter(params), |r| {
      Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut map: HashMap<String, Vec<String>> = HashMap::new();
  for (object_id, pathname) in rows {
    map.entry(object_id).or_default().push(pathname);
  }
  Ok(map)
}
