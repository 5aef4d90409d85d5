//! SQL schema for the Census SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per type record; key is unique within its kind. The dimension
-- schema list is embedded, replaced wholesale on every type save.
CREATE TABLE IF NOT EXISTS entity_types (
    kind              TEXT NOT NULL,  -- 'person' | 'resource' | 'event' | 'fact'
    key               TEXT NOT NULL,
    name              TEXT NOT NULL,
    dimension_schemas TEXT NOT NULL DEFAULT '[]',  -- JSON schema list
    created_at        TEXT NOT NULL,  -- ISO 8601 UTC
    updated_at        TEXT NOT NULL,
    PRIMARY KEY (kind, key)
);

-- Instance tables reference their type by (kind, key), so renaming a type
-- key cascades from a single point of truth. type_kind is fixed per table;
-- it exists only to complete the composite foreign key.
CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    type_kind   TEXT NOT NULL DEFAULT 'person' CHECK (type_kind = 'person'),
    type_key    TEXT NOT NULL,
    given_name  TEXT NOT NULL,
    family_name TEXT NOT NULL,
    dimensions  TEXT NOT NULL DEFAULT '[]',  -- JSON list of tagged values
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    FOREIGN KEY (type_kind, type_key)
        REFERENCES entity_types (kind, key) ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS resources (
    resource_id TEXT PRIMARY KEY,
    type_kind   TEXT NOT NULL DEFAULT 'resource' CHECK (type_kind = 'resource'),
    type_key    TEXT NOT NULL,
    name        TEXT NOT NULL,
    dimensions  TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    FOREIGN KEY (type_kind, type_key)
        REFERENCES entity_types (kind, key) ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    type_kind   TEXT NOT NULL DEFAULT 'event' CHECK (type_kind = 'event'),
    type_key    TEXT NOT NULL,
    name        TEXT NOT NULL,
    occurred_at TEXT NOT NULL,
    dimensions  TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    FOREIGN KEY (type_kind, type_key)
        REFERENCES entity_types (kind, key) ON UPDATE CASCADE
);

CREATE TABLE IF NOT EXISTS facts (
    fact_id     TEXT PRIMARY KEY,
    type_kind   TEXT NOT NULL DEFAULT 'fact' CHECK (type_kind = 'fact'),
    type_key    TEXT NOT NULL,
    observed_at TEXT NOT NULL,
    note        TEXT,
    dimensions  TEXT NOT NULL DEFAULT '[]',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    FOREIGN KEY (type_kind, type_key)
        REFERENCES entity_types (kind, key) ON UPDATE CASCADE
);

-- Tags are created lazily and never deleted automatically.
CREATE TABLE IF NOT EXISTS tags (
    tag_id   TEXT PRIMARY KEY,
    pathname TEXT NOT NULL UNIQUE
);

-- Polymorphic association. object_type is the EntityKind discriminant;
-- object existence is checked in the application layer, and association rows
-- are removed inside the owning entity's delete transaction.
CREATE TABLE IF NOT EXISTS tag_objects (
    tag_id      TEXT NOT NULL REFERENCES tags (tag_id),
    object_id   TEXT NOT NULL,
    object_type TEXT NOT NULL,
    UNIQUE (tag_id, object_id, object_type)
);

CREATE INDEX IF NOT EXISTS people_type_idx     ON people(type_key);
CREATE INDEX IF NOT EXISTS resources_type_idx  ON resources(type_key);
CREATE INDEX IF NOT EXISTS events_type_idx     ON events(type_key);
CREATE INDEX IF NOT EXISTS facts_type_idx      ON facts(type_key);
CREATE INDEX IF NOT EXISTS events_occurred_idx ON events(occurred_at);
CREATE INDEX IF NOT EXISTS facts_observed_idx  ON facts(observed_at);
CREATE INDEX IF NOT EXISTS tag_objects_obj_idx ON tag_objects(object_id, object_type);

PRAGMA user_version = 1;
";
