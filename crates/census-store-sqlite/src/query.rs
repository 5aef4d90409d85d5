//! The generic list-query builder.
//!
//! Every list operation is described by a [`TableSpec`]: the columns it
//! selects, which columns may be searched and sorted, the joined sort rules
//! (logical keys that order by a column of a joined table), and the default
//! ordering. [`build_list_query`] turns a spec plus caller parameters into a
//! result SQL statement and an independent count statement sharing the same
//! filter predicates.
//!
//! Callers speak camelCase (`familyName`, `personType`); columns are
//! snake_case. Converted names must land in the spec's allowlists — unknown
//! fields are refused here rather than interpolated into SQL.

use census_core::query::{ListQuery, SearchFilter, SortOrder};

use crate::{Error, Result};

// ─── Table specs ─────────────────────────────────────────────────────────────

/// A sort rule that orders by a joined table's display column instead of a
/// raw foreign-key value.
pub struct JoinedSort {
  /// Full JOIN clause, e.g.
  /// `"JOIN entity_types et ON et.kind = 'person' AND et.key = people.type_key"`.
  pub join:     &'static str,
  /// Table-qualified column to order by, e.g. `"et.name"`.
  pub order_by: &'static str,
}

/// Static description of one listable table.
pub struct TableSpec {
  pub table:                 &'static str,
  /// Selected columns, in the order the matching `Raw*::from_row` reads them.
  pub columns:               &'static [&'static str],
  /// Column matched by a plain-string `search` parameter. Tables without one
  /// ignore plain-string search.
  pub default_search_column: Option<&'static str>,
  /// Columns that may appear in a per-field search map (snake_case).
  pub searchable:            &'static [&'static str],
  /// Columns that may be sorted on directly (snake_case).
  pub sortable:              &'static [&'static str],
  /// Logical sort keys resolved through a join, keyed in snake_case.
  pub joined_sorts:          &'static [(&'static str, JoinedSort)],
  /// Table-qualified ORDER BY applied when no sort parameter is given.
  pub default_order:         &'static str,
}

pub const TYPES: TableSpec = TableSpec {
  table:                 "entity_types",
  columns:               &["key", "name", "dimension_schemas", "created_at", "updated_at"],
  default_search_column: Some("name"),
  searchable:            &["name", "key"],
  sortable:              &["name", "key", "created_at"],
  joined_sorts:          &[],
  default_order:         "entity_types.name ASC",
};

pub const PEOPLE: TableSpec = TableSpec {
  table:                 "people",
  columns:               &[
    "person_id",
    "type_key",
    "given_name",
    "family_name",
    "dimensions",
    "created_at",
    "updated_at",
  ],
  default_search_column: Some("family_name"),
  searchable:            &["given_name", "family_name", "type_key"],
  sortable:              &["given_name", "family_name", "created_at"],
  joined_sorts:          &[(
    "person_type",
    JoinedSort {
      join:     "JOIN entity_types et \
                 ON et.kind = 'person' AND et.key = people.type_key",
      order_by: "et.name",
    },
  )],
  default_order:         "people.family_name ASC, people.given_name ASC",
};

pub const RESOURCES: TableSpec = TableSpec {
  table:                 "resources",
  columns:               &[
    "resource_id",
    "type_key",
    "name",
    "dimensions",
    "created_at",
    "updated_at",
  ],
  default_search_column: Some("name"),
  searchable:            &["name", "type_key"],
  sortable:              &["name", "created_at"],
  joined_sorts:          &[(
    "resource_type",
    JoinedSort {
      join:     "JOIN entity_types et \
                 ON et.kind = 'resource' AND et.key = resources.type_key",
      order_by: "et.name",
    },
  )],
  default_order:         "resources.name ASC",
};

pub const EVENTS: TableSpec = TableSpec {
  table:                 "events",
  columns:               &[
    "event_id",
    "type_key",
    "name",
    "occurred_at",
    "dimensions",
    "created_at",
    "updated_at",
  ],
  default_search_column: Some("name"),
  searchable:            &["name", "type_key"],
  sortable:              &["name", "occurred_at", "created_at"],
  joined_sorts:          &[(
    "event_type",
    JoinedSort {
      join:     "JOIN entity_types et \
                 ON et.kind = 'event' AND et.key = events.type_key",
      order_by: "et.name",
    },
  )],
  default_order:         "events.occurred_at DESC",
};

pub const FACTS: TableSpec = TableSpec {
  table:                 "facts",
  columns:               &[
    "fact_id",
    "type_key",
    "observed_at",
    "note",
    "dimensions",
    "created_at",
    "updated_at",
  ],
  default_search_column: Some("note"),
  searchable:            &["note", "type_key"],
  sortable:              &["observed_at", "created_at"],
  joined_sorts:          &[(
    "fact_type",
    JoinedSort {
      join:     "JOIN entity_types et \
                 ON et.kind = 'fact' AND et.key = facts.type_key",
      order_by: "et.name",
    },
  )],
  default_order:         "facts.observed_at DESC",
};

pub const TAGS: TableSpec = TableSpec {
  table:                 "tags",
  columns:               &["tag_id", "pathname"],
  default_search_column: Some("pathname"),
  searchable:            &["pathname"],
  sortable:              &["pathname"],
  joined_sorts:          &[],
  default_order:         "tags.pathname ASC",
};

// ─── Builder ─────────────────────────────────────────────────────────────────

/// A built statement pair. `params` binds to the `?` placeholders of both
/// statements — the count statement shares the filter predicates but never
/// the pagination window or the sort join.
#[derive(Debug)]
pub struct BuiltQuery {
  pub sql:       String,
  pub count_sql: String,
  pub params:    Vec<String>,
}

/// Build result and count SQL for `spec` from caller parameters. `fixed`
/// prepends always-on predicates (e.g. the kind scope on `entity_types`).
pub fn build_list_query(
  spec: &TableSpec,
  query: &ListQuery,
  fixed: &[(&str, String)],
) -> Result<BuiltQuery> {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<String> = Vec::new();

  for (clause, value) in fixed {
    conds.push((*clause).to_owned());
    params.push(value.clone());
  }

  match &query.search {
    Some(SearchFilter::Text(needle)) => {
      if let Some(column) = spec.default_search_column {
        conds.push(contains_clause(spec.table, column));
        params.push(contains_pattern(needle));
      }
    }
    Some(SearchFilter::Fields(fields)) => {
      for (field, needle) in fields {
        let column = camel_to_snake(field);
        if !spec.searchable.contains(&column.as_str()) {
          return Err(Error::UnknownSearchField(field.clone()));
        }
        conds.push(contains_clause(spec.table, &column));
        params.push(contains_pattern(needle));
      }
    }
    None => {}
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!(" WHERE {}", conds.join(" AND "))
  };

  let (join_clause, order_clause) = match &query.sort {
    Some(sort) => {
      let key = camel_to_snake(sort);
      let direction = query.order.unwrap_or_default().keyword();
      if let Some((_, joined)) =
        spec.joined_sorts.iter().find(|(k, _)| *k == key)
      {
        (
          format!(" {}", joined.join),
          format!("{} {direction}", joined.order_by),
        )
      } else if spec.sortable.contains(&key.as_str()) {
        (String::new(), format!("{}.{key} {direction}", spec.table))
      } else {
        return Err(Error::UnknownSortField(sort.clone()));
      }
    }
    None => (String::new(), spec.default_order.to_owned()),
  };

  let select_list = spec
    .columns
    .iter()
    .map(|c| format!("{}.{c}", spec.table))
    .collect::<Vec<_>>()
    .join(", ");

  let page_clause = match (query.limit, query.offset) {
    (Some(limit), Some(offset)) => format!(" LIMIT {limit} OFFSET {offset}"),
    (Some(limit), None) => format!(" LIMIT {limit}"),
    // SQLite requires a LIMIT before OFFSET; -1 means unbounded.
    (None, Some(offset)) => format!(" LIMIT -1 OFFSET {offset}"),
    (None, None) => String::new(),
  };

  let sql = format!(
    "SELECT {select_list} FROM {}{join_clause}{where_clause} \
     ORDER BY {order_clause}{page_clause}",
    spec.table,
  );
  let count_sql =
    format!("SELECT COUNT(*) FROM {}{where_clause}", spec.table);

  Ok(BuiltQuery { sql, count_sql, params })
}

fn contains_clause(table: &str, column: &str) -> String {
  format!("LOWER({table}.{column}) LIKE ?")
}

fn contains_pattern(needle: &str) -> String {
  format!("%{}%", needle.to_lowercase())
}

/// Object-layer camelCase to storage-layer snake_case.
pub fn camel_to_snake(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 4);
  for c in s.chars() {
    if c.is_ascii_uppercase() {
      out.push('_');
      out.push(c.to_ascii_lowercase());
    } else {
      out.push(c);
    }
  }
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use census_core::query::{ListQuery, SearchFilter, SortOrder};

  use super::*;

  #[test]
  fn camel_to_snake_converts_field_names() {
    assert_eq!(camel_to_snake("familyName"), "family_name");
    assert_eq!(camel_to_snake("personType"), "person_type");
    assert_eq!(camel_to_snake("name"), "name");
  }

  #[test]
  fn default_query_uses_entity_default_order() {
    let built =
      build_list_query(&PEOPLE, &ListQuery::default(), &[]).unwrap();
    assert!(built.sql.contains(
      "ORDER BY people.family_name ASC, people.given_name ASC"
    ));
    assert!(!built.sql.contains("LIMIT"));
    assert_eq!(built.count_sql, "SELECT COUNT(*) FROM people");
    assert!(built.params.is_empty());
  }

  #[test]
  fn pagination_is_absent_from_the_count_statement() {
    let query = ListQuery {
      limit: Some(10),
      offset: Some(20),
      ..Default::default()
    };
    let built = build_list_query(&PEOPLE, &query, &[]).unwrap();
    assert!(built.sql.ends_with("LIMIT 10 OFFSET 20"));
    assert!(!built.count_sql.contains("LIMIT"));
  }

  #[test]
  fn offset_without_limit_is_unbounded() {
    let query = ListQuery { offset: Some(5), ..Default::default() };
    let built = build_list_query(&PEOPLE, &query, &[]).unwrap();
    assert!(built.sql.ends_with("LIMIT -1 OFFSET 5"));
  }

  #[test]
  fn plain_search_hits_the_default_column_in_both_statements() {
    let query = ListQuery {
      search: Some(SearchFilter::Text("Ada".to_owned())),
      ..Default::default()
    };
    let built = build_list_query(&PEOPLE, &query, &[]).unwrap();
    assert!(built.sql.contains("LOWER(people.family_name) LIKE ?"));
    assert!(built.count_sql.contains("LOWER(people.family_name) LIKE ?"));
    assert_eq!(built.params, vec!["%ada%"]);
  }

  #[test]
  fn field_search_converts_names_and_ands_clauses() {
    let query = ListQuery {
      search: Some(SearchFilter::Fields(vec![
        ("familyName".to_owned(), "Li".to_owned()),
        ("givenName".to_owned(), "Ada".to_owned()),
      ])),
      ..Default::default()
    };
    let built = build_list_query(&PEOPLE, &query, &[]).unwrap();
    assert!(built.sql.contains(
      "LOWER(people.family_name) LIKE ? AND LOWER(people.given_name) LIKE ?"
    ));
    assert_eq!(built.params, vec!["%li%", "%ada%"]);
  }

  #[test]
  fn unknown_search_field_is_refused() {
    let query = ListQuery {
      search: Some(SearchFilter::Fields(vec![(
        "passwordHash".to_owned(),
        "x".to_owned(),
      )])),
      ..Default::default()
    };
    let err = build_list_query(&PEOPLE, &query, &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownSearchField(_)));
  }

  #[test]
  fn joined_sort_orders_by_the_joined_display_column() {
    let query = ListQuery {
      sort: Some("personType".to_owned()),
      order: Some(SortOrder::Desc),
      ..Default::default()
    };
    let built = build_list_query(&PEOPLE, &query, &[]).unwrap();
    assert!(built.sql.contains("JOIN entity_types et"));
    assert!(built.sql.contains("ORDER BY et.name DESC"));
    // The count statement never carries the sort join.
    assert!(!built.count_sql.contains("JOIN"));
  }

  #[test]
  fn plain_sort_orders_by_the_converted_column() {
    let query = ListQuery {
      sort: Some("givenName".to_owned()),
      ..Default::default()
    };
    let built = build_list_query(&PEOPLE, &query, &[]).unwrap();
    assert!(built.sql.contains("ORDER BY people.given_name ASC"));
  }

  #[test]
  fn unknown_sort_field_is_refused() {
    let query = ListQuery {
      sort: Some("secretColumn".to_owned()),
      ..Default::default()
    };
    let err = build_list_query(&PEOPLE, &query, &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownSortField(_)));
  }

  #[test]
  fn fixed_predicates_apply_to_both_statements() {
    let fixed = [("entity_types.kind = ?", "person".to_owned())];
    let built =
      build_list_query(&TYPES, &ListQuery::default(), &fixed).unwrap();
    assert!(built.sql.contains("WHERE entity_types.kind = ?"));
    assert!(built.count_sql.contains("WHERE entity_types.kind = ?"));
    assert_eq!(built.params, vec!["person"]);
  }
}
