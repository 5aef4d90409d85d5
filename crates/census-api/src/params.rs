//! List-parameter parsing from raw query pairs.
//!
//! The list endpoints accept `limit`, `offset`, `sort`, `order` and either a
//! plain `search=needle` or per-field `search[field]=needle` pairs. Bracketed
//! keys do not fit a flat deserialization, so the pairs are taken raw and
//! folded here. Unknown parameters are ignored; malformed known ones are
//! refused.

use census_core::query::{ListQuery, SearchFilter, SortOrder};

use crate::error::ApiError;

pub fn list_query_from_pairs(
  pairs: &[(String, String)],
) -> Result<ListQuery, ApiError> {
  let mut query = ListQuery::default();
  let mut fields: Vec<(String, String)> = Vec::new();

  for (name, value) in pairs {
    match name.as_str() {
      "limit" => {
        query.limit = Some(value.parse().map_err(|_| {
          ApiError::BadRequest(format!("limit is not a number: {value:?}"))
        })?);
      }
      "offset" => {
        query.offset = Some(value.parse().map_err(|_| {
          ApiError::BadRequest(format!("offset is not a number: {value:?}"))
        })?);
      }
      "sort" => query.sort = Some(value.clone()),
      "order" => {
        query.order = Some(SortOrder::parse(value).ok_or_else(|| {
          ApiError::BadRequest(format!(
            "order must be 'asc' or 'desc', got {value:?}"
          ))
        })?);
      }
      "search" => query.search = Some(SearchFilter::Text(value.clone())),
      other => {
        if let Some(field) = other
          .strip_prefix("search[")
          .and_then(|rest| rest.strip_suffix(']'))
        {
          fields.push((field.to_owned(), value.clone()));
        }
      }
    }
  }

  // A field map takes precedence over a plain search string.
  if !fields.is_empty() {
    query.search = Some(SearchFilter::Fields(fields));
  }

  Ok(query)
}

#[cfg(test)]
mod tests {
  use census_core::query::{SearchFilter, SortOrder};

  use super::list_query_from_pairs;

  fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw
      .iter()
      .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
      .collect()
  }

  #[test]
  fn parses_pagination_and_sort() {
    let q = list_query_from_pairs(&pairs(&[
      ("limit", "10"),
      ("offset", "20"),
      ("sort", "familyName"),
      ("order", "desc"),
    ]))
    .unwrap();
    assert_eq!(q.limit, Some(10));
    assert_eq!(q.offset, Some(20));
    assert_eq!(q.sort.as_deref(), Some("familyName"));
    assert_eq!(q.order, Some(SortOrder::Desc));
  }

  #[test]
  fn plain_search_is_text() {
    let q = list_query_from_pairs(&pairs(&[("search", "ada")])).unwrap();
    assert_eq!(q.search, Some(SearchFilter::Text("ada".to_owned())));
  }

  #[test]
  fn bracketed_search_builds_a_field_map() {
    let q = list_query_from_pairs(&pairs(&[
      ("search[familyName]", "li"),
      ("search[givenName]", "ada"),
    ]))
    .unwrap();
    assert_eq!(
      q.search,
      Some(SearchFilter::Fields(vec![
        ("familyName".to_owned(), "li".to_owned()),
        ("givenName".to_owned(), "ada".to_owned()),
      ]))
    );
  }

  #[test]
  fn malformed_limit_and_order_are_refused() {
    assert!(list_query_from_pairs(&pairs(&[("limit", "lots")])).is_err());
    assert!(list_query_from_pairs(&pairs(&[("order", "sideways")])).is_err());
  }

  #[test]
  fn unknown_parameters_are_ignored() {
    let q = list_query_from_pairs(&pairs(&[("include", "tags")])).unwrap();
    assert!(q.is_empty());
  }
}
