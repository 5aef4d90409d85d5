//! List-query parameters shared by every list operation.
//!
//! These are plain data; interpreting them against a concrete table (column
//! allowlists, join rules, default ordering) is the storage layer's job.

// ─── Sort order ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

impl SortOrder {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "asc" => Some(Self::Asc),
      "desc" => Some(Self::Desc),
      _ => None,
    }
  }

  /// The SQL keyword for this direction.
  pub fn keyword(self) -> &'static str {
    match self {
      Self::Asc => "ASC",
      Self::Desc => "DESC",
    }
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

/// Free-text search input: either a plain string matched against the entity's
/// default search field, or a per-field map matched field by field (AND).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
  Text(String),
  /// `(field, needle)` pairs in submission order. Field names use the object
  /// layer's camelCase convention.
  Fields(Vec<(String, String)>),
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for a list operation. All fields are optional and independent.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
  pub limit:  Option<u32>,
  pub offset: Option<u32>,
  /// Logical sort key in camelCase, e.g. `"familyName"` or `"personType"`.
  pub sort:   Option<String>,
  pub order:  Option<SortOrder>,
  pub search: Option<SearchFilter>,
}

impl ListQuery {
  pub fn is_empty(&self) -> bool {
    self.limit.is_none()
      && self.offset.is_none()
      && self.sort.is_none()
      && self.order.is_none()
      && self.search.is_none()
  }
}
