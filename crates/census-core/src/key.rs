//! `TypeKey` — the stable string identifier of a type record.
//!
//! Instance rows reference their type by this key rather than by a surrogate
//! id, so a type can be renamed without touching instance rows; renaming the
//! key itself cascades through the storage layer's foreign keys.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A validated type key: non-empty, lowercase alphanumerics and underscores.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TypeKey(String);

impl TypeKey {
  /// Parse a caller-supplied key, rejecting anything slugify would not have
  /// produced.
  pub fn parse(s: &str) -> Result<Self> {
    if s.is_empty()
      || !s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
      return Err(Error::InvalidTypeKey(s.to_owned()));
    }
    Ok(Self(s.to_owned()))
  }

  /// Derive a key from a display name: lowercase, non-alphanumeric runs
  /// become a single underscore, edge underscores are trimmed.
  pub fn from_name(name: &str) -> Result<Self> {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
      if c.is_ascii_alphanumeric() {
        out.push(c.to_ascii_lowercase());
      } else if !out.ends_with('_') {
        out.push('_');
      }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
      return Err(Error::InvalidTypeKey(name.to_owned()));
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for TypeKey {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for TypeKey {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<TypeKey> for String {
  fn from(k: TypeKey) -> Self { k.0 }
}

#[cfg(test)]
mod tests {
  use super::TypeKey;

  #[test]
  fn from_name_slugifies() {
    assert_eq!(TypeKey::from_name("Field Worker").unwrap().as_str(), "field_worker");
    assert_eq!(TypeKey::from_name("My Type!").unwrap().as_str(), "my_type");
    assert_eq!(TypeKey::from_name("a -- b").unwrap().as_str(), "a_b");
    assert_eq!(TypeKey::from_name("PHQ-9").unwrap().as_str(), "phq_9");
  }

  #[test]
  fn from_name_rejects_all_symbol_names() {
    assert!(TypeKey::from_name("!!!").is_err());
  }

  #[test]
  fn parse_accepts_slug_shaped_keys_only() {
    assert!(TypeKey::parse("field_worker").is_ok());
    assert!(TypeKey::parse("Field").is_err());
    assert!(TypeKey::parse("a b").is_err());
    assert!(TypeKey::parse("").is_err());
  }
}
