//! The four instance entity classes of the registry.
//!
//! Every taggable record belongs to exactly one kind. The kind doubles as the
//! `object_type` discriminant on tag associations and as the dispatch key for
//! per-kind storage tables, so table names never come from caller input.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The class of an instance entity (and of the type record describing it).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Person,
  Resource,
  Event,
  Fact,
}

impl EntityKind {
  /// The storage table holding instance rows of this kind.
  pub fn table(self) -> &'static str {
    match self {
      Self::Person => "people",
      Self::Resource => "resources",
      Self::Event => "events",
      Self::Fact => "facts",
    }
  }

  /// The primary-key column of [`EntityKind::table`].
  pub fn id_column(self) -> &'static str {
    match self {
      Self::Person => "person_id",
      Self::Resource => "resource_id",
      Self::Event => "event_id",
      Self::Fact => "fact_id",
    }
  }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr as _;

  use super::EntityKind;

  #[test]
  fn kind_round_trips_through_strings() {
    for kind in [
      EntityKind::Person,
      EntityKind::Resource,
      EntityKind::Event,
      EntityKind::Fact,
    ] {
      let s = kind.to_string();
      assert_eq!(EntityKind::from_str(&s).unwrap(), kind);
    }
  }

  #[test]
  fn unknown_kind_is_rejected() {
    assert!(EntityKind::from_str("widget").is_err());
  }
}
