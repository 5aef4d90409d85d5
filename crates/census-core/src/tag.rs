//! Tags — slash-path labels attachable to any instance entity.
//!
//! Tags have an independent lifecycle: a pathname is created lazily the first
//! time it is referenced and is never deleted automatically, only detached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A tag record. `pathname` is globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
  pub tag_id:   Uuid,
  /// Slash-delimited hierarchical label, e.g. `"region/north"`.
  pub pathname: String,
}

/// Check a caller-supplied pathname before it reaches the store. Matching is
/// exact, so the only rules are non-emptiness and no surrounding whitespace.
pub fn validate_pathname(pathname: &str) -> Result<()> {
  if pathname.is_empty() || pathname.trim() != pathname {
    return Err(Error::InvalidTagPathname(pathname.to_owned()));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::validate_pathname;

  #[test]
  fn pathnames_must_be_trimmed_and_non_empty() {
    assert!(validate_pathname("a/b").is_ok());
    assert!(validate_pathname("plain").is_ok());
    assert!(validate_pathname("").is_err());
    assert!(validate_pathname(" padded").is_err());
    assert!(validate_pathname("padded ").is_err());
  }
}
