//! Response envelopes.
//!
//! Single records travel as `{ "data": {...} }`; lists as
//! `{ "data": [...], "meta": { "count": n } }` where `count` is the
//! filter-only total, independent of the pagination window.

use census_core::store::Page;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Document<T> {
  pub data: T,
}

impl<T> Document<T> {
  pub fn new(data: T) -> Self { Self { data } }
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
  pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct ListDocument<T> {
  pub data: Vec<T>,
  pub meta: ListMeta,
}

impl<T> From<Page<T>> for ListDocument<T> {
  fn from(page: Page<T>) -> Self {
    Self { data: page.items, meta: ListMeta { count: page.total } }
  }
}
