//! Core types and trait definitions for the Census registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod dimension;
pub mod entity;
pub mod error;
pub mod key;
pub mod kind;
pub mod query;
pub mod score;
pub mod store;
pub mod tag;

pub use error::{Error, Result};
