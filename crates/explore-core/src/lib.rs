//! Core types and trait definitions for the explore "liked you" service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cursor;
pub mod decision;
pub mod error;
pub mod page;
pub mod store;
pub mod wire;

pub use error::{Classify, Error, ErrorKind, Result};
