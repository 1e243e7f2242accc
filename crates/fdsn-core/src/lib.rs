//! Core types and trait definitions for the FDSN metadata mirror.
//!
//! This crate has no HTTP or database dependencies. It holds the normalized
//! data model, the store traits every backend implements, and the two pure
//! protocol helpers shared by the client and the server: the timestamp codec
//! and the wildcard matcher.

// Store traits use `impl Future + Send` return types; backends implement
// them with plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod model;
pub mod pattern;
pub mod store;
pub mod time;

pub use error::{Error, Result};
