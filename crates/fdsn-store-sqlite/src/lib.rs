//! SQLite backend for the FDSN metadata mirror.
//!
//! Wraps [`tokio_rusqlite`] so every statement runs on the connection's own
//! thread without blocking the async runtime. A single logical connection
//! serialises all writes; each import and each availability batch is one
//! transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
