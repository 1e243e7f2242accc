//! The reconciliation pipeline.
//!
//! An [`Importer`] pulls channel-level metadata for one [`Source`] from its
//! upstream, merges it into a [`MetadataStore`] in one transaction, and then
//! makes a best-effort pass over the upstream availability service.
//!
//! ```rust,ignore
//! let report = Importer::new(&client, &store)
//!   .with_availability(&store)
//!   .run(&source, &query)
//!   .await?;
//! ```
//!
//! [`Source`]: fdsn_core::model::Source
//! [`MetadataStore`]: fdsn_core::store::MetadataStore

pub mod error;
mod importer;
pub mod report;

pub use error::{ImportError, Result};
pub use importer::Importer;
pub use report::{AvailabilityStatus, ImportReport};
