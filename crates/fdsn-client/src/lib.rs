//! Client for upstream FDSN web services.
//!
//! [`FdsnClient`] queries one data centre's station, availability, and
//! dataselect endpoints. Metadata is always requested in the pipe-delimited
//! text rendering and parsed into the row types in [`text`].

mod client;
pub mod error;
pub mod query;
pub mod text;

pub use client::{FdsnClient, USER_AGENT, http_client};
pub use error::{Error, Result};
pub use query::{AvailabilityQuery, DataselectQuery, StationQuery};
pub use text::{ChannelRow, ExtentRow, NetworkRow, StationRow};
