//! The normalized metadata model.
//!
//! Four persistent levels mirror the FDSN hierarchy: a [`Source`] owns
//! [`Network`]s, which own [`Station`]s, which own [`Channel`]s. Availability
//! extents hang off channels. The `*Record` types are flattened read models
//! used by the protocol server, and [`ImportChannel`] is the write model the
//! import pipeline hands to a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ─── Level ───────────────────────────────────────────────────────────────────

/// Aggregation depth of a metadata query or response.
///
/// `response` is accepted as an alias of `channel`; instrument responses are
/// not stored, so the deepest level served is the channel.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Level {
  Network,
  #[default]
  Station,
  #[strum(to_string = "channel", serialize = "response")]
  Channel,
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// One upstream FDSN data centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
  pub id:          i64,
  pub name:        String,
  pub base_url:    String,
  pub description: String,
  pub enabled:     bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Fields accepted when creating or updating a [`Source`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSource {
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub base_url:    String,
  #[serde(default)]
  pub description: String,
  #[serde(default = "enabled_by_default")]
  pub enabled:     bool,
}

fn enabled_by_default() -> bool { true }

/// A [`Source`] with aggregate counts of what has been imported from it.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
  #[serde(flatten)]
  pub source:             Source,
  pub network_count:      i64,
  pub station_count:      i64,
  pub availability_count: i64,
}

/// A (source, network) pair that has been imported at least once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceNetwork {
  pub source_id:    i64,
  pub source_name:  String,
  pub network_code: String,
}

// ─── Stored entities ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Network {
  pub id:          i64,
  pub source_id:   i64,
  pub code:        String,
  pub description: String,
  pub start_time:  Option<DateTime<Utc>>,
  pub end_time:    Option<DateTime<Utc>>,
  pub created_at:  DateTime<Utc>,
}

/// A station joined with its network code and owning source.
#[derive(Debug, Clone, Serialize)]
pub struct Station {
  pub id:               i64,
  pub network_id:       i64,
  pub code:             String,
  pub latitude:         f64,
  pub longitude:        f64,
  pub elevation:        f64,
  pub site_name:        String,
  pub start_time:       Option<DateTime<Utc>>,
  pub end_time:         Option<DateTime<Utc>>,
  pub created_at:       DateTime<Utc>,
  pub network_code:     String,
  pub source_id:        i64,
  pub source_name:      String,
  pub has_availability: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
  pub id:                 i64,
  pub station_id:         i64,
  pub location_code:      String,
  pub code:               String,
  pub latitude:           Option<f64>,
  pub longitude:          Option<f64>,
  pub elevation:          Option<f64>,
  pub depth:              Option<f64>,
  pub azimuth:            Option<f64>,
  pub dip:                Option<f64>,
  pub sensor_description: String,
  pub scale:              Option<f64>,
  pub scale_freq:         Option<f64>,
  pub scale_units:        String,
  pub sample_rate:        Option<f64>,
  pub start_time:         Option<DateTime<Utc>>,
  pub end_time:           Option<DateTime<Utc>>,
  pub created_at:         DateTime<Utc>,
}

/// A channel paired with one of its availability extents, or with none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAvailability {
  pub channel_id:    i64,
  pub location_code: String,
  pub channel_code:  String,
  pub sample_rate:   Option<f64>,
  pub earliest:      Option<DateTime<Utc>>,
  pub latest:        Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationDetail {
  #[serde(flatten)]
  pub station:      Station,
  pub channels:     Vec<Channel>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub availability: Vec<ChannelAvailability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationPage {
  pub stations: Vec<Station>,
  pub total:    i64,
}

/// Filter and paging for station listings. `None` fields do not filter.
#[derive(Debug, Clone)]
pub struct StationFilter {
  pub network:   Option<String>,
  pub station:   Option<String>,
  pub source_id: Option<i64>,
  pub limit:     i64,
  pub offset:    i64,
}

impl Default for StationFilter {
  fn default() -> Self {
    Self { network: None, station: None, source_id: None, limit: 100, offset: 0 }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
  pub sources:  i64,
  pub networks: i64,
  pub stations: i64,
  pub channels: i64,
}

// ─── Write models ────────────────────────────────────────────────────────────

/// One channel row ready to be merged into the store, carrying the
/// network and station metadata it implies.
///
/// `network_description`, `site_name` and the network and station epochs come
/// from best-effort lookups. `None` leaves whatever the store already holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportChannel {
  pub network_code:        String,
  pub network_description: Option<String>,
  pub network_start:       Option<DateTime<Utc>>,
  pub network_end:         Option<DateTime<Utc>>,

  pub station_code:        String,
  pub station_latitude:    f64,
  pub station_longitude:   f64,
  pub station_elevation:   f64,
  pub site_name:           Option<String>,
  pub station_start:       Option<DateTime<Utc>>,
  pub station_end:         Option<DateTime<Utc>>,

  pub location_code:       String,
  pub channel_code:        String,
  pub latitude:            Option<f64>,
  pub longitude:           Option<f64>,
  pub elevation:           Option<f64>,
  pub depth:               Option<f64>,
  pub azimuth:             Option<f64>,
  pub dip:                 Option<f64>,
  pub sensor_description:  String,
  pub scale:               Option<f64>,
  pub scale_freq:          Option<f64>,
  pub scale_units:         String,
  pub sample_rate:         Option<f64>,
  pub start_time:          Option<DateTime<Utc>>,
  pub end_time:            Option<DateTime<Utc>>,
}

/// A resolved availability extent awaiting a batch upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityItem {
  pub channel_id: i64,
  pub earliest:   DateTime<Utc>,
  pub latest:     DateTime<Utc>,
}

// ─── Protocol read models ────────────────────────────────────────────────────

/// One row of the network-level listing, aggregated by network code.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
  pub code:          String,
  pub description:   String,
  pub start_time:    Option<DateTime<Utc>>,
  pub end_time:      Option<DateTime<Utc>>,
  pub station_count: i64,
}

/// A station flattened with its network code.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
  pub station_id:   i64,
  pub network_code: String,
  pub code:         String,
  pub latitude:     f64,
  pub longitude:    f64,
  pub elevation:    f64,
  pub site_name:    String,
  pub start_time:   Option<DateTime<Utc>>,
  pub end_time:     Option<DateTime<Utc>>,
}

/// A channel flattened with its station and network codes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
  pub station_id:         i64,
  pub network_code:       String,
  pub station_code:       String,
  pub location_code:      String,
  pub code:               String,
  pub latitude:           Option<f64>,
  pub longitude:          Option<f64>,
  pub elevation:          Option<f64>,
  pub depth:              Option<f64>,
  pub azimuth:            Option<f64>,
  pub dip:                Option<f64>,
  pub sensor_description: String,
  pub scale:              Option<f64>,
  pub scale_freq:         Option<f64>,
  pub scale_units:        String,
  pub sample_rate:        Option<f64>,
  pub start_time:         Option<DateTime<Utc>>,
  pub end_time:           Option<DateTime<Utc>>,
}

/// An availability extent flattened with its channel identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRecord {
  pub network_code:  String,
  pub station_code:  String,
  pub location_code: String,
  pub channel_code:  String,
  pub earliest:      DateTime<Utc>,
  pub latest:        DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn level_parses_aliases() {
    assert_eq!(Level::from_str("network").unwrap(), Level::Network);
    assert_eq!(Level::from_str("Station").unwrap(), Level::Station);
    assert_eq!(Level::from_str("channel").unwrap(), Level::Channel);
    assert_eq!(Level::from_str("response").unwrap(), Level::Channel);
    assert!(Level::from_str("everything").is_err());
  }

  #[test]
  fn level_displays_canonical_name() {
    assert_eq!(Level::Channel.to_string(), "channel");
    assert_eq!(Level::default().to_string(), "station");
  }

  #[test]
  fn new_source_defaults_to_enabled() {
    let src: NewSource = serde_json::from_str(r#"{"name":"X","base_url":"http://x"}"#).unwrap();
    assert!(src.enabled);
    assert_eq!(src.description, "");
  }
}
