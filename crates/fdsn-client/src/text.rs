//! Parsers for the FDSN pipe-delimited text rendering.
//!
//! Every parser skips blank lines and `#` header lines, trims each field,
//! and drops rows shorter than the minimum column count for that level.
//! Numbers that do not parse read as zero; timestamps that do not parse
//! read as absent. A location of `--` is the FDSN spelling of empty.

use chrono::{DateTime, Utc};
use fdsn_core::time::parse_time;
use serde::Serialize;

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkRow {
  pub code:           String,
  pub description:    String,
  pub start_time:     Option<DateTime<Utc>>,
  pub end_time:       Option<DateTime<Utc>>,
  pub total_stations: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRow {
  pub network:    String,
  pub station:    String,
  pub latitude:   f64,
  pub longitude:  f64,
  pub elevation:  f64,
  pub site_name:  String,
  pub start_time: Option<DateTime<Utc>>,
  pub end_time:   Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRow {
  pub network:            String,
  pub station:            String,
  pub location:           String,
  pub channel:            String,
  pub latitude:           f64,
  pub longitude:          f64,
  pub elevation:          f64,
  pub depth:              f64,
  pub azimuth:            f64,
  pub dip:                f64,
  pub sensor_description: String,
  pub scale:              f64,
  pub scale_freq:         f64,
  pub scale_units:        String,
  pub sample_rate:        f64,
  pub start_time:         Option<DateTime<Utc>>,
  pub end_time:           Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtentRow {
  pub network:     String,
  pub station:     String,
  pub location:    String,
  pub channel:     String,
  pub quality:     String,
  pub sample_rate: f64,
  pub earliest:    Option<DateTime<Utc>>,
  pub latest:      Option<DateTime<Utc>>,
}

// ─── Field helpers ───────────────────────────────────────────────────────────

/// Data lines of `body`, each split into trimmed fields.
fn records<'a>(
  body: &'a str,
  split: fn(&'a str) -> Vec<&'a str>,
) -> impl Iterator<Item = Vec<&'a str>> + 'a {
  body
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .map(move |line| split(line))
}

fn split_pipes(line: &str) -> Vec<&str> { line.split('|').map(str::trim).collect() }

fn split_pipes_or_whitespace(line: &str) -> Vec<&str> {
  if line.contains('|') {
    split_pipes(line)
  } else {
    line.split_whitespace().collect()
  }
}

fn long_enough(fields: &[&str], min: usize, kind: &str) -> bool {
  if fields.len() < min {
    tracing::debug!(kind, fields = fields.len(), min, "dropping short row");
    return false;
  }
  true
}

fn number(field: &str) -> f64 { field.parse().unwrap_or(0.0) }

fn time_at(fields: &[&str], i: usize) -> Option<DateTime<Utc>> {
  fields.get(i).and_then(|f| parse_time(f))
}

fn location(field: &str) -> String {
  if field == "--" { String::new() } else { field.to_string() }
}

// ─── Parsers ─────────────────────────────────────────────────────────────────

/// `Network|Description|StartTime|EndTime|TotalStations`
pub fn parse_networks(body: &str) -> Vec<NetworkRow> {
  records(body, split_pipes)
    .filter(|f| long_enough(f, 2, "network"))
    .map(|f| NetworkRow {
      code:           f[0].to_string(),
      description:    f[1].to_string(),
      start_time:     time_at(&f, 2),
      end_time:       time_at(&f, 3),
      total_stations: f.get(4).and_then(|n| n.parse().ok()).unwrap_or(0),
    })
    .collect()
}

/// `Network|Station|Latitude|Longitude|Elevation|SiteName|StartTime|EndTime`
pub fn parse_stations(body: &str) -> Vec<StationRow> {
  records(body, split_pipes)
    .filter(|f| long_enough(f, 6, "station"))
    .map(|f| StationRow {
      network:    f[0].to_string(),
      station:    f[1].to_string(),
      latitude:   number(f[2]),
      longitude:  number(f[3]),
      elevation:  number(f[4]),
      site_name:  f[5].to_string(),
      start_time: time_at(&f, 6),
      end_time:   time_at(&f, 7),
    })
    .collect()
}

/// `Network|Station|Location|Channel|Latitude|Longitude|Elevation|Depth|
/// Azimuth|Dip|SensorDescription|Scale|ScaleFreq|ScaleUnits|SampleRate|
/// StartTime|EndTime`
pub fn parse_channels(body: &str) -> Vec<ChannelRow> {
  records(body, split_pipes)
    .filter(|f| long_enough(f, 15, "channel"))
    .map(|f| ChannelRow {
      network:            f[0].to_string(),
      station:            f[1].to_string(),
      location:           location(f[2]),
      channel:            f[3].to_string(),
      latitude:           number(f[4]),
      longitude:          number(f[5]),
      elevation:          number(f[6]),
      depth:              number(f[7]),
      azimuth:            number(f[8]),
      dip:                number(f[9]),
      sensor_description: f[10].to_string(),
      scale:              number(f[11]),
      scale_freq:         number(f[12]),
      scale_units:        f[13].to_string(),
      sample_rate:        number(f[14]),
      start_time:         time_at(&f, 15),
      end_time:           time_at(&f, 16),
    })
    .collect()
}

/// `Network|Station|Location|Channel|Quality|SampleRate|Earliest|Latest`,
/// pipe- or whitespace-delimited. Trailing columns are ignored.
pub fn parse_extents(body: &str) -> Vec<ExtentRow> {
  records(body, split_pipes_or_whitespace)
    .filter(|f| long_enough(f, 8, "availability"))
    .map(|f| ExtentRow {
      network:     f[0].to_string(),
      station:     f[1].to_string(),
      location:    location(f[2]),
      channel:     f[3].to_string(),
      quality:     f[4].to_string(),
      sample_rate: number(f[5]),
      earliest:    time_at(&f, 6),
      latest:      time_at(&f, 7),
    })
    .collect()
}
