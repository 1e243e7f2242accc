//! FDSN pipe-delimited text rendering.
//!
//! Each renderer writes a `#`-prefixed column header followed by one line per
//! record. Absent numbers and timestamps render as empty fields.

use std::fmt::Write as _;

use fdsn_core::{
  model::{AvailabilityRecord, ChannelRecord, NetworkSummary, StationRecord},
  time::{format_opt_time, format_time},
};

pub const CONTENT_TYPE: &str = "text/plain";

pub const NETWORK_HEADER: &str = "#Network|Description|StartTime|EndTime|TotalStations";
pub const STATION_HEADER: &str =
  "#Network|Station|Latitude|Longitude|Elevation|SiteName|StartTime|EndTime";
pub const CHANNEL_HEADER: &str = "#Network|Station|Location|Channel|Latitude|Longitude|\
                                  Elevation|Depth|Azimuth|Dip|SensorDescription|Scale|\
                                  ScaleFreq|ScaleUnits|SampleRate|StartTime|EndTime";
pub const AVAILABILITY_HEADER: &str = "#Network|Station|Location|Channel|Earliest|Latest";

// ─── Number formatting ───────────────────────────────────────────────────────

fn fixed(value: Option<f64>, precision: usize) -> String {
  value.map(|v| format!("{v:.precision$}")).unwrap_or_default()
}

/// C-style `%.4e`: four fraction digits and a signed exponent of at least two
/// digits (`3.3128e+09`).
pub fn exponential(value: f64) -> String {
  let raw = format!("{value:.4e}");
  let Some((mantissa, exponent)) = raw.split_once('e') else {
    return raw;
  };
  let Ok(exponent) = exponent.parse::<i32>() else {
    return raw;
  };
  let sign = if exponent < 0 { '-' } else { '+' };
  format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

// ─── Renderers ───────────────────────────────────────────────────────────────

fn render<T>(header: &str, rows: &[T], mut line: impl FnMut(&mut String, &T)) -> String {
  let mut out = String::with_capacity(header.len() + 1 + rows.len() * 96);
  out.push_str(header);
  out.push('\n');
  for row in rows {
    line(&mut out, row);
    out.push('\n');
  }
  out
}

pub fn networks(rows: &[NetworkSummary]) -> String {
  render(NETWORK_HEADER, rows, |out, n| {
    let _ = write!(
      out,
      "{}|{}|{}|{}|{}",
      n.code,
      n.description,
      format_opt_time(n.start_time),
      format_opt_time(n.end_time),
      n.station_count,
    );
  })
}

pub fn stations(rows: &[StationRecord]) -> String {
  render(STATION_HEADER, rows, |out, s| {
    let _ = write!(
      out,
      "{}|{}|{:.6}|{:.6}|{:.1}|{}|{}|{}",
      s.network_code,
      s.code,
      s.latitude,
      s.longitude,
      s.elevation,
      s.site_name,
      format_opt_time(s.start_time),
      format_opt_time(s.end_time),
    );
  })
}

pub fn channels(rows: &[ChannelRecord]) -> String {
  render(CHANNEL_HEADER, rows, |out, c| {
    let _ = write!(
      out,
      "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
      c.network_code,
      c.station_code,
      c.location_code,
      c.code,
      fixed(c.latitude, 6),
      fixed(c.longitude, 6),
      fixed(c.elevation, 1),
      fixed(c.depth, 1),
      fixed(c.azimuth, 1),
      fixed(c.dip, 1),
      c.sensor_description,
      c.scale.map(exponential).unwrap_or_default(),
      fixed(c.scale_freq, 4),
      c.scale_units,
      fixed(c.sample_rate, 1),
      format_opt_time(c.start_time),
      format_opt_time(c.end_time),
    );
  })
}

pub fn availability(rows: &[AvailabilityRecord]) -> String {
  render(AVAILABILITY_HEADER, rows, |out, a| {
    let _ = write!(
      out,
      "{}|{}|{}|{}|{}|{}",
      a.network_code,
      a.station_code,
      a.location_code,
      a.channel_code,
      format_time(a.earliest),
      format_time(a.latest),
    );
  })
}
