//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Seismic epochs (network/station/channel start and end, availability
//! bounds) are stored in the second-precision FDSN text form so that
//! lexical `MIN`/`MAX` agree with chronological order. Bookkeeping
//! timestamps (`created_at`, `updated_at`) are RFC 3339.
//!
//! Each `Raw*` struct is what a row closure pulls out of SQLite; the
//! `into_*` methods finish decoding outside the connection thread.

use chrono::{DateTime, Utc};
use fdsn_core::{
  model::{
    AvailabilityRecord, Channel, ChannelAvailability, ChannelRecord, Network, NetworkSummary,
    Source, Station, StationRecord,
  },
  time::{format_time, parse_time},
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_epoch(dt: Option<DateTime<Utc>>) -> Option<String> { dt.map(format_time) }

pub fn decode_epoch(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  match s {
    None | Some("") => Ok(None),
    Some(s) => decode_epoch_required(s).map(Some),
  }
}

pub fn decode_epoch_required(s: &str) -> Result<DateTime<Utc>> {
  parse_time(s).ok_or_else(|| Error::DateParse(format!("{s:?}")))
}

// ─── Sources ─────────────────────────────────────────────────────────────────

pub const SOURCE_COLUMNS: &str =
  "sr.id, sr.name, sr.base_url, sr.description, sr.enabled, sr.created_at, sr.updated_at";

pub struct RawSource {
  pub id:          i64,
  pub name:        String,
  pub base_url:    String,
  pub description: String,
  pub enabled:     bool,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawSource {
  /// Read the [`SOURCE_COLUMNS`] starting at column 0.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      base_url:    row.get(2)?,
      description: row.get(3)?,
      enabled:     row.get(4)?,
      created_at:  row.get(5)?,
      updated_at:  row.get(6)?,
    })
  }

  pub fn into_source(self) -> Result<Source> {
    Ok(Source {
      id:          self.id,
      name:        self.name,
      base_url:    self.base_url,
      description: self.description,
      enabled:     self.enabled,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Networks ────────────────────────────────────────────────────────────────

pub struct RawNetwork {
  pub id:          i64,
  pub source_id:   i64,
  pub code:        String,
  pub description: String,
  pub start_time:  Option<String>,
  pub end_time:    Option<String>,
  pub created_at:  String,
}

impl RawNetwork {
  pub fn into_network(self) -> Result<Network> {
    Ok(Network {
      id:          self.id,
      source_id:   self.source_id,
      code:        self.code,
      description: self.description,
      start_time:  decode_epoch(self.start_time.as_deref())?,
      end_time:    decode_epoch(self.end_time.as_deref())?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawNetworkSummary {
  pub code:          String,
  pub description:   String,
  pub start_time:    Option<String>,
  pub end_time:      Option<String>,
  pub station_count: i64,
}

impl RawNetworkSummary {
  pub fn into_summary(self) -> Result<NetworkSummary> {
    Ok(NetworkSummary {
      code:          self.code,
      description:   self.description,
      start_time:    decode_epoch(self.start_time.as_deref())?,
      end_time:      decode_epoch(self.end_time.as_deref())?,
      station_count: self.station_count,
    })
  }
}

// ─── Stations ────────────────────────────────────────────────────────────────

pub const STATION_SELECT: &str = "
  SELECT s.id, s.network_id, s.code, s.latitude, s.longitude, s.elevation,
         s.site_name, s.start_time, s.end_time, s.created_at,
         n.code, sr.id, sr.name,
         EXISTS (
           SELECT 1 FROM availability a
           JOIN channels c ON a.channel_id = c.id
           WHERE c.station_id = s.id
         )
  FROM stations s
  JOIN networks n ON s.network_id = n.id
  JOIN sources sr ON n.source_id = sr.id";

pub struct RawStation {
  pub id:               i64,
  pub network_id:       i64,
  pub code:             String,
  pub latitude:         f64,
  pub longitude:        f64,
  pub elevation:        f64,
  pub site_name:        String,
  pub start_time:       Option<String>,
  pub end_time:         Option<String>,
  pub created_at:       String,
  pub network_code:     String,
  pub source_id:        i64,
  pub source_name:      String,
  pub has_availability: bool,
}

impl RawStation {
  /// Read a row produced by [`STATION_SELECT`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      network_id:       row.get(1)?,
      code:             row.get(2)?,
      latitude:         row.get(3)?,
      longitude:        row.get(4)?,
      elevation:        row.get(5)?,
      site_name:        row.get(6)?,
      start_time:       row.get(7)?,
      end_time:         row.get(8)?,
      created_at:       row.get(9)?,
      network_code:     row.get(10)?,
      source_id:        row.get(11)?,
      source_name:      row.get(12)?,
      has_availability: row.get(13)?,
    })
  }

  pub fn into_station(self) -> Result<Station> {
    Ok(Station {
      id:               self.id,
      network_id:       self.network_id,
      code:             self.code,
      latitude:         self.latitude,
      longitude:        self.longitude,
      elevation:        self.elevation,
      site_name:        self.site_name,
      start_time:       decode_epoch(self.start_time.as_deref())?,
      end_time:         decode_epoch(self.end_time.as_deref())?,
      created_at:       decode_dt(&self.created_at)?,
      network_code:     self.network_code,
      source_id:        self.source_id,
      source_name:      self.source_name,
      has_availability: self.has_availability,
    })
  }
}

pub struct RawStationRecord {
  pub station_id:   i64,
  pub network_code: String,
  pub code:         String,
  pub latitude:     f64,
  pub longitude:    f64,
  pub elevation:    f64,
  pub site_name:    String,
  pub start_time:   Option<String>,
  pub end_time:     Option<String>,
}

impl RawStationRecord {
  pub fn into_record(self) -> Result<StationRecord> {
    Ok(StationRecord {
      station_id:   self.station_id,
      network_code: self.network_code,
      code:         self.code,
      latitude:     self.latitude,
      longitude:    self.longitude,
      elevation:    self.elevation,
      site_name:    self.site_name,
      start_time:   decode_epoch(self.start_time.as_deref())?,
      end_time:     decode_epoch(self.end_time.as_deref())?,
    })
  }
}

// ─── Channels ────────────────────────────────────────────────────────────────

/// Instrument columns shared by [`RawChannel`] and [`RawChannelRecord`],
/// read from eleven consecutive columns.
pub struct RawInstrument {
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
}

impl RawInstrument {
  pub const COLUMNS: &'static str = "c.latitude, c.longitude, c.elevation, c.depth, c.azimuth, c.dip,
    c.sensor_description, c.scale, c.scale_freq, c.scale_units, c.sample_rate";

  pub fn from_row(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      latitude:           row.get(at)?,
      longitude:          row.get(at + 1)?,
      elevation:          row.get(at + 2)?,
      depth:              row.get(at + 3)?,
      azimuth:            row.get(at + 4)?,
      dip:                row.get(at + 5)?,
      sensor_description: row.get(at + 6)?,
      scale:              row.get(at + 7)?,
      scale_freq:         row.get(at + 8)?,
      scale_units:        row.get(at + 9)?,
      sample_rate:        row.get(at + 10)?,
    })
  }
}

pub struct RawChannel {
  pub id:            i64,
  pub station_id:    i64,
  pub location_code: String,
  pub code:          String,
  pub instrument:    RawInstrument,
  pub start_time:    Option<String>,
  pub end_time:      Option<String>,
  pub created_at:    String,
}

impl RawChannel {
  pub fn into_channel(self) -> Result<Channel> {
    let i = self.instrument;
    Ok(Channel {
      id:                 self.id,
      station_id:         self.station_id,
      location_code:      self.location_code,
      code:               self.code,
      latitude:           i.latitude,
      longitude:          i.longitude,
      elevation:          i.elevation,
      depth:              i.depth,
      azimuth:            i.azimuth,
      dip:                i.dip,
      sensor_description: i.sensor_description,
      scale:              i.scale,
      scale_freq:         i.scale_freq,
      scale_units:        i.scale_units,
      sample_rate:        i.sample_rate,
      start_time:         decode_epoch(self.start_time.as_deref())?,
      end_time:           decode_epoch(self.end_time.as_deref())?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawChannelRecord {
  pub station_id:    i64,
  pub network_code:  String,
  pub station_code:  String,
  pub location_code: String,
  pub code:          String,
  pub instrument:    RawInstrument,
  pub start_time:    Option<String>,
  pub end_time:      Option<String>,
}

impl RawChannelRecord {
  pub fn into_record(self) -> Result<ChannelRecord> {
    let i = self.instrument;
    Ok(ChannelRecord {
      station_id:         self.station_id,
      network_code:       self.network_code,
      station_code:       self.station_code,
      location_code:      self.location_code,
      code:               self.code,
      latitude:           i.latitude,
      longitude:          i.longitude,
      elevation:          i.elevation,
      depth:              i.depth,
      azimuth:            i.azimuth,
      dip:                i.dip,
      sensor_description: i.sensor_description,
      scale:              i.scale,
      scale_freq:         i.scale_freq,
      scale_units:        i.scale_units,
      sample_rate:        i.sample_rate,
      start_time:         decode_epoch(self.start_time.as_deref())?,
      end_time:           decode_epoch(self.end_time.as_deref())?,
    })
  }
}

// ─── Availability ────────────────────────────────────────────────────────────

pub struct RawChannelAvailability {
  pub channel_id:    i64,
  pub location_code: String,
  pub channel_code:  String,
  pub sample_rate:   Option<f64>,
  pub earliest:      Option<String>,
  pub latest:        Option<String>,
}

impl RawChannelAvailability {
  pub fn into_channel_availability(self) -> Result<ChannelAvailability> {
    Ok(ChannelAvailability {
      channel_id:    self.channel_id,
      location_code: self.location_code,
      channel_code:  self.channel_code,
      sample_rate:   self.sample_rate,
      earliest:      decode_epoch(self.earliest.as_deref())?,
      latest:        decode_epoch(self.latest.as_deref())?,
    })
  }
}

pub struct RawAvailabilityRecord {
  pub network_code:  String,
  pub station_code:  String,
  pub location_code: String,
  pub channel_code:  String,
  pub earliest:      String,
  pub latest:        String,
}

impl RawAvailabilityRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      network_code:  row.get(0)?,
      station_code:  row.get(1)?,
      location_code: row.get(2)?,
      channel_code:  row.get(3)?,
      earliest:      row.get(4)?,
      latest:        row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<AvailabilityRecord> {
    Ok(AvailabilityRecord {
      network_code:  self.network_code,
      station_code:  self.station_code,
      location_code: self.location_code,
      channel_code:  self.channel_code,
      earliest:      decode_epoch_required(&self.earliest)?,
      latest:        decode_epoch_required(&self.latest)?,
    })
  }
}
