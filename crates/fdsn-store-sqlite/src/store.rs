//! [`SqliteStore`], the SQLite implementation of [`MetadataStore`] and
//! [`AvailabilityStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use fdsn_core::{
  model::{
    AvailabilityItem, AvailabilityRecord, ChannelAvailability, ChannelRecord, ImportChannel,
    Network, NetworkSummary, NewSource, Source, SourceNetwork, SourceSummary, StationDetail,
    StationFilter, StationPage, StationRecord, Stats,
  },
  store::{AvailabilityStore, MetadataStore},
  time::format_time,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    RawAvailabilityRecord, RawChannel, RawChannelAvailability, RawChannelRecord, RawInstrument,
    RawNetwork, RawNetworkSummary, RawSource, RawStation, RawStationRecord, SOURCE_COLUMNS,
    STATION_SELECT, encode_dt, encode_epoch,
  },
  schema::SCHEMA,
};

// ─── Statements ──────────────────────────────────────────────────────────────

// Metadata that only enrichment supplies is bound as NULL when unknown and
// keeps the stored value on conflict.
const UPSERT_NETWORK: &str = "
  INSERT INTO networks (source_id, code, description, start_time, end_time, created_at)
  VALUES (?1, ?2, COALESCE(?3, ''), ?4, ?5, ?6)
  ON CONFLICT (source_id, code) DO UPDATE SET
    description = COALESCE(?3, networks.description),
    start_time  = COALESCE(excluded.start_time, networks.start_time),
    end_time    = COALESCE(excluded.end_time, networks.end_time)
  RETURNING id";

const UPSERT_STATION: &str = "
  INSERT INTO stations (
    network_id, code, latitude, longitude, elevation, site_name,
    start_time, end_time, created_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, ''), ?7, ?8, ?9)
  ON CONFLICT (network_id, code) DO UPDATE SET
    latitude   = excluded.latitude,
    longitude  = excluded.longitude,
    elevation  = excluded.elevation,
    site_name  = COALESCE(?6, stations.site_name),
    start_time = COALESCE(excluded.start_time, stations.start_time),
    end_time   = COALESCE(excluded.end_time, stations.end_time)
  RETURNING id";

// Every column is overwritten, including with NULL: the new row replaces the
// old one wholesale. Updating in place keeps the id (and so its
// availability extents) stable.
const UPSERT_CHANNEL: &str = "
  INSERT INTO channels (
    station_id, location_code, code,
    latitude, longitude, elevation, depth, azimuth, dip,
    sensor_description, scale, scale_freq, scale_units, sample_rate,
    start_time, end_time, created_at
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
  ON CONFLICT (station_id, location_code, code) DO UPDATE SET
    latitude           = excluded.latitude,
    longitude          = excluded.longitude,
    elevation          = excluded.elevation,
    depth              = excluded.depth,
    azimuth            = excluded.azimuth,
    dip                = excluded.dip,
    sensor_description = excluded.sensor_description,
    scale              = excluded.scale,
    scale_freq         = excluded.scale_freq,
    scale_units        = excluded.scale_units,
    sample_rate        = excluded.sample_rate,
    start_time         = excluded.start_time,
    end_time           = excluded.end_time,
    created_at         = excluded.created_at";

const UPSERT_AVAILABILITY: &str = "
  INSERT INTO availability (channel_id, earliest, latest, updated_at)
  VALUES (?1, ?2, ?3, ?4)
  ON CONFLICT (channel_id, earliest) DO UPDATE SET
    latest     = max(availability.latest, excluded.latest),
    updated_at = excluded.updated_at";

const AVAILABILITY_JOINS: &str = "
  FROM availability a
  JOIN channels c ON a.channel_id = c.id
  JOIN stations s ON c.station_id = s.id
  JOIN networks n ON s.network_id = n.id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// The normalized metadata store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection handle is reference-counted and
/// every clone talks to the same connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_source<P>(&self, where_clause: &'static str, arg: P) -> Result<Option<Source>>
  where
    P: rusqlite::ToSql + Send + 'static,
  {
    let raw = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SOURCE_COLUMNS} FROM sources sr {where_clause} ORDER BY sr.id LIMIT 1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![arg], RawSource::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSource::into_source).transpose()
  }
}

// ─── MetadataStore impl ──────────────────────────────────────────────────────

impl MetadataStore for SqliteStore {
  type Error = crate::Error;

  // ── Sources ───────────────────────────────────────────────────────────────

  async fn list_sources(&self) -> Result<Vec<SourceSummary>> {
    let rows: Vec<(RawSource, i64, i64, i64)> = self
      .conn
      .call(|conn| {
        let sql = format!(
          "SELECT {SOURCE_COLUMNS},
             (SELECT COUNT(*) FROM networks n WHERE n.source_id = sr.id),
             (SELECT COUNT(*) FROM stations s
                JOIN networks n ON s.network_id = n.id
               WHERE n.source_id = sr.id),
             (SELECT COUNT(*) {AVAILABILITY_JOINS} WHERE n.source_id = sr.id)
           FROM sources sr
           ORDER BY sr.name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            Ok((RawSource::from_row(row)?, row.get(7)?, row.get(8)?, row.get(9)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(raw, networks, stations, availability)| {
        Ok(SourceSummary {
          source:             raw.into_source()?,
          network_count:      networks,
          station_count:      stations,
          availability_count: availability,
        })
      })
      .collect()
  }

  async fn get_source(&self, id: i64) -> Result<Option<Source>> {
    self.query_source("WHERE sr.id = ?1", id).await
  }

  async fn find_source_by_url(&self, base_url: String) -> Result<Option<Source>> {
    self.query_source("WHERE sr.base_url = ?1", base_url).await
  }

  async fn create_source(&self, input: NewSource) -> Result<Source> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let (name, base_url, description, enabled) =
      (input.name.clone(), input.base_url.clone(), input.description.clone(), input.enabled);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sources (name, base_url, description, enabled, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![name, base_url, description, enabled, now_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id, name = %input.name, "created source");
    Ok(Source {
      id,
      name: input.name,
      base_url: input.base_url,
      description: input.description,
      enabled: input.enabled,
      created_at: now,
      updated_at: now,
    })
  }

  async fn update_source(&self, id: i64, input: NewSource) -> Result<Option<Source>> {
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE sources
              SET name = ?1, base_url = ?2, description = ?3, enabled = ?4, updated_at = ?5
            WHERE id = ?6",
          rusqlite::params![
            input.name,
            input.base_url,
            input.description,
            input.enabled,
            now_str,
            id
          ],
        )?;
        Ok(n)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_source(id).await
  }

  async fn delete_source(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM sources WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn network_owner(&self, network_code: String) -> Result<Option<Source>> {
    self
      .query_source(
        "WHERE sr.id = (SELECT n.source_id FROM networks n WHERE n.code = ?1 ORDER BY n.source_id LIMIT 1)",
        network_code,
      )
      .await
  }

  // ── Import ────────────────────────────────────────────────────────────────

  async fn import_channels(&self, source_id: i64, channels: Vec<ImportChannel>) -> Result<usize> {
    let now_str = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Scoped to this transaction: every key is resolved against the
        // state the transaction itself sees.
        let mut network_ids: HashMap<String, i64> = HashMap::new();
        let mut station_ids: HashMap<(i64, String), i64> = HashMap::new();

        {
          let mut upsert_network = tx.prepare(UPSERT_NETWORK)?;
          let mut upsert_station = tx.prepare(UPSERT_STATION)?;
          let mut upsert_channel = tx.prepare(UPSERT_CHANNEL)?;

          for ch in &channels {
            let network_id = match network_ids.get(&ch.network_code) {
              Some(&id) => id,
              None => {
                let id: i64 = upsert_network.query_row(
                  rusqlite::params![
                    source_id,
                    ch.network_code,
                    ch.network_description,
                    encode_epoch(ch.network_start),
                    encode_epoch(ch.network_end),
                    now_str,
                  ],
                  |r| r.get(0),
                )?;
                network_ids.insert(ch.network_code.clone(), id);
                id
              }
            };

            let station_key = (network_id, ch.station_code.clone());
            let station_id = match station_ids.get(&station_key) {
              Some(&id) => id,
              None => {
                let id: i64 = upsert_station.query_row(
                  rusqlite::params![
                    network_id,
                    ch.station_code,
                    ch.station_latitude,
                    ch.station_longitude,
                    ch.station_elevation,
                    ch.site_name,
                    encode_epoch(ch.station_start),
                    encode_epoch(ch.station_end),
                    now_str,
                  ],
                  |r| r.get(0),
                )?;
                station_ids.insert(station_key, id);
                id
              }
            };

            upsert_channel.execute(rusqlite::params![
              station_id,
              ch.location_code,
              ch.channel_code,
              ch.latitude,
              ch.longitude,
              ch.elevation,
              ch.depth,
              ch.azimuth,
              ch.dip,
              ch.sensor_description,
              ch.scale,
              ch.scale_freq,
              ch.scale_units,
              ch.sample_rate,
              encode_epoch(ch.start_time),
              encode_epoch(ch.end_time),
              now_str,
            ])?;
          }
        }

        tx.commit()?;
        Ok(channels.len())
      })
      .await?;

    Ok(written)
  }

  async fn lookup_channel_ids(
    &self,
    source_id: i64,
    network_code: String,
    station_code: String,
  ) -> Result<HashMap<String, i64>> {
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.location_code, c.code, c.id
             FROM channels c
             JOIN stations s ON c.station_id = s.id
             JOIN networks n ON s.network_id = n.id
            WHERE n.source_id = ?1 AND n.code = ?2 AND s.code = ?3",
        )?;
        let ids = stmt
          .query_map(rusqlite::params![source_id, network_code, station_code], |row| {
            let loc: String = row.get(0)?;
            let cha: String = row.get(1)?;
            Ok((format!("{loc}.{cha}"), row.get::<_, i64>(2)?))
          })?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  // ── Browsing ──────────────────────────────────────────────────────────────

  async fn list_networks(&self, source_id: Option<i64>) -> Result<Vec<Network>> {
    let raws: Vec<RawNetwork> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, source_id, code, description, start_time, end_time, created_at
             FROM networks
            WHERE (?1 IS NULL OR source_id = ?1)
            ORDER BY code, source_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![source_id], |row| {
            Ok(RawNetwork {
              id:          row.get(0)?,
              source_id:   row.get(1)?,
              code:        row.get(2)?,
              description: row.get(3)?,
              start_time:  row.get(4)?,
              end_time:    row.get(5)?,
              created_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNetwork::into_network).collect()
  }

  async fn list_stations(&self, filter: StationFilter) -> Result<StationPage> {
    let (total, raws): (i64, Vec<RawStation>) = self
      .conn
      .call(move |conn| {
        let where_clause = "WHERE (?1 IS NULL OR n.code = ?1)
                             AND (?2 IS NULL OR s.code = ?2)
                             AND (?3 IS NULL OR n.source_id = ?3)";

        let total: i64 = conn.query_row(
          &format!(
            "SELECT COUNT(*) FROM stations s
               JOIN networks n ON s.network_id = n.id
             {where_clause}"
          ),
          rusqlite::params![filter.network, filter.station, filter.source_id],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "{STATION_SELECT} {where_clause} ORDER BY n.code, s.code, s.id LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              filter.network,
              filter.station,
              filter.source_id,
              filter.limit,
              filter.offset,
            ],
            RawStation::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((total, rows))
      })
      .await?;

    Ok(StationPage {
      stations: raws.into_iter().map(RawStation::into_station).collect::<Result<_>>()?,
      total,
    })
  }

  async fn get_station(&self, id: i64) -> Result<Option<StationDetail>> {
    let found: Option<(RawStation, Vec<RawChannel>)> = self
      .conn
      .call(move |conn| {
        let station = conn
          .query_row(
            &format!("{STATION_SELECT} WHERE s.id = ?1"),
            rusqlite::params![id],
            RawStation::from_row,
          )
          .optional()?;

        let Some(station) = station else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT c.id, c.station_id, c.location_code, c.code, {},
                  c.start_time, c.end_time, c.created_at
             FROM channels c
            WHERE c.station_id = ?1
            ORDER BY c.location_code, c.code",
          RawInstrument::COLUMNS
        ))?;
        let channels = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(RawChannel {
              id:            row.get(0)?,
              station_id:    row.get(1)?,
              location_code: row.get(2)?,
              code:          row.get(3)?,
              instrument:    RawInstrument::from_row(row, 4)?,
              start_time:    row.get(15)?,
              end_time:      row.get(16)?,
              created_at:    row.get(17)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((station, channels)))
      })
      .await?;

    let Some((station, channels)) = found else {
      return Ok(None);
    };

    Ok(Some(StationDetail {
      station:      station.into_station()?,
      channels:     channels.into_iter().map(RawChannel::into_channel).collect::<Result<_>>()?,
      availability: Vec::new(),
    }))
  }

  async fn delete_station(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM stations WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn list_source_networks(&self) -> Result<Vec<SourceNetwork>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT sr.id, sr.name, n.code
             FROM networks n
             JOIN sources sr ON n.source_id = sr.id
            ORDER BY sr.name, n.code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SourceNetwork {
              source_id:    row.get(0)?,
              source_name:  row.get(1)?,
              network_code: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn stats(&self) -> Result<Stats> {
    let stats = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT (SELECT COUNT(*) FROM sources),
                  (SELECT COUNT(*) FROM networks),
                  (SELECT COUNT(*) FROM stations),
                  (SELECT COUNT(*) FROM channels)",
          [],
          |r| {
            Ok(Stats {
              sources:  r.get(0)?,
              networks: r.get(1)?,
              stations: r.get(2)?,
              channels: r.get(3)?,
            })
          },
        )?)
      })
      .await?;
    Ok(stats)
  }

  // ── Protocol reads ────────────────────────────────────────────────────────

  async fn network_summaries(&self) -> Result<Vec<NetworkSummary>> {
    let raws: Vec<RawNetworkSummary> = self
      .conn
      .call(|conn| {
        // An end epoch is open (NULL) if any network carrying the code is open.
        let mut stmt = conn.prepare(
          "SELECT n.code,
                  COALESCE((SELECT d.description FROM networks d
                             WHERE d.code = n.code AND d.description <> ''
                             ORDER BY d.id LIMIT 1), ''),
                  MIN(n.start_time),
                  CASE WHEN COUNT(n.end_time) = COUNT(*) THEN MAX(n.end_time) END,
                  (SELECT COUNT(DISTINCT s.code) FROM stations s
                     JOIN networks m ON s.network_id = m.id
                    WHERE m.code = n.code)
             FROM networks n
            GROUP BY n.code
            ORDER BY n.code",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawNetworkSummary {
              code:          row.get(0)?,
              description:   row.get(1)?,
              start_time:    row.get(2)?,
              end_time:      row.get(3)?,
              station_count: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNetworkSummary::into_summary).collect()
  }

  async fn station_records(&self) -> Result<Vec<StationRecord>> {
    let raws: Vec<RawStationRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT s.id, n.code, s.code, s.latitude, s.longitude, s.elevation,
                  s.site_name, s.start_time, s.end_time
             FROM stations s
             JOIN networks n ON s.network_id = n.id
            ORDER BY n.code, s.code, s.id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawStationRecord {
              station_id:   row.get(0)?,
              network_code: row.get(1)?,
              code:         row.get(2)?,
              latitude:     row.get(3)?,
              longitude:    row.get(4)?,
              elevation:    row.get(5)?,
              site_name:    row.get(6)?,
              start_time:   row.get(7)?,
              end_time:     row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStationRecord::into_record).collect()
  }

  async fn channel_records(&self) -> Result<Vec<ChannelRecord>> {
    let raws: Vec<RawChannelRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT s.id, n.code, s.code, c.location_code, c.code, {},
                  c.start_time, c.end_time
             FROM channels c
             JOIN stations s ON c.station_id = s.id
             JOIN networks n ON s.network_id = n.id
            ORDER BY n.code, s.code, c.location_code, c.code, c.id",
          RawInstrument::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawChannelRecord {
              station_id:    row.get(0)?,
              network_code:  row.get(1)?,
              station_code:  row.get(2)?,
              location_code: row.get(3)?,
              code:          row.get(4)?,
              instrument:    RawInstrument::from_row(row, 5)?,
              start_time:    row.get(16)?,
              end_time:      row.get(17)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChannelRecord::into_record).collect()
  }
}

// ─── AvailabilityStore impl ──────────────────────────────────────────────────

impl AvailabilityStore for SqliteStore {
  type Error = crate::Error;

  async fn upsert_availability(&self, items: Vec<AvailabilityItem>) -> Result<usize> {
    let now_str = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(UPSERT_AVAILABILITY)?;
          for item in &items {
            stmt.execute(rusqlite::params![
              item.channel_id,
              format_time(item.earliest),
              format_time(item.latest),
              now_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(items.len())
      })
      .await?;

    Ok(written)
  }

  async fn station_availability(&self, station_id: i64) -> Result<Vec<ChannelAvailability>> {
    let raws: Vec<RawChannelAvailability> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.location_code, c.code, c.sample_rate, a.earliest, a.latest
             FROM channels c
             LEFT JOIN availability a ON a.channel_id = c.id
            WHERE c.station_id = ?1
            ORDER BY c.location_code, c.code, a.earliest",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![station_id], |row| {
            Ok(RawChannelAvailability {
              channel_id:    row.get(0)?,
              location_code: row.get(1)?,
              channel_code:  row.get(2)?,
              sample_rate:   row.get(3)?,
              earliest:      row.get(4)?,
              latest:        row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawChannelAvailability::into_channel_availability)
      .collect()
  }

  async fn availability_records(&self) -> Result<Vec<AvailabilityRecord>> {
    let raws: Vec<RawAvailabilityRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT n.code, s.code, c.location_code, c.code, a.earliest, a.latest
           {AVAILABILITY_JOINS}
           ORDER BY n.code, s.code, c.location_code, c.code, a.earliest"
        ))?;
        let rows = stmt
          .query_map([], RawAvailabilityRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAvailabilityRecord::into_record).collect()
  }

  async fn availability_extents(&self) -> Result<Vec<AvailabilityRecord>> {
    let raws: Vec<RawAvailabilityRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT n.code, s.code, c.location_code, c.code, MIN(a.earliest), MAX(a.latest)
           {AVAILABILITY_JOINS}
           GROUP BY c.id
           ORDER BY n.code, s.code, c.location_code, c.code"
        ))?;
        let rows = stmt
          .query_map([], RawAvailabilityRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAvailabilityRecord::into_record).collect()
  }
}
