//! SQL schema for the FDSN SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sources (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL UNIQUE,
    base_url    TEXT    NOT NULL,
    description TEXT    NOT NULL DEFAULT '',
    enabled     INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT    NOT NULL,   -- RFC 3339
    updated_at  TEXT    NOT NULL    -- RFC 3339
);

-- Epoch columns below hold YYYY-MM-DDTHH:MM:SS UTC or NULL when open.
CREATE TABLE IF NOT EXISTS networks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id   INTEGER NOT NULL REFERENCES sources(id) ON DELETE CASCADE,
    code        TEXT    NOT NULL,
    description TEXT    NOT NULL DEFAULT '',
    start_time  TEXT,
    end_time    TEXT,
    created_at  TEXT    NOT NULL,
    UNIQUE (source_id, code)
);

CREATE TABLE IF NOT EXISTS stations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    network_id  INTEGER NOT NULL REFERENCES networks(id) ON DELETE CASCADE,
    code        TEXT    NOT NULL,
    latitude    REAL    NOT NULL DEFAULT 0,
    longitude   REAL    NOT NULL DEFAULT 0,
    elevation   REAL    NOT NULL DEFAULT 0,
    site_name   TEXT    NOT NULL DEFAULT '',
    start_time  TEXT,
    end_time    TEXT,
    created_at  TEXT    NOT NULL,
    UNIQUE (network_id, code)
);

CREATE TABLE IF NOT EXISTS channels (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    station_id         INTEGER NOT NULL REFERENCES stations(id) ON DELETE CASCADE,
    location_code      TEXT    NOT NULL DEFAULT '',
    code               TEXT    NOT NULL,
    latitude           REAL,
    longitude          REAL,
    elevation          REAL,
    depth              REAL,
    azimuth            REAL,
    dip                REAL,
    sensor_description TEXT    NOT NULL DEFAULT '',
    scale              REAL,
    scale_freq         REAL,
    scale_units        TEXT    NOT NULL DEFAULT '',
    sample_rate        REAL,
    start_time         TEXT,
    end_time           TEXT,
    created_at         TEXT    NOT NULL,
    UNIQUE (station_id, location_code, code)
);

CREATE TABLE IF NOT EXISTS availability (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    channel_id  INTEGER NOT NULL REFERENCES channels(id) ON DELETE CASCADE,
    earliest    TEXT    NOT NULL,
    latest      TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL,
    UNIQUE (channel_id, earliest),
    CHECK  (earliest <= latest)
);

CREATE INDEX IF NOT EXISTS networks_code_idx         ON networks(code);
CREATE INDEX IF NOT EXISTS stations_network_idx      ON stations(network_id);
CREATE INDEX IF NOT EXISTS channels_station_idx      ON channels(station_id);
CREATE INDEX IF NOT EXISTS availability_channel_idx  ON availability(channel_id);

PRAGMA user_version = 1;
";
