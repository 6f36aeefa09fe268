//! SQL schema for the Discover Mansalay SQLite store.
//!
//! [`SCHEMA`] holds the unified table and is executed on every open.
//! [`LEGACY_SCHEMA`] recreates the seven per-section tables the CMS services
//! write to; the consolidator only reads them and never creates them.

use mansalay_core::content::Source;

/// Unified table DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per distinct fingerprint. Rows are only ever inserted by the
-- consolidator; it never updates or deletes them.
CREATE TABLE IF NOT EXISTS content_items (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    source      TEXT NOT NULL,   -- legacy table name
    title       TEXT,
    name        TEXT,
    description TEXT,
    category    TEXT,
    city        TEXT,
    email       TEXT,
    contact     TEXT,
    lat         REAL,
    lng         REAL,
    media_type  TEXT NOT NULL DEFAULT 'image'
                CHECK (media_type IN ('image', 'video')),
    media_path  TEXT,
    image_url   TEXT,
    link        TEXT,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC
    dedup_hash  TEXT NOT NULL,   -- hex SHA-256 fingerprint
    UNIQUE (dedup_hash)
);

CREATE INDEX IF NOT EXISTS content_items_source_idx   ON content_items(source);
CREATE INDEX IF NOT EXISTS content_items_category_idx ON content_items(category);
";

/// Legacy per-section tables, as created by the CMS services.
pub const LEGACY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS navbar (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    logo TEXT
);

CREATE TABLE IF NOT EXISTS experience_cards (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT,
    image_path TEXT,
    link       TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS explorecms (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT,
    city       TEXT,
    email      TEXT,
    contact    TEXT,
    image_path TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS hero_content (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    title      TEXT NOT NULL,
    subtitle   TEXT,
    media_type TEXT DEFAULT 'image',
    media_path TEXT DEFAULT 'default.jpg',
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS highlight_events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT,
    description TEXT,
    date_range  TEXT,
    image_url   TEXT,
    link        TEXT
);

CREATE TABLE IF NOT EXISTS tourist_spots (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT,
    lat        NUMERIC,
    lng        NUMERIC,
    image      TEXT,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    category   TEXT
);

CREATE TABLE IF NOT EXISTS destinations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    category    TEXT,
    image       TEXT,
    created_at  TEXT DEFAULT CURRENT_TIMESTAMP
);
";

/// Columns selected from each legacy table. `id` always comes first; the
/// rest are decoded positionally in `encode`.
pub fn legacy_columns(source: Source) -> &'static str {
  match source {
    Source::Navbar => "id, logo",
    Source::ExperienceCards => {
      "id, title, image_path, link, created_at, updated_at"
    }
    Source::Explorecms => {
      "id, title, city, email, contact, image_path, created_at"
    }
    Source::HeroContent => {
      "id, title, subtitle, media_type, media_path, updated_at"
    }
    Source::HighlightEvents => {
      "id, title, description, date_range, image_url, link"
    }
    Source::TouristSpots => "id, name, lat, lng, image, category, created_at",
    Source::Destinations => "id, name, description, category, image, created_at",
  }
}

/// Columns of `content_items`, in the order `encode::RawContentItem` reads
/// them.
pub const CONTENT_COLUMNS: &str = "id, source, title, name, description, \
  category, city, email, contact, lat, lng, media_type, media_path, \
  image_url, link, created_at, updated_at, dedup_hash";
