//! Encoding and decoding helpers between Rust domain types and the values
//! stored in SQLite columns.
//!
//! Unified timestamps are stored as RFC 3339 strings. Legacy tables were
//! written by other services, so their columns are read as dynamic
//! [`Value`]s and coerced here, one row at a time.

use std::vec::IntoIter;

use chrono::{DateTime, NaiveDateTime, Utc};
use mansalay_core::{
  content::{ContentItem, MediaType, NewContentItem, Source},
  legacy::{
    Coordinate, DestinationRow, ExperienceCardRow, ExploreRow, HeroRow,
    HighlightEventRow, LegacyRecord, NavbarRow, RowError, TouristSpotRow,
  },
};
use rusqlite::types::Value;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` format
/// (`YYYY-MM-DD HH:MM:SS`, implicitly UTC).
pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|naive| naive.and_utc())
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Dynamic values ──────────────────────────────────────────────────────────

/// Coerce a column to text. Numbers are rendered, blobs must be UTF-8.
fn value_text(value: Value) -> Result<Option<String>, String> {
  match value {
    Value::Null => Ok(None),
    Value::Text(s) => Ok(Some(s)),
    Value::Integer(i) => Ok(Some(i.to_string())),
    Value::Real(f) => Ok(Some(f.to_string())),
    Value::Blob(bytes) => String::from_utf8(bytes)
      .map(Some)
      .map_err(|_| "blob column is not valid UTF-8".to_owned()),
  }
}

fn value_coordinate(
  value: Value,
  from_f64: fn(f64) -> mansalay_core::Result<Coordinate>,
  from_text: fn(&str) -> mansalay_core::Result<Coordinate>,
) -> Result<Option<Coordinate>, String> {
  let coordinate = match value {
    Value::Null => return Ok(None),
    Value::Integer(i) => from_f64(i as f64),
    Value::Real(f) => from_f64(f),
    Value::Text(s) if s.trim().is_empty() => return Ok(None),
    Value::Text(s) => from_text(&s),
    Value::Blob(_) => return Err("coordinate stored as blob".to_owned()),
  };
  coordinate.map(Some).map_err(|e| e.to_string())
}

// ─── Legacy rows ─────────────────────────────────────────────────────────────

/// A legacy row as read from SQLite: the primary key plus the remaining
/// selected columns, in `schema::legacy_columns` order.
pub struct RawLegacyRow {
  pub id:     i64,
  pub values: Vec<Value>,
}

/// Pops columns off a [`RawLegacyRow`] in order.
struct Columns {
  iter: IntoIter<Value>,
}

impl Columns {
  fn pop(&mut self) -> Value { self.iter.next().unwrap_or(Value::Null) }

  fn text(&mut self) -> Result<Option<String>, String> { value_text(self.pop()) }

  fn timestamp(&mut self) -> Result<Option<DateTime<Utc>>, String> {
    self
      .text()?
      .map(|s| decode_dt(&s).map_err(|e| e.to_string()))
      .transpose()
  }

  /// Text that must name a [`MediaType`]; returned as stored.
  fn media_type(&mut self) -> Result<Option<String>, String> {
    let text = self.text()?;
    if let Some(s) = &text {
      s.parse::<MediaType>().map_err(|e| e.to_string())?;
    }
    Ok(text)
  }

  fn latitude(&mut self) -> Result<Option<Coordinate>, String> {
    value_coordinate(self.pop(), Coordinate::latitude, Coordinate::parse_latitude)
  }

  fn longitude(&mut self) -> Result<Option<Coordinate>, String> {
    value_coordinate(
      self.pop(),
      Coordinate::longitude,
      Coordinate::parse_longitude,
    )
  }
}

impl RawLegacyRow {
  pub fn into_record(self, source: Source) -> Result<LegacyRecord, RowError> {
    let id = self.id;
    decode_legacy(source, id, Columns { iter: self.values.into_iter() })
      .map_err(|reason| RowError::new(source, id, reason))
  }
}

fn decode_legacy(
  source: Source,
  id: i64,
  mut c: Columns,
) -> Result<LegacyRecord, String> {
  let record = match source {
    Source::Navbar => LegacyRecord::Navbar(NavbarRow { id, logo: c.text()? }),
    Source::ExperienceCards => LegacyRecord::ExperienceCard(ExperienceCardRow {
      id,
      title: c.text()?,
      image_path: c.text()?,
      link: c.text()?,
      created_at: c.timestamp()?,
      updated_at: c.timestamp()?,
    }),
    Source::Explorecms => LegacyRecord::Explore(ExploreRow {
      id,
      title: c.text()?,
      city: c.text()?,
      email: c.text()?,
      contact: c.text()?,
      image_path: c.text()?,
      created_at: c.timestamp()?,
    }),
    Source::HeroContent => LegacyRecord::Hero(HeroRow {
      id,
      title: c.text()?,
      subtitle: c.text()?,
      media_type: c.media_type()?,
      media_path: c.text()?,
      updated_at: c.timestamp()?,
    }),
    Source::HighlightEvents => LegacyRecord::HighlightEvent(HighlightEventRow {
      id,
      title: c.text()?,
      description: c.text()?,
      date_range: c.text()?,
      image_url: c.text()?,
      link: c.text()?,
    }),
    Source::TouristSpots => LegacyRecord::TouristSpot(TouristSpotRow {
      id,
      name: c.text()?,
      lat: c.latitude()?,
      lng: c.longitude()?,
      image: c.text()?,
      category: c.text()?,
      created_at: c.timestamp()?,
    }),
    Source::Destinations => LegacyRecord::Destination(DestinationRow {
      id,
      name: c.text()?,
      description: c.text()?,
      category: c.text()?,
      image: c.text()?,
      created_at: c.timestamp()?,
    }),
  };
  Ok(record)
}

// ─── Unified rows ────────────────────────────────────────────────────────────

/// Raw values read directly from a `content_items` row.
pub struct RawContentItem {
  pub id:          i64,
  pub source:      String,
  pub title:       Option<String>,
  pub name:        Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub city:        Option<String>,
  pub email:       Option<String>,
  pub contact:     Option<String>,
  pub lat:         Option<f64>,
  pub lng:         Option<f64>,
  pub media_type:  String,
  pub media_path:  Option<String>,
  pub image_url:   Option<String>,
  pub link:        Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
  pub dedup_hash:  String,
}

impl RawContentItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      source:      row.get(1)?,
      title:       row.get(2)?,
      name:        row.get(3)?,
      description: row.get(4)?,
      category:    row.get(5)?,
      city:        row.get(6)?,
      email:       row.get(7)?,
      contact:     row.get(8)?,
      lat:         row.get(9)?,
      lng:         row.get(10)?,
      media_type:  row.get(11)?,
      media_path:  row.get(12)?,
      image_url:   row.get(13)?,
      link:        row.get(14)?,
      created_at:  row.get(15)?,
      updated_at:  row.get(16)?,
      dedup_hash:  row.get(17)?,
    })
  }

  pub fn into_content_item(self) -> Result<ContentItem> {
    let id = self.id;
    let corrupt = |e: mansalay_core::Error| Error::CorruptRow {
      id,
      reason: e.to_string(),
    };

    Ok(ContentItem {
      id,
      item: NewContentItem {
        source:      self.source.parse::<Source>().map_err(corrupt)?,
        title:       self.title,
        name:        self.name,
        description: self.description,
        category:    self.category,
        city:        self.city,
        email:       self.email,
        contact:     self.contact,
        lat:         self.lat,
        lng:         self.lng,
        media_type:  self.media_type.parse::<MediaType>().map_err(corrupt)?,
        media_path:  self.media_path,
        image_url:   self.image_url,
        link:        self.link,
        created_at:  decode_dt(&self.created_at)?,
        updated_at:  decode_dt(&self.updated_at)?,
        dedup_hash:  self.dedup_hash,
      },
    })
  }
}
