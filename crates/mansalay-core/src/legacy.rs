//! Typed rows of the seven legacy content tables.
//!
//! Each table gets its own record type carrying only the columns the
//! consolidator reads. [`LegacyRecord`] tags them by source and knows how to
//! fingerprint a row and map it onto a [`NewContentItem`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  Error, Result,
  content::{MediaType, NewContentItem, Source},
  fingerprint::{fields_for, hash_fields},
};

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A latitude or longitude held at the precision of the legacy
/// `DECIMAL(9,6)` columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate(f64);

impl Coordinate {
  pub fn latitude(value: f64) -> Result<Self> {
    Self::checked("latitude", value, 90.0)
  }

  pub fn longitude(value: f64) -> Result<Self> {
    Self::checked("longitude", value, 180.0)
  }

  /// Parse a textual latitude, as stored by drivers that return decimals as
  /// strings.
  pub fn parse_latitude(text: &str) -> Result<Self> {
    Self::latitude(Self::parse("latitude", text)?)
  }

  pub fn parse_longitude(text: &str) -> Result<Self> {
    Self::longitude(Self::parse("longitude", text)?)
  }

  fn parse(axis: &'static str, text: &str) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| Error::InvalidCoordinate {
      axis,
      value: text.to_owned(),
    })
  }

  fn checked(axis: &'static str, value: f64, bound: f64) -> Result<Self> {
    if value.is_finite() && (-bound..=bound).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::InvalidCoordinate { axis, value: value.to_string() })
    }
  }

  pub fn value(self) -> f64 { self.0 }

  /// Six-decimal text, identical for every representation of the same
  /// stored decimal. This is what gets fingerprinted.
  pub fn canonical(self) -> String { format!("{:.6}", self.0) }
}

impl fmt::Display for Coordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.6}", self.0)
  }
}

// ─── Per-table rows ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct NavbarRow {
  pub id:   i64,
  pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceCardRow {
  pub id:         i64,
  pub title:      Option<String>,
  pub image_path: Option<String>,
  pub link:       Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// A row of the `explorecms` ("top destinations") table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExploreRow {
  pub id:         i64,
  pub title:      Option<String>,
  pub city:       Option<String>,
  pub email:      Option<String>,
  pub contact:    Option<String>,
  /// Bare filename under the upload directory.
  pub image_path: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroRow {
  pub id:         i64,
  pub title:      Option<String>,
  pub subtitle:   Option<String>,
  /// Stored text. Decoding checks it names a [`MediaType`] but keeps the
  /// original spelling, which is what gets fingerprinted.
  pub media_type: Option<String>,
  pub media_path: Option<String>,
  pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightEventRow {
  pub id:          i64,
  pub title:       Option<String>,
  pub description: Option<String>,
  /// Free text such as "May 1 - 3"; lands in the unified `category`.
  pub date_range:  Option<String>,
  pub image_url:   Option<String>,
  pub link:        Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouristSpotRow {
  pub id:         i64,
  pub name:       Option<String>,
  pub lat:        Option<Coordinate>,
  pub lng:        Option<Coordinate>,
  pub image:      Option<String>,
  pub category:   Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRow {
  pub id:          i64,
  pub name:        Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub image:       Option<String>,
  pub created_at:  Option<DateTime<Utc>>,
}

// ─── LegacyRecord ────────────────────────────────────────────────────────────

/// One row from any legacy table.
#[derive(Debug, Clone, PartialEq)]
pub enum LegacyRecord {
  Navbar(NavbarRow),
  ExperienceCard(ExperienceCardRow),
  Explore(ExploreRow),
  Hero(HeroRow),
  HighlightEvent(HighlightEventRow),
  TouristSpot(TouristSpotRow),
  Destination(DestinationRow),
}

impl LegacyRecord {
  pub fn source(&self) -> Source {
    match self {
      Self::Navbar(_) => Source::Navbar,
      Self::ExperienceCard(_) => Source::ExperienceCards,
      Self::Explore(_) => Source::Explorecms,
      Self::Hero(_) => Source::HeroContent,
      Self::HighlightEvent(_) => Source::HighlightEvents,
      Self::TouristSpot(_) => Source::TouristSpots,
      Self::Destination(_) => Source::Destinations,
    }
  }

  /// Primary key in the legacy table.
  pub fn id(&self) -> i64 {
    match self {
      Self::Navbar(r) => r.id,
      Self::ExperienceCard(r) => r.id,
      Self::Explore(r) => r.id,
      Self::Hero(r) => r.id,
      Self::HighlightEvent(r) => r.id,
      Self::TouristSpot(r) => r.id,
      Self::Destination(r) => r.id,
    }
  }

  /// The value of legacy column `column` as it enters the fingerprint, or
  /// `None` if this table has no such column.
  fn column(&self, column: &str) -> Option<Option<String>> {
    let value = match (self, column) {
      (Self::Navbar(r), "logo") => r.logo.clone(),
      (Self::ExperienceCard(r), "title") => r.title.clone(),
      (Self::ExperienceCard(r), "image_path") => r.image_path.clone(),
      (Self::ExperienceCard(r), "link") => r.link.clone(),
      (Self::Explore(r), "title") => r.title.clone(),
      (Self::Explore(r), "city") => r.city.clone(),
      (Self::Explore(r), "image_path") => r.image_path.clone(),
      (Self::Hero(r), "title") => r.title.clone(),
      (Self::Hero(r), "subtitle") => r.subtitle.clone(),
      (Self::Hero(r), "media_type") => r.media_type.clone(),
      (Self::Hero(r), "media_path") => r.media_path.clone(),
      (Self::HighlightEvent(r), "title") => r.title.clone(),
      (Self::HighlightEvent(r), "date_range") => r.date_range.clone(),
      (Self::HighlightEvent(r), "image_url") => r.image_url.clone(),
      (Self::TouristSpot(r), "name") => r.name.clone(),
      (Self::TouristSpot(r), "lat") => r.lat.map(Coordinate::canonical),
      (Self::TouristSpot(r), "lng") => r.lng.map(Coordinate::canonical),
      (Self::Destination(r), "name") => r.name.clone(),
      (Self::Destination(r), "category") => r.category.clone(),
      (Self::Destination(r), "image") => r.image.clone(),
      _ => return None,
    };
    Some(value)
  }

  /// Values of the fingerprint fields, in
  /// [`FINGERPRINT_FIELDS`](crate::fingerprint::FINGERPRINT_FIELDS) order.
  pub fn fingerprint_values(&self) -> Vec<Option<String>> {
    fields_for(self.source())
      .iter()
      .map(|column| self.column(column).flatten())
      .collect()
  }

  /// The dedup hash for this row.
  pub fn fingerprint(&self) -> String {
    let values = self.fingerprint_values();
    hash_fields(self.source(), values.iter().map(Option::as_deref))
  }

  /// Map onto the unified schema. Timestamps the source lacks become `now`.
  pub fn into_content_item(self, now: DateTime<Utc>) -> NewContentItem {
    let mut item = NewContentItem::empty(self.source(), self.fingerprint(), now);

    match self {
      Self::Navbar(r) => {
        item.image_url = r.logo;
      }
      Self::ExperienceCard(r) => {
        item.title = r.title;
        item.media_path = r.image_path;
        item.link = r.link;
        item.created_at = r.created_at.unwrap_or(now);
        item.updated_at = r.updated_at.unwrap_or(item.created_at);
      }
      Self::Explore(r) => {
        item.title = r.title;
        item.city = r.city;
        item.email = r.email;
        item.contact = r.contact;
        item.image_url = r.image_path;
        item.created_at = r.created_at.unwrap_or(now);
        item.updated_at = item.created_at;
      }
      Self::Hero(r) => {
        item.title = r.title;
        item.description = r.subtitle;
        item.media_type = r
          .media_type
          .as_deref()
          .and_then(|m| m.parse::<MediaType>().ok())
          .unwrap_or_default();
        item.media_path = r.media_path;
        item.updated_at = r.updated_at.unwrap_or(now);
        item.created_at = item.updated_at;
      }
      Self::HighlightEvent(r) => {
        item.title = r.title;
        item.description = r.description;
        item.category = r.date_range;
        item.image_url = r.image_url;
        item.link = r.link;
      }
      Self::TouristSpot(r) => {
        item.name = r.name;
        item.lat = r.lat.map(Coordinate::value);
        item.lng = r.lng.map(Coordinate::value);
        item.image_url = r.image;
        item.category = r.category;
        item.created_at = r.created_at.unwrap_or(now);
        item.updated_at = item.created_at;
      }
      Self::Destination(r) => {
        item.name = r.name;
        item.description = r.description;
        item.category = r.category;
        item.image_url = r.image;
        item.created_at = r.created_at.unwrap_or(now);
        item.updated_at = item.created_at;
      }
    }

    item
  }
}

// ─── Row errors ──────────────────────────────────────────────────────────────

/// A legacy row that could not be turned into a [`LegacyRecord`].
#[derive(Debug, Clone, Error)]
#[error("{table} row {row_id}: {reason}")]
pub struct RowError {
  pub table:  Source,
  pub row_id: i64,
  pub reason: String,
}

impl RowError {
  pub fn new(table: Source, row_id: i64, reason: impl fmt::Display) -> Self {
    Self { table, row_id, reason: reason.to_string() }
  }
}
