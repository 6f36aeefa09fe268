//! Unified content items: the rows of the consolidated `content_items`
//! table.
//!
//! Every legacy table maps onto the same wide record. Columns a given source
//! has no use for stay `None`.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Source ──────────────────────────────────────────────────────────────────

/// The legacy table a unified item was copied from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Source {
  Navbar,
  ExperienceCards,
  Explorecms,
  HeroContent,
  HighlightEvents,
  TouristSpots,
  Destinations,
}

impl Source {
  /// Every source, in the order the consolidator visits them.
  pub const ALL: [Source; 7] = [
    Source::Navbar,
    Source::ExperienceCards,
    Source::Explorecms,
    Source::HeroContent,
    Source::HighlightEvents,
    Source::TouristSpots,
    Source::Destinations,
  ];

  /// The value stored in the `source` column. Doubles as the legacy table
  /// name.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Navbar => "navbar",
      Self::ExperienceCards => "experience_cards",
      Self::Explorecms => "explorecms",
      Self::HeroContent => "hero_content",
      Self::HighlightEvents => "highlight_events",
      Self::TouristSpots => "tourist_spots",
      Self::Destinations => "destinations",
    }
  }
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Source {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|source| source.as_str() == s)
      .ok_or_else(|| Error::UnknownSource(s.to_owned()))
  }
}

// ─── Media type ──────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
  #[default]
  Image,
  Video,
}

impl MediaType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Image => "image",
      Self::Video => "video",
    }
  }
}

impl FromStr for MediaType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "image" => Ok(Self::Image),
      "video" => Ok(Self::Video),
      _ => Err(Error::UnknownMediaType(s.to_owned())),
    }
  }
}

// ─── NewContentItem ──────────────────────────────────────────────────────────

/// A unified row ready to be inserted. `id` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContentItem {
  pub source:      Source,
  pub title:       Option<String>,
  pub name:        Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
  pub city:        Option<String>,
  pub email:       Option<String>,
  pub contact:     Option<String>,
  pub lat:         Option<f64>,
  pub lng:         Option<f64>,
  pub media_type:  MediaType,
  /// Relative path including the upload directory
  /// (e.g. `uploads/home-background/x.jpg`).
  pub media_path:  Option<String>,
  /// Bare filename or source-provided URL.
  pub image_url:   Option<String>,
  pub link:        Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
  /// Hex SHA-256 over the source's fingerprint fields. Unique across the
  /// whole table.
  pub dedup_hash:  String,
}

impl NewContentItem {
  /// An item with every optional column empty and both timestamps set to
  /// `now`.
  pub fn empty(source: Source, dedup_hash: String, now: DateTime<Utc>) -> Self {
    Self {
      source,
      title: None,
      name: None,
      description: None,
      category: None,
      city: None,
      email: None,
      contact: None,
      lat: None,
      lng: None,
      media_type: MediaType::default(),
      media_path: None,
      image_url: None,
      link: None,
      created_at: now,
      updated_at: now,
      dedup_hash,
    }
  }
}

// ─── ContentItem ─────────────────────────────────────────────────────────────

/// A persisted unified row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
  pub id:   i64,
  #[serde(flatten)]
  pub item: NewContentItem,
}

impl ContentItem {
  /// The label shown to users: `title`, falling back to `name`.
  pub fn label(&self) -> Option<&str> {
    self.item.title.as_deref().or(self.item.name.as_deref())
  }
}
