//! Dedup fingerprints for unified content items.
//!
//! A fingerprint is `hex(sha256("<source>|<v1>|<v2>|..."))` over a fixed,
//! per-source list of legacy columns, with `""` standing in for NULL. The
//! field lists below are part of the persisted data: reordering, adding or
//! removing a field changes every hash for that source and makes the next run
//! insert the whole table again.

use sha2::{Digest, Sha256};

use crate::{Error, Result, content::Source};

/// Joins the source name and field values before hashing.
pub const SEPARATOR: &str = "|";

/// Ordered legacy columns that make a row logically unique, per source.
pub const FINGERPRINT_FIELDS: [(Source, &[&str]); 7] = [
  (Source::Navbar, &["logo"]),
  (Source::ExperienceCards, &["title", "image_path", "link"]),
  (Source::Explorecms, &["title", "city", "image_path"]),
  (Source::HeroContent, &["title", "subtitle", "media_type", "media_path"]),
  (Source::HighlightEvents, &["title", "date_range", "image_url"]),
  (Source::TouristSpots, &["name", "lat", "lng"]),
  (Source::Destinations, &["name", "category", "image"]),
];

/// The fingerprint field list for `source`.
pub fn fields_for(source: Source) -> &'static [&'static str] {
  FINGERPRINT_FIELDS
    .iter()
    .find(|(s, _)| *s == source)
    .map(|(_, fields)| *fields)
    .unwrap_or(&[])
}

/// The exact string that gets hashed. Exposed for logging and tests.
///
/// `values` must follow [`fields_for`] order, one per field.
pub fn preimage(source: Source, values: &[Option<&str>]) -> Result<String> {
  check_arity(source, values.len())?;
  Ok(join(source, values.iter().copied()))
}

/// Compute the dedup hash for `values`, given in [`fields_for`] order.
pub fn fingerprint(source: Source, values: &[Option<&str>]) -> Result<String> {
  Ok(digest(&preimage(source, values)?))
}

/// Hash values already laid out by [`fields_for`].
pub(crate) fn hash_fields<'a>(
  source: Source,
  values: impl IntoIterator<Item = Option<&'a str>>,
) -> String {
  digest(&join(source, values))
}

fn check_arity(source: Source, got: usize) -> Result<()> {
  let expected = fields_for(source).len();
  if got == expected {
    Ok(())
  } else {
    Err(Error::FingerprintArity { table: source, expected, got })
  }
}

fn join<'a>(
  source: Source,
  values: impl IntoIterator<Item = Option<&'a str>>,
) -> String {
  let mut out = String::from(source.as_str());
  for value in values {
    out.push_str(SEPARATOR);
    out.push_str(value.unwrap_or_default());
  }
  out
}

/// Lowercase hex SHA-256 of `input`.
pub fn digest(input: &str) -> String {
  let hash = Sha256::digest(input.as_bytes());
  hex::encode(hash)
}
