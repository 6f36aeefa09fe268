//! Error types for `mansalay-core`.

use thiserror::Error;

use crate::content::Source;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown content source: {0:?}")]
  UnknownSource(String),

  #[error("unknown media type: {0:?}")]
  UnknownMediaType(String),

  #[error("invalid {axis} coordinate: {value:?}")]
  InvalidCoordinate { axis: &'static str, value: String },

  #[error("{table} fingerprint takes {expected} values, got {got}")]
  FingerprintArity { table: Source, expected: usize, got: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
