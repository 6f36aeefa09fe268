//! Handlers for `/content` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/content` | Optional `?source=destinations` etc. |
//! | `GET`  | `/content/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use mansalay_core::{
  content::{ContentItem, Source},
  store::ContentStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// Parse an optional `source` query parameter into a [`Source`].
pub(crate) fn parse_source(raw: Option<&str>) -> Result<Option<Source>, ApiError> {
  raw
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| s.parse::<Source>().map_err(|e| ApiError::BadRequest(e.to_string())))
    .transpose()
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub source: Option<String>,
}

/// `GET /content[?source=<source>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ContentItem>>, ApiError>
where
  S: ContentStore,
{
  let source = parse_source(params.source.as_deref())?;
  let items = store.list_content(source).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /content/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<ContentItem>, ApiError>
where
  S: ContentStore,
{
  let item = store
    .get_content(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("content item {id} not found")))?;
  Ok(Json(item))
}
