//! Handlers for `GET /search` and `GET /search/suggestions`.
//!
//! A blank `q` with no other filter returns no results rather than the whole
//! table.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use mansalay_core::{
  content::ContentItem,
  store::{ContentQuery, ContentStore},
};
use serde::{Deserialize, Serialize};

use crate::{content::parse_source, error::ApiError};

/// Maximum number of suggestions returned.
pub const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Case-insensitive keyword matched against titles and names.
  pub q:        Option<String>,
  pub source:   Option<String>,
  pub category: Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
  pub results: Vec<ContentItem>,
}

/// `GET /search?q=...[&source=...][&category=...][&limit=...][&offset=...]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
  S: ContentStore,
{
  let query = ContentQuery {
    text:     params.q,
    source:   parse_source(params.source.as_deref())?,
    category: params.category.filter(|c| !c.trim().is_empty()),
    limit:    params.limit,
    offset:   params.offset,
  };

  if query.is_unfiltered() {
    return Ok(Json(SearchResponse { results: Vec::new() }));
  }

  let results = store.search(&query).await.map_err(ApiError::store)?;
  Ok(Json(SearchResponse { results }))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
  pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResponse {
  pub suggestions: Vec<String>,
}

/// `GET /search/suggestions?q=...`
pub async fn suggestions<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestResponse>, ApiError>
where
  S: ContentStore,
{
  let prefix = params.q.unwrap_or_default();
  if prefix.trim().is_empty() {
    return Ok(Json(SuggestResponse { suggestions: Vec::new() }));
  }

  let suggestions = store
    .suggest(&prefix, SUGGESTION_LIMIT)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(SuggestResponse { suggestions }))
}
