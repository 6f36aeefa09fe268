//! Read-only JSON API over the unified content table.
//!
//! Exposes an axum [`Router`] backed by any
//! [`mansalay_core::store::ContentStore`]. Writes happen elsewhere: the
//! consolidator fills the table at startup and nothing here mutates it.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mansalay_api::api_router(store.clone()))
//! ```

pub mod content;
pub mod error;
pub mod search;

use std::sync::Arc;

use axum::{Router, routing::get};
use mansalay_core::store::ContentStore;

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ContentStore + Send + Sync + 'static,
{
  Router::new()
    .route("/content", get(content::list::<S>))
    .route("/content/{id}", get(content::get_one::<S>))
    .route("/search", get(search::handler::<S>))
    .route("/search/suggestions", get(search::suggestions::<S>))
    .with_state(store)
}
