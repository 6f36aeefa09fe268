//! Core types and the content consolidator for the Discover Mansalay
//! platform.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::ContentStore`]; the consolidator only ever
//! talks to that trait.

// Native `async fn` in traits; the store trait spells out `Send` futures
// explicitly where it matters.
#![allow(async_fn_in_trait)]

pub mod consolidate;
pub mod content;
pub mod error;
pub mod fingerprint;
pub mod legacy;
pub mod store;

pub use error::{Error, Result};
