//! Content API access
//!
//! The blog only ever talks to the backend through [`ContentSource`]: a
//! predicate search and a way to follow the opaque `next_page` cursor the
//! backend hands out. [`PrismicClient`] implements it over HTTP.

mod client;
mod document;
#[cfg(test)]
pub mod memory;
mod query;

use std::future::Future;

pub use client::PrismicClient;
pub use document::{ApiInfo, Document, Ref, SearchResponse};
pub use query::{Ordering, Predicate, Query};

use crate::error::Result;

/// Cookie holding the preview ref while preview mode is active
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// A queryable content backend
pub trait ContentSource: Send + Sync {
    /// Resolve the ref of the currently published content
    fn master_ref(&self) -> impl Future<Output = Result<String>> + Send;

    /// Run a predicate query. `query.reference` selects the content
    /// version; `None` means the published (master) ref.
    fn search(&self, query: Query) -> impl Future<Output = Result<SearchResponse>> + Send;

    /// Fetch the page behind a `next_page` cursor
    fn fetch_page(&self, cursor: &str) -> impl Future<Output = Result<SearchResponse>> + Send;
}
