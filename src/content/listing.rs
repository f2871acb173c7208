//! Paginated post listing
//!
//! The listing is an immutable value. The only way to grow it is
//! [`Listing::apply`], which takes the next fetched page and returns the
//! new state. [`ListingSession`] sequences load-more requests so that a
//! response arriving after a newer request was issued is dropped instead of
//! clobbering the cursor.

use serde::Serialize;

use super::PostSummary;
use crate::error::Result;
use crate::prismic::SearchResponse;

/// One page of post summaries plus the cursor to the page after it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostPage {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

impl TryFrom<&SearchResponse> for PostPage {
    type Error = crate::error::Error;

    fn try_from(response: &SearchResponse) -> Result<Self> {
        let results = response
            .results
            .iter()
            .map(PostSummary::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            results,
            next_page: response.next_page.clone(),
        })
    }
}

/// Accumulated posts and the cursor to the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Listing {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
}

impl Listing {
    /// State after the first page
    pub fn new(first: PostPage) -> Self {
        Self::default().apply(first)
    }

    /// Append the page's posts and adopt its cursor
    pub fn apply(mut self, page: PostPage) -> Self {
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Load more is offered only while a cursor is present
    pub fn can_load_more(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Identifies one load-more request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

/// A load-more request to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMore {
    pub token: RequestToken,
    pub cursor: String,
}

/// A listing plus load-more bookkeeping
#[derive(Debug, Clone, Default)]
pub struct ListingSession {
    listing: Listing,
    issued: u64,
    in_flight: bool,
}

impl ListingSession {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing,
            ..Default::default()
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn into_listing(self) -> Listing {
        self.listing
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Issue a request for the next page, superseding any earlier one.
    /// Returns `None` when the listing is exhausted.
    pub fn begin_load_more(&mut self) -> Option<LoadMore> {
        let cursor = self.listing.next_page()?.to_string();
        self.issued += 1;
        self.in_flight = true;
        Some(LoadMore {
            token: RequestToken(self.issued),
            cursor,
        })
    }

    /// Apply a fetched page if `token` is the latest request.
    /// Returns whether the page was applied.
    pub fn complete(&mut self, token: RequestToken, page: PostPage) -> bool {
        if token.0 != self.issued || !self.in_flight {
            tracing::debug!("Discarding stale load-more response {:?}", token);
            return false;
        }
        self.listing = std::mem::take(&mut self.listing).apply(page);
        self.in_flight = false;
        true
    }

    /// A failed request leaves posts and cursor untouched
    pub fn fail(&mut self, token: RequestToken) {
        if token.0 == self.issued {
            self.in_flight = false;
        }
    }
}
