//! Previous/next post navigation

use serde::Serialize;

use super::PostSummary;
use crate::helpers::{post_path, truncate};
use crate::prismic::{Ordering, Predicate, Query};

/// Navigation titles longer than this are shortened
pub const NAV_TITLE_LIMIT: usize = 35;

/// Chars kept from a shortened navigation title
pub const NAV_TITLE_KEEP: usize = 33;

/// Field both neighbour queries order by
pub const PUBLICATION_ORDER: &str = "document.first_publication_date";

/// The posts published right before and right after a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Navigation {
    pub prev: Option<PostSummary>,
    pub next: Option<PostSummary>,
}

/// Which neighbour to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    /// Query for the single neighbour of document `id` in this direction
    pub fn query(self, doc_type: &str, id: &str, reference: Option<&str>) -> Query {
        let ordering = match self {
            Direction::Prev => Ordering::desc(PUBLICATION_ORDER),
            Direction::Next => Ordering::asc(PUBLICATION_ORDER),
        };
        Query::new(Predicate::document_type(doc_type))
            .fetch([
                format!("{}.title", doc_type),
                format!("{}.subtitle", doc_type),
                format!("{}.author", doc_type),
            ])
            .order_by(ordering)
            .page_size(1)
            .after(id)
            .reference(reference)
    }
}

/// A rendered navigation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub url: String,
}

impl From<&PostSummary> for NavLink {
    fn from(post: &PostSummary) -> Self {
        Self {
            title: nav_title(&post.title),
            url: post_path(&post.slug),
        }
    }
}

/// Shorten a title for a navigation link
pub fn nav_title(title: &str) -> String {
    truncate(title, NAV_TITLE_LIMIT, NAV_TITLE_KEEP, "...")
}
