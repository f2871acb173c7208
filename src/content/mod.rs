//! Content module - posts, listing state and navigation

mod detail;
mod listing;
mod navigation;
mod post;

pub use detail::{DetailPage, PostView};
pub use listing::{Listing, ListingSession, LoadMore, PostPage, RequestToken};
pub use navigation::{nav_title, Direction, NavLink, Navigation};
pub use post::{Banner, ContentBlock, Post, PostSummary, ReadingTime, WORDS_PER_MINUTE};
