//! Detail page state

use super::{Navigation, Post};

/// A post together with its neighbours
#[derive(Debug, Clone, PartialEq)]
pub struct PostView {
    pub post: Post,
    pub navigation: Navigation,
}

/// What a detail route shows
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPage {
    /// The page is being generated by another request
    Loading,
    /// No document has this slug
    NotFound,
    Ready(Box<PostView>),
}

impl From<Option<PostView>> for DetailPage {
    fn from(view: Option<PostView>) -> Self {
        match view {
            Some(view) => DetailPage::Ready(Box::new(view)),
            None => DetailPage::NotFound,
        }
    }
}
