//! Content retrieval for the listing and detail pages

use crate::config::SiteConfig;
use crate::content::{Direction, Listing, Navigation, Post, PostPage, PostSummary, PostView};
use crate::error::Result;
use crate::helpers::post_path;
use crate::prismic::{ContentSource, Ordering, Predicate, Query};

/// Ordering of the listing page
pub const LISTING_ORDER: &str = "document.last_publication_date";

/// Fetches and normalizes posts from a content source
pub struct Site<S> {
    source: S,
    config: SiteConfig,
}

impl<S: ContentSource> Site<S> {
    pub fn new(source: S, config: SiteConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The ref every query of one render runs against: the preview ref
    /// when given, else the master ref resolved once
    async fn reference(&self, preview: Option<&str>) -> Result<String> {
        match preview {
            Some(preview) => Ok(preview.to_string()),
            None => self.source.master_ref().await,
        }
    }

    fn listing_query(&self, reference: &str) -> Query {
        let doc_type = &self.config.document_type;
        Query::new(Predicate::document_type(doc_type))
            .fetch([
                format!("{}.title", doc_type),
                format!("{}.subtitle", doc_type),
                format!("{}.author", doc_type),
            ])
            .order_by(Ordering::desc(LISTING_ORDER))
            .page_size(self.config.page_size)
            .reference(Some(reference))
    }

    /// First page of the listing
    pub async fn listing(&self, preview: Option<&str>) -> Result<Listing> {
        let reference = self.reference(preview).await?;
        let response = self.source.search(self.listing_query(&reference)).await?;
        let page = PostPage::try_from(&response)?;
        tracing::debug!(
            "Listing page 1: {} posts, more: {}",
            page.results.len(),
            page.next_page.is_some()
        );
        Ok(Listing::new(page))
    }

    /// The page behind a listing cursor
    pub async fn next_page(&self, cursor: &str) -> Result<PostPage> {
        let response = self.source.fetch_page(cursor).await?;
        PostPage::try_from(&response)
    }

    /// A post and its neighbours, or `None` for an unknown slug
    pub async fn post(&self, slug: &str, preview: Option<&str>) -> Result<Option<PostView>> {
        let doc_type = &self.config.document_type;
        let reference = self.reference(preview).await?;
        let query = Query::new(Predicate::uid(doc_type, slug)).reference(Some(&reference));
        let response = self.source.search(query).await?;

        let Some(doc) = response.results.first() else {
            tracing::debug!("No {} with uid {:?}", doc_type, slug);
            return Ok(None);
        };
        let post = Post::try_from(doc)?;
        let navigation = self.navigation(&post.id, Some(&reference)).await?;

        Ok(Some(PostView { post, navigation }))
    }

    /// Resolve both neighbours with two independent ordered queries
    pub async fn navigation(&self, id: &str, reference: Option<&str>) -> Result<Navigation> {
        let doc_type = &self.config.document_type;
        let (prev, next) = tokio::try_join!(
            self.neighbour(Direction::Prev.query(doc_type, id, reference)),
            self.neighbour(Direction::Next.query(doc_type, id, reference)),
        )?;
        Ok(Navigation { prev, next })
    }

    async fn neighbour(&self, query: Query) -> Result<Option<PostSummary>> {
        let response = self.source.search(query).await?;
        response
            .results
            .first()
            .map(PostSummary::try_from)
            .transpose()
    }

    /// Where to send the browser when entering preview for `document_id`
    pub async fn preview_location(&self, preview: &str, document_id: &str) -> Result<String> {
        let query = Query::new(Predicate::document_id(document_id)).reference(Some(preview));
        let response = self.source.search(query).await?;
        Ok(response
            .results
            .first()
            .and_then(|doc| doc.uid.as_deref())
            .map(post_path)
            .unwrap_or_else(|| crate::helpers::HOME_PATH.to_string()))
    }
}
