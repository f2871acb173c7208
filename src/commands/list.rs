//! List posts

use anyhow::Result;

use crate::content::{Listing, ListingSession};
use crate::prismic::ContentSource;
use crate::site::Site;
use crate::Blog;

/// Print every published post, newest first
pub async fn run(blog: &Blog) -> Result<()> {
    let site = Site::new(blog.client()?, blog.config.clone());
    let listing = load_all(&site).await?;

    println!("Posts ({}):", listing.posts().len());
    for post in listing.posts() {
        let date = post
            .first_publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!("  {} - {} [{}]", date, post.title, post.slug);
    }

    Ok(())
}

/// Follow load-more cursors until the listing is exhausted
pub async fn load_all<S: ContentSource>(site: &Site<S>) -> crate::Result<Listing> {
    let mut session = ListingSession::new(site.listing(None).await?);

    while let Some(request) = session.begin_load_more() {
        match site.next_page(&request.cursor).await {
            Ok(page) => {
                session.complete(request.token, page);
            }
            Err(e) => {
                session.fail(request.token);
                return Err(e);
            }
        }
    }

    Ok(session.into_listing())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::prismic::memory::{self, MemorySource};

    #[tokio::test]
    async fn test_load_all_follows_every_cursor() {
        let site = Site::new(
            MemorySource::new(vec![
                memory::post("A", "first", "First", 1, 10),
                memory::post("B", "second", "Second", 2, 10),
                memory::post("C", "third", "Third", 3, 10),
            ]),
            SiteConfig::default(),
        );

        let listing = load_all(&site).await.unwrap();
        let slugs: Vec<_> = listing.posts().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["third", "second", "first"]);
        assert!(!listing.can_load_more());
    }

    #[tokio::test]
    async fn test_load_all_empty_repository() {
        let site = Site::new(MemorySource::new(Vec::new()), SiteConfig::default());
        let listing = load_all(&site).await.unwrap();
        assert!(listing.posts().is_empty());
    }
}
