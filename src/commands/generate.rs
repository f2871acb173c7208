//! Generate static files

use anyhow::Result;
use std::path::Path;

use crate::commands::list;
use crate::generator::{write_page, Generator, ListingMode};
use crate::helpers::post_output_path;
use crate::prismic::ContentSource;
use crate::site::Site;
use crate::templates::STYLESHEET;
use crate::Blog;

/// Generate the listing page and the posts of its first page, or every
/// post when `all` is set
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let start = std::time::Instant::now();

    let site = Site::new(blog.client()?, blog.config.clone());
    let generator = blog.generator()?;
    let pages = build(&site, &generator, &blog.public_dir, all).await?;

    let duration = start.elapsed();
    tracing::info!("Generated {} pages in {:.2}s", pages, duration.as_secs_f64());

    Ok(())
}

/// Write the site below `public_dir`, returning the number of HTML pages
pub async fn build<S: ContentSource>(
    site: &Site<S>,
    generator: &Generator,
    public_dir: &Path,
    all: bool,
) -> crate::Result<usize> {
    let listing = site.listing(None).await?;
    let index = generator.render_listing(&listing, ListingMode::Static, false)?;
    write_page(public_dir, "index.html", &index)?;
    write_page(public_dir, "styles.css", STYLESHEET)?;

    let posts = if all {
        list::load_all(site).await?.posts().to_vec()
    } else {
        listing.posts().to_vec()
    };
    tracing::info!("Loaded {} posts", posts.len());

    let mut pages = 1;
    for summary in &posts {
        match site.post(&summary.slug, None).await? {
            Some(view) => {
                let html = generator.render_post(&view, false)?;
                write_page(public_dir, &post_output_path(&summary.slug), &html)?;
                pages += 1;
            }
            None => tracing::warn!("Post {} disappeared while generating", summary.slug),
        }
    }

    Ok(pages)
}
