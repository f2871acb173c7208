//! Generator module - turns posts into HTML pages using the built-in theme

use chrono::Locale;
use std::fs;
use std::path::Path;
use tera::Context;

use crate::comments;
use crate::config::SiteConfig;
use crate::content::{DetailPage, Listing, NavLink, PostSummary, PostView};
use crate::error::Result;
use crate::helpers::{
    date_xml, format_date, locale_for, post_path, EXIT_PREVIEW_PATH, LOAD_MORE_PATH,
};
use crate::i18n::I18n;
use crate::templates::{BlockData, PostCard, PostData, TemplateRenderer};

/// Where the listing's load-more button gets further pages from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    /// Through the server's JSON endpoint
    Served,
    /// Straight from the content API cursor, for static hosting
    Static,
}

/// Page renderer
pub struct Generator {
    config: SiteConfig,
    renderer: TemplateRenderer,
    i18n: I18n,
    locale: Locale,
}

impl Generator {
    /// Create a new generator
    pub fn new(config: &SiteConfig) -> Result<Self> {
        Self::with_i18n(config, I18n::new(&config.language))
    }

    /// Create a generator with preloaded translations
    pub fn with_i18n(config: &SiteConfig, i18n: I18n) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            renderer: TemplateRenderer::new()?,
            locale: locale_for(&config.language),
            i18n,
        })
    }

    /// Create a base context with common variables
    fn create_base_context(&self, page_title: &str, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("lang", self.i18n.language());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context.insert("site_title", &self.config.title);
        context.insert("page_title", page_title);
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("preview", &preview);
        context.insert("exit_preview_url", EXIT_PREVIEW_PATH);
        context
    }

    /// Listing entry for a post
    pub fn post_card(&self, post: &PostSummary) -> PostCard {
        PostCard {
            slug: post.slug.clone(),
            url: post_path(&post.slug),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: post
                .first_publication_date
                .map(|d| format_date(&d, &self.config.date_format, self.locale)),
            date_iso: post.first_publication_date.map(|d| date_xml(&d)),
        }
    }

    /// Render the listing page
    pub fn render_listing(
        &self,
        listing: &Listing,
        mode: ListingMode,
        preview: bool,
    ) -> Result<String> {
        let posts: Vec<PostCard> = listing.posts().iter().map(|p| self.post_card(p)).collect();

        let mut context = self.create_base_context(&self.i18n.get("home_title"), preview);
        context.insert("posts", &posts);
        context.insert("next_page", &listing.next_page());
        let load_more_url = match mode {
            ListingMode::Served => Some(LOAD_MORE_PATH),
            ListingMode::Static => None,
        };
        context.insert("load_more_url", &load_more_url);

        self.renderer.render("index.html", &context)
    }

    /// Render a post page
    pub fn render_post(&self, view: &PostView, preview: bool) -> Result<String> {
        let post = &view.post;

        let reading_time = match post.reading_time().minutes() {
            Some(minutes) => self
                .i18n
                .get("reading_time")
                .replace("%d", &minutes.to_string()),
            None => self.i18n.get("calculating"),
        };

        let edited = match post.last_publication_date {
            Some(last) if post.is_edited() => Some(self.i18n.get("edited").replace(
                "%s",
                &format_date(&last, &self.config.datetime_format, self.locale),
            )),
            _ => None,
        };

        let data = PostData {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: post
                .first_publication_date
                .map(|d| format_date(&d, &self.config.date_format, self.locale)),
            date_iso: post.first_publication_date.map(|d| date_xml(&d)),
            edited,
            reading_time,
            banner_url: post.banner.url.clone().filter(|u| !u.is_empty()),
            banner_alt: post.banner.alt.clone().unwrap_or_else(|| post.title.clone()),
            blocks: post
                .content
                .iter()
                .enumerate()
                .map(|(index, block)| BlockData {
                    index,
                    heading: block.heading.clone(),
                    html: block.body.as_html(),
                })
                .collect(),
        };

        let prev = view.navigation.prev.as_ref().map(NavLink::from);
        let next = view.navigation.next.as_ref().map(NavLink::from);

        let mut context = self.create_base_context(&self.i18n.get("post_title"), preview);
        context.insert("post", &data);
        context.insert("prev", &prev);
        context.insert("next", &next);
        context.insert("comments", &comments::render(&self.config.comments));

        self.renderer.render("post.html", &context)
    }

    /// Render whichever state a detail route is in
    pub fn render_detail(&self, page: &DetailPage, preview: bool) -> Result<String> {
        match page {
            DetailPage::Loading => self.render_loading(),
            DetailPage::NotFound => self.render_not_found(preview),
            DetailPage::Ready(view) => self.render_post(view, preview),
        }
    }

    /// Transient page shown while a post is generated by another request
    pub fn render_loading(&self) -> Result<String> {
        self.loading_page("post_title")
    }

    /// Transient page shown while the listing is generated by another request
    pub fn render_listing_loading(&self) -> Result<String> {
        self.loading_page("home_title")
    }

    fn loading_page(&self, title_key: &str) -> Result<String> {
        let context = self.create_base_context(&self.i18n.get(title_key), false);
        self.renderer.render("loading.html", &context)
    }

    /// Page for unknown slugs
    pub fn render_not_found(&self, preview: bool) -> Result<String> {
        let context = self.create_base_context(&self.i18n.get("not_found"), preview);
        self.renderer.render("not_found.html", &context)
    }
}

/// Write a page below the public directory, creating parent directories
pub fn write_page(public_dir: &Path, relative: &str, content: &str) -> Result<()> {
    let output_path = public_dir.join(relative.trim_start_matches('/'));
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, content)?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}
