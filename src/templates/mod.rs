//! Built-in theme rendered with the Tera template engine
//!
//! Templates are embedded in the binary; HTML autoescaping stays on and
//! only pre-rendered rich text and the comments widget are marked safe.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;

/// Stylesheet shared by every page
pub const STYLESHEET: &str = include_str!("theme/styles.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

/// A post in the listing; also the JSON shape of load-more results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCard {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub date_iso: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub date_iso: Option<String>,
    /// Edit marker, present only for posts changed after publication
    pub edited: Option<String>,
    pub reading_time: String,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub blocks: Vec<BlockData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub index: usize,
    pub heading: String,
    pub html: String,
}
