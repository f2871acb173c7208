//! spacetraveling: a blog front-end rendered from a headless content API
//!
//! Posts live in a Prismic repository. This crate queries it, maps the
//! documents to strict types and renders them with embedded Tera templates,
//! either into a static `public/` directory or from an HTTP server that
//! generates pages lazily and revalidates them periodically.

pub mod cache;
pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod prismic;
pub mod richtext;
pub mod server;
pub mod site;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
        })
    }

    /// HTTP client for the configured content API
    pub fn client(&self) -> Result<prismic::PrismicClient> {
        prismic::PrismicClient::new(&self.config)
    }

    /// Page renderer, with label overrides from `languages/` applied
    pub fn generator(&self) -> anyhow::Result<generator::Generator> {
        let mut i18n = i18n::I18n::new(&self.config.language);
        i18n.load_languages(self.base_dir.join("languages"))?;
        Ok(generator::Generator::with_i18n(&self.config, i18n)?)
    }

    /// Clean the public directory
    pub fn clean(&self) -> anyhow::Result<()> {
        commands::clean::run(self)
    }
}
