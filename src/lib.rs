//! spacetraveling: a static blog generator fed by a headless CMS
//!
//! Posts are fetched from a Prismic-style content API and rendered with
//! embedded Tera templates. Generated pages are regenerated once their
//! revalidation window has passed.

pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pagination;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// The main site application
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Build manifest directory
    pub cache_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let cache_dir = base_dir.join(&config.cache_dir);
        Self {
            config,
            base_dir,
            public_dir,
            cache_dir,
        }
    }

    /// Build a content client for this site
    pub fn client(&self) -> Result<client::PrismicClient> {
        Ok(client::PrismicClient::new(&self.config)?)
    }

    /// Generate the static site
    pub async fn generate(&self, force: bool) -> Result<()> {
        commands::generate::run(self, force).await
    }

    /// Clean the public directory and manifest
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
