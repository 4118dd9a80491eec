//! folio: a blog content pipeline
//!
//! Discovers markdown content, derives slugs and draft flags, orders posts
//! into a linked publication chain and writes page data, an RSS feed and a
//! sitemap for a static front end.

pub mod commands;
pub mod config;
pub mod content;
pub mod feed;
pub mod generator;
pub mod helpers;
pub mod highlight;
pub mod orphans;
pub mod sequence;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::SourceGroup;

/// The main folio application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create an instance with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// Directory holding a source group, if the group is configured
    pub fn source_dir(&self, group: SourceGroup) -> Option<PathBuf> {
        self.config
            .sources
            .get(&group)
            .map(|dir| self.base_dir.join(dir))
    }

    /// Build the site
    pub fn build(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post or draft
    pub fn new_post(&self, title: &str, draft: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.public_dir, dir.path().join("public"));
        assert_eq!(
            folio.source_dir(SourceGroup::Drafts),
            Some(dir.path().join("src/drafts"))
        );
    }

    #[test]
    fn test_new_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "public_dir: dist\nsources:\n  posts: content/posts\n",
        )
        .unwrap();

        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.public_dir, dir.path().join("dist"));
        assert_eq!(
            folio.source_dir(SourceGroup::Posts),
            Some(dir.path().join("content/posts"))
        );
        assert_eq!(folio.source_dir(SourceGroup::Pages), None);
    }
}
