//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::content::SourceGroup;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,

    // Directory
    pub public_dir: String,
    /// Source directory for each content group, relative to the site root
    pub sources: BTreeMap<SourceGroup, String>,

    // Writing
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Syndication
    #[serde(default)]
    pub feed: FeedConfig,
    pub sitemap: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(SourceGroup::Pages, "src/pages".to_string());
        sources.insert(SourceGroup::Posts, "src/posts".to_string());
        sources.insert(SourceGroup::Drafts, "src/drafts".to_string());

        Self {
            title: "folio".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://localhost".to_string(),

            public_dir: "public".to_string(),
            sources,

            content: ContentConfig::default(),
            highlight: HighlightConfig::default(),

            feed: FeedConfig::default(),
            sitemap: true,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Site base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

/// Content annotation and excerpt settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Groups whose nodes receive a slug; everything else stays unrouted
    pub recognized: Vec<SourceGroup>,
    /// Excerpt length in characters
    pub excerpt_length: usize,
    /// Template id attached to every page request
    pub post_template: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            recognized: vec![SourceGroup::Posts, SourceGroup::Drafts],
            excerpt_length: 140,
            post_template: "post".to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// RSS feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enable: bool,
    /// Output path relative to the public directory
    pub path: String,
    /// Maximum number of items, all published posts when unset
    pub limit: Option<usize>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "rss.xml".to_string(),
            limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.content.excerpt_length, 140);
        assert_eq!(
            config.content.recognized,
            vec![SourceGroup::Posts, SourceGroup::Drafts]
        );
        assert_eq!(config.sources[&SourceGroup::Posts], "src/posts");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: souporserious
url: https://www.souporserious.us/
sources:
  posts: content/posts
content:
  recognized: [posts]
feed:
  limit: 20
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "souporserious");
        assert_eq!(config.base_url(), "https://www.souporserious.us");
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[&SourceGroup::Posts], "content/posts");
        assert_eq!(config.content.recognized, vec![SourceGroup::Posts]);
        assert_eq!(config.content.excerpt_length, 140);
        assert_eq!(config.feed.limit, Some(20));
        assert_eq!(config.feed.path, "rss.xml");
    }

    #[test]
    fn test_unknown_group_rejected() {
        let yaml = "content:\n  recognized: [notes]\n";
        assert!(serde_yaml::from_str::<SiteConfig>(yaml).is_err());
    }
}
