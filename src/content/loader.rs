//! Content loader - discovers content files per source group

use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::text::{count_words, excerpt, markdown_to_text};
use super::{ContentNode, FrontMatter, MarkdownRenderer, NodeId, ReadingTime, SourceGroup};
use crate::Folio;

/// Loads content nodes from the configured source directories
pub struct ContentLoader<'a> {
    folio: &'a Folio,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(folio: &'a Folio) -> Self {
        let renderer = MarkdownRenderer::with_theme(&folio.config.highlight.theme);
        Self { folio, renderer }
    }

    /// Load every configured group. Nodes are returned unannotated.
    pub fn load_all(&self) -> Result<Vec<ContentNode>> {
        let mut nodes = Vec::new();
        for group in self.folio.config.sources.keys() {
            nodes.extend(self.load_group(*group)?);
        }
        Ok(nodes)
    }

    /// Load all content files of one group
    pub fn load_group(&self, group: SourceGroup) -> Result<Vec<ContentNode>> {
        let Some(root) = self.folio.source_dir(group) else {
            return Ok(Vec::new());
        };
        if !root.exists() {
            tracing::debug!("Source directory for {} not found: {:?}", group, root);
            return Ok(Vec::new());
        }

        let mut nodes = Vec::new();

        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_content_file(path) {
                match self.load_node(group, &root, path) {
                    Ok(node) => nodes.push(node),
                    Err(e) => {
                        tracing::warn!("Failed to load {:?}: {:#}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Loaded {} {} from {:?}", nodes.len(), group, root);
        Ok(nodes)
    }

    /// Load a single content file
    fn load_node(&self, group: SourceGroup, root: &Path, path: &Path) -> Result<ContentNode> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let (fm, body) = FrontMatter::parse(&content)?;
        let frontmatter = fm.into_metadata()?;

        let raw_path = relative_path(root, path);
        let body_html = self.renderer.render(body)?;
        let text = markdown_to_text(body);

        Ok(ContentNode {
            id: NodeId::new(group, &raw_path),
            source_group: group,
            raw_path,
            frontmatter,
            excerpt: excerpt(&text, self.folio.config.content.excerpt_length),
            reading_time: ReadingTime::from_words(count_words(&text)),
            body: body_html,
            fields: None,
        })
    }
}

/// Check if a file is a markdown file
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "md" | "mdx" | "markdown"))
        .unwrap_or(false)
}

/// `/`-separated path of `path` below `root`
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
