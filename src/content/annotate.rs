//! Content annotation - derives routable slugs and draft classification

use std::path::{Component, Path};
use thiserror::Error;

use super::{ContentNode, NodeFields, SourceGroup};

/// Errors produced while annotating a node
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnnotateError {
    #[error("Cannot derive a slug for {path:?}")]
    MissingSlug { path: String },
}

/// The set of source groups whose nodes are routable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedGroups(Vec<SourceGroup>);

impl RecognizedGroups {
    pub fn new(groups: impl IntoIterator<Item = SourceGroup>) -> Self {
        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort();
        groups.dedup();
        Self(groups)
    }

    pub fn contains(&self, group: SourceGroup) -> bool {
        self.0.contains(&group)
    }
}

impl Default for RecognizedGroups {
    fn default() -> Self {
        Self::new([SourceGroup::Posts, SourceGroup::Drafts])
    }
}

/// Attaches `slug` and `is_draft` to content nodes
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    recognized: RecognizedGroups,
}

impl Annotator {
    pub fn new(recognized: RecognizedGroups) -> Self {
        Self { recognized }
    }

    /// Derive the fields for a node from its group and path.
    ///
    /// Returns `Ok(None)` for nodes outside the recognized groups.
    pub fn fields_for(
        &self,
        group: SourceGroup,
        raw_path: &str,
    ) -> Result<Option<NodeFields>, AnnotateError> {
        if !self.recognized.contains(group) {
            return Ok(None);
        }

        let slug = derive_slug(raw_path)?;
        Ok(Some(NodeFields {
            slug,
            is_draft: group == SourceGroup::Drafts,
        }))
    }

    /// Annotate a node. Nodes that cannot be routed are returned unannotated.
    pub fn annotate(&self, mut node: ContentNode) -> ContentNode {
        match self.fields_for(node.source_group, &node.raw_path) {
            Ok(fields) => node.fields = fields,
            Err(e) => {
                tracing::warn!("Skipping route for {}: {}", node.id, e);
                node.fields = None;
            }
        }
        node
    }

    pub fn annotate_all(&self, nodes: Vec<ContentNode>) -> Vec<ContentNode> {
        nodes.into_iter().map(|n| self.annotate(n)).collect()
    }
}

/// Derive a `/a/b/` route from a path relative to its source root.
///
/// The extension is dropped and an `index` file is routed by its directory.
pub fn derive_slug(raw_path: &str) -> Result<String, AnnotateError> {
    let missing = || AnnotateError::MissingSlug {
        path: raw_path.to_string(),
    };

    let path = Path::new(raw_path);
    let mut segments: Vec<String> = path
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    if stem.is_empty() || stem.starts_with('.') {
        return Err(missing());
    }
    if stem != "index" {
        segments.push(stem);
    }

    segments.retain(|s| !s.trim().is_empty());
    if segments.is_empty() {
        return Err(missing());
    }

    Ok(format!("/{}/", segments.join("/")))
}
