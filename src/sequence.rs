//! Publication sequencing
//!
//! Turns the date-descending list of routable nodes into a chronological
//! chain of published entries plus an unlinked set of drafts, and from
//! those into page-creation requests.
//!
//! Index order is newest first, so `previous` (published earlier) is the
//! entry at `i + 1` and `next` (published later) is the entry at `i - 1`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::content::{ContentNode, NodeId};

/// Contract breaches detected while sequencing
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Invariant violation: content {id} has no slug and cannot be routed")]
    InvariantViolation { id: NodeId },

    #[error("Slug {slug} is claimed by both {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: NodeId,
        second: NodeId,
    },
}

/// One node's place in the publication sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationEntry {
    pub node_id: NodeId,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<NodeId>,
}

/// Data handed to the page template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub content_id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<NodeId>,
}

/// A request to materialise one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub path: String,
    pub template_id: String,
    pub context: PageContext,
}

/// Published chain and draft set, each in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publication {
    pub published: Vec<PublicationEntry>,
    pub drafts: Vec<PublicationEntry>,
}

impl Publication {
    /// All entries, published first
    pub fn entries(&self) -> impl Iterator<Item = &PublicationEntry> {
        self.published.iter().chain(self.drafts.iter())
    }

    /// One page request per entry
    pub fn page_requests(&self, template_id: &str) -> Vec<PageRequest> {
        self.entries()
            .map(|entry| PageRequest {
                path: entry.slug.clone(),
                template_id: template_id.to_string(),
                context: PageContext {
                    content_id: entry.node_id.clone(),
                    previous_id: entry.previous_id.clone(),
                    next_id: entry.next_id.clone(),
                },
            })
            .collect()
    }
}

/// Sequence nodes that are already sorted by publish date, newest first.
///
/// The input order is trusted as is; equal dates keep their relative order.
pub fn sequence(nodes: &[ContentNode]) -> Result<Publication, SequenceError> {
    let mut seen: HashMap<&str, &NodeId> = HashMap::new();
    let mut published = Vec::new();
    let mut drafts = Vec::new();

    for node in nodes {
        let fields = node
            .fields
            .as_ref()
            .ok_or_else(|| SequenceError::InvariantViolation {
                id: node.id.clone(),
            })?;

        if let Some(first) = seen.insert(fields.slug.as_str(), &node.id) {
            return Err(SequenceError::DuplicateSlug {
                slug: fields.slug.clone(),
                first: first.clone(),
                second: node.id.clone(),
            });
        }

        let entry = PublicationEntry {
            node_id: node.id.clone(),
            slug: fields.slug.clone(),
            previous_id: None,
            next_id: None,
        };
        if fields.is_draft {
            drafts.push(entry);
        } else {
            published.push(entry);
        }
    }

    let ids: Vec<NodeId> = published.iter().map(|e| e.node_id.clone()).collect();
    for (i, entry) in published.iter_mut().enumerate() {
        entry.previous_id = ids.get(i + 1).cloned();
        entry.next_id = i.checked_sub(1).map(|j| ids[j].clone());
    }

    Ok(Publication { published, drafts })
}
