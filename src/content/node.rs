//! Content node model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The logical collection a content file was discovered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceGroup {
    Posts,
    Drafts,
    Pages,
}

impl SourceGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceGroup::Posts => "posts",
            SourceGroup::Drafts => "drafts",
            SourceGroup::Pages => "pages",
        }
    }
}

impl fmt::Display for SourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a content node: `<group>/<raw_path>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(group: SourceGroup, raw_path: &str) -> Self {
        Self(format!("{}/{}", group, raw_path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated front-matter of a content file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub date: DateTime<Utc>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

/// Estimated reading time of a rendered body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: usize,
}

impl ReadingTime {
    /// Average reading speed used for the estimate
    pub const WORDS_PER_MINUTE: usize = 200;

    pub fn from_words(words: usize) -> Self {
        let minutes = words.div_ceil(Self::WORDS_PER_MINUTE).max(1);
        Self { words, minutes }
    }

    /// Human readable label, e.g. "3 min read"
    pub fn text(&self) -> String {
        format!("{} min read", self.minutes)
    }
}

/// Fields derived by the annotator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFields {
    /// Route path, always `/`-delimited on both ends
    pub slug: String,
    pub is_draft: bool,
}

/// One parsed content file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: NodeId,
    pub source_group: SourceGroup,
    /// Path relative to the group's source root, `/`-separated
    pub raw_path: String,
    pub frontmatter: Metadata,
    /// Rendered HTML body
    pub body: String,
    /// Plain-text excerpt of the body
    pub excerpt: String,
    pub reading_time: ReadingTime,
    /// Set only for routable nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<NodeFields>,
}

impl ContentNode {
    pub fn slug(&self) -> Option<&str> {
        self.fields.as_ref().map(|f| f.slug.as_str())
    }

    pub fn is_draft(&self) -> bool {
        self.fields.as_ref().is_some_and(|f| f.is_draft)
    }

    pub fn is_routable(&self) -> bool {
        self.fields.is_some()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::NaiveDate;

    /// Build an annotated node dated at midnight UTC
    pub fn node(name: &str, date: &str, is_draft: bool) -> ContentNode {
        let group = if is_draft {
            SourceGroup::Drafts
        } else {
            SourceGroup::Posts
        };
        let raw_path = format!("{}.mdx", name);
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        ContentNode {
            id: NodeId::new(group, &raw_path),
            source_group: group,
            raw_path,
            frontmatter: Metadata {
                title: format!("Title of {}", name),
                date,
                summary: None,
                tags: Vec::new(),
            },
            body: format!("<p>{}</p>", name),
            excerpt: name.to_string(),
            reading_time: ReadingTime::from_words(1),
            fields: Some(NodeFields {
                slug: format!("/{}/", name),
                is_draft,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_format() {
        let id = NodeId::new(SourceGroup::Drafts, "wip/index.mdx");
        assert_eq!(id.as_str(), "drafts/wip/index.mdx");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(ReadingTime::from_words(0).minutes, 1);
        assert_eq!(ReadingTime::from_words(200).minutes, 1);
        assert_eq!(ReadingTime::from_words(201).minutes, 2);
        assert_eq!(ReadingTime::from_words(950).text(), "5 min read");
    }

    #[test]
    fn test_group_serde_names() {
        let group: SourceGroup = serde_yaml::from_str("drafts").unwrap();
        assert_eq!(group, SourceGroup::Drafts);
        assert_eq!(SourceGroup::Pages.to_string(), "pages");
    }
}
