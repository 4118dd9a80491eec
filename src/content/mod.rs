//! Content module - discovery, front-matter, rendering and annotation

pub mod annotate;
mod frontmatter;
pub mod loader;
mod markdown;
mod node;
pub mod text;

pub use annotate::{AnnotateError, Annotator, RecognizedGroups};
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::MarkdownRenderer;
pub use node::{ContentNode, Metadata, NodeFields, NodeId, ReadingTime, SourceGroup};

#[cfg(test)]
pub(crate) use node::test_support;
