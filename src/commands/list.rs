//! List site content

use anyhow::Result;
use std::collections::HashMap;

use crate::content::loader::ContentLoader;
use crate::content::{ContentNode, SourceGroup};
use crate::generator::Generator;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(folio);

    match content_type {
        "post" | "posts" => print_group("Posts", &loader.load_group(SourceGroup::Posts)?),
        "draft" | "drafts" => print_group("Drafts", &loader.load_group(SourceGroup::Drafts)?),
        "page" | "pages" => {
            let pages = loader.load_group(SourceGroup::Pages)?;
            println!("Pages ({}):", pages.len());
            for page in pages {
                println!("  {} [{}]", page.frontmatter.title, page.id);
            }
        }
        "route" | "routes" => {
            let generator = Generator::new(folio);
            let (_, publication, _) = generator.plan(loader.load_all()?)?;
            let requests = publication.page_requests(&folio.config.content.post_template);
            println!("Routes ({}):", requests.len());
            for request in requests {
                println!("  {} -> {}", request.path, request.context.content_id);
            }
        }
        "tag" | "tags" => {
            let posts = loader.load_group(SourceGroup::Posts)?;
            println!("Tags:");
            for (tag, count) in tag_counts(&posts) {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, drafts, pages, routes, tags",
                content_type
            );
        }
    }

    Ok(())
}

fn print_group(label: &str, nodes: &[ContentNode]) {
    let mut nodes: Vec<_> = nodes.iter().collect();
    nodes.sort_by(|a, b| b.frontmatter.date.cmp(&a.frontmatter.date));

    println!("{} ({}):", label, nodes.len());
    for node in nodes {
        println!(
            "  {} - {} [{}]",
            node.frontmatter.date.format("%Y-%m-%d"),
            node.frontmatter.title,
            node.id
        );
    }
}

/// Tag usage, most used first, ties by name
fn tag_counts(nodes: &[ContentNode]) -> Vec<(String, usize)> {
    let mut tags: HashMap<&str, usize> = HashMap::new();
    for node in nodes {
        for tag in &node.frontmatter.tags {
            *tags.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<_> = tags
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags
}
