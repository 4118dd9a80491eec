//! Generator module - turns content nodes into page requests and site data

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::{Annotator, ContentNode, NodeId, RecognizedGroups};
use crate::feed::{escape_xml, feed_items, FeedWriter};
use crate::helpers::full_url_for;
use crate::orphans::fix_orphans_text;
use crate::sequence::{sequence, PageRequest, Publication};
use crate::Folio;

/// Route of the internal drafts listing; no content may claim it
pub const DRAFTS_LISTING_PATH: &str = "/drafts/";

/// Link to a neighbouring post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub title: String,
    pub slug: String,
}

/// Everything a page template needs for one request
#[derive(Debug, Clone, Serialize)]
pub struct PageData<'a> {
    pub path: &'a str,
    pub template_id: &'a str,
    pub content_id: &'a NodeId,
    pub title: String,
    pub summary: Option<String>,
    pub date: String,
    pub tags: &'a [String],
    pub reading_time: String,
    pub excerpt: &'a str,
    pub body: &'a str,
    pub is_draft: bool,
    pub previous: Option<NavLink>,
    pub next: Option<NavLink>,
}

/// Internal listing of drafts
#[derive(Debug, Clone, Serialize)]
struct DraftListing {
    no_index: bool,
    drafts: Vec<NavLink>,
}

/// Counts reported after a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub published: usize,
    pub drafts: usize,
    /// Nodes left unrouted (pages, or malformed paths)
    pub unrouted: usize,
}

/// Static site generator
pub struct Generator {
    folio: Folio,
    annotator: Annotator,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Self {
        let recognized = RecognizedGroups::new(folio.config.content.recognized.iter().copied());
        Self {
            folio: folio.clone(),
            annotator: Annotator::new(recognized),
        }
    }

    /// Annotate, sort and sequence nodes.
    ///
    /// Returns the routable nodes sorted by date (newest first) together with
    /// their publication sequence.
    pub fn plan(&self, nodes: Vec<ContentNode>) -> Result<(Vec<ContentNode>, Publication, usize)> {
        let annotated = self.annotator.annotate_all(nodes);
        let total = annotated.len();

        let mut routable: Vec<ContentNode> =
            annotated.into_iter().filter(|n| n.is_routable()).collect();
        let unrouted = total - routable.len();

        // Stable, so equal dates keep discovery order
        routable.sort_by(|a, b| b.frontmatter.date.cmp(&a.frontmatter.date));

        let publication = sequence(&routable).context("Failed to sequence content")?;
        if let Some(entry) = publication
            .entries()
            .find(|e| e.slug == DRAFTS_LISTING_PATH)
        {
            anyhow::bail!(
                "Content {} claims {}, which is reserved for the drafts listing",
                entry.node_id,
                DRAFTS_LISTING_PATH
            );
        }
        Ok((routable, publication, unrouted))
    }

    /// Generate the entire site
    pub fn generate(&self, nodes: Vec<ContentNode>) -> Result<BuildSummary> {
        let public_dir = &self.folio.public_dir;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("Failed to create {:?}", public_dir))?;

        let (routable, publication, unrouted) = self.plan(nodes)?;
        let by_id: HashMap<&NodeId, &ContentNode> = routable.iter().map(|n| (&n.id, n)).collect();

        let requests = publication.page_requests(&self.folio.config.content.post_template);
        write_json(&public_dir.join("routes.json"), &requests)?;
        tracing::info!("Generated routes.json ({} pages)", requests.len());

        self.generate_pages(&requests, &by_id)?;
        self.generate_draft_listing(&publication, &by_id)?;

        let published: Vec<&ContentNode> = publication
            .published
            .iter()
            .filter_map(|e| by_id.get(&e.node_id).copied())
            .collect();

        if self.folio.config.feed.enable {
            self.generate_feed(&published)?;
        }
        if self.folio.config.sitemap {
            self.generate_sitemap(&published)?;
        }

        Ok(BuildSummary {
            published: publication.published.len(),
            drafts: publication.drafts.len(),
            unrouted,
        })
    }

    /// Write one page-data.json per request
    fn generate_pages(
        &self,
        requests: &[PageRequest],
        by_id: &HashMap<&NodeId, &ContentNode>,
    ) -> Result<()> {
        let nav = |id: &Option<NodeId>| {
            id.as_ref().and_then(|id| by_id.get(id)).map(|n| nav_link(n))
        };

        for request in requests {
            let node = by_id
                .get(&request.context.content_id)
                .with_context(|| format!("No content for {}", request.context.content_id))?;

            let data = PageData {
                path: &request.path,
                template_id: &request.template_id,
                content_id: &node.id,
                title: fix_orphans_text(&node.frontmatter.title),
                summary: node.frontmatter.summary.as_deref().map(fix_orphans_text),
                date: node.frontmatter.date.format("%Y-%m-%d").to_string(),
                tags: &node.frontmatter.tags,
                reading_time: node.reading_time.text(),
                excerpt: &node.excerpt,
                body: &node.body,
                is_draft: node.is_draft(),
                previous: nav(&request.context.previous_id),
                next: nav(&request.context.next_id),
            };

            let output_path = self
                .folio
                .public_dir
                .join(request.path.trim_matches('/'))
                .join("page-data.json");
            write_json(&output_path, &data)?;
            tracing::debug!("Generated page: {:?}", output_path);
        }

        Ok(())
    }

    /// Write the internal drafts listing
    fn generate_draft_listing(
        &self,
        publication: &Publication,
        by_id: &HashMap<&NodeId, &ContentNode>,
    ) -> Result<()> {
        let listing = DraftListing {
            no_index: true,
            drafts: publication
                .drafts
                .iter()
                .filter_map(|e| by_id.get(&e.node_id))
                .map(|n| nav_link(n))
                .collect(),
        };

        let output_path = self
            .folio
            .public_dir
            .join(DRAFTS_LISTING_PATH.trim_matches('/'))
            .join("page-data.json");
        write_json(&output_path, &listing)?;
        tracing::info!("Generated drafts listing ({} drafts)", listing.drafts.len());
        Ok(())
    }

    /// Generate RSS feed
    fn generate_feed(&self, published: &[&ContentNode]) -> Result<()> {
        let config = &self.folio.config;
        let items = feed_items(config, published.iter().copied());
        let xml = FeedWriter::new(config).render(&items, Utc::now());

        let output_path = self.folio.public_dir.join(config.feed.path.trim_start_matches('/'));
        write_file(&output_path, xml)?;
        tracing::info!("Generated {}", config.feed.path);
        Ok(())
    }

    /// Generate sitemap.xml for published content
    fn generate_sitemap(&self, published: &[&ContentNode]) -> Result<()> {
        let config = &self.folio.config;
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');
        xml.push_str(&format!(
            "  <url><loc>{}</loc></url>\n",
            escape_xml(&full_url_for(config, "/"))
        ));
        for node in published {
            if let Some(slug) = node.slug() {
                xml.push_str(&format!(
                    "  <url><loc>{}</loc><lastmod>{}</lastmod></url>\n",
                    escape_xml(&full_url_for(config, slug)),
                    node.frontmatter.date.format("%Y-%m-%d")
                ));
            }
        }
        xml.push_str("</urlset>\n");

        write_file(&self.folio.public_dir.join("sitemap.xml"), xml)?;
        tracing::info!("Generated sitemap.xml");
        Ok(())
    }
}

fn nav_link(node: &ContentNode) -> NavLink {
    NavLink {
        title: node.frontmatter.title.clone(),
        slug: node.slug().unwrap_or_default().to_string(),
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, json)
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, contents).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::test_support::node;
    use crate::content::SourceGroup;

    fn unannotated(name: &str, date: &str, group: SourceGroup) -> ContentNode {
        let mut n = node(name, date, group == SourceGroup::Drafts);
        n.source_group = group;
        n.id = NodeId::new(group, &n.raw_path);
        n.fields = None;
        n
    }

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_plan_sorts_and_filters() {
        let folio = Folio::with_config("/tmp/unused", SiteConfig::default());
        let generator = Generator::new(&folio);
        let nodes = vec![
            unannotated("older", "2024-01-01", SourceGroup::Posts),
            unannotated("about", "2024-05-01", SourceGroup::Pages),
            unannotated("newer", "2024-03-01", SourceGroup::Posts),
            unannotated("wip", "2024-02-01", SourceGroup::Drafts),
        ];

        let (routable, publication, unrouted) = generator.plan(nodes).unwrap();

        assert_eq!(unrouted, 1);
        let slugs: Vec<_> = routable.iter().filter_map(|n| n.slug()).collect();
        assert_eq!(slugs, vec!["/newer/", "/wip/", "/older/"]);
        assert!(publication.entries().all(|e| e.slug != "/about/"));
        assert_eq!(publication.published[0].slug, "/newer/");
        assert_eq!(
            publication.published[0].previous_id.as_ref().map(|i| i.as_str()),
            Some("posts/older.mdx")
        );
    }

    #[test]
    fn test_generate_writes_site_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig {
            url: "https://example.com".to_string(),
            ..SiteConfig::default()
        };
        let folio = Folio::with_config(dir.path(), config);
        let mut newer = unannotated("newer", "2024-03-01", SourceGroup::Posts);
        newer.frontmatter.title = "A title worth reading".to_string();
        let nodes = vec![
            unannotated("older", "2024-01-01", SourceGroup::Posts),
            newer,
            unannotated("wip", "2024-02-01", SourceGroup::Drafts),
            unannotated("about", "2024-05-01", SourceGroup::Pages),
        ];

        let summary = Generator::new(&folio).generate(nodes).unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                published: 2,
                drafts: 1,
                unrouted: 1
            }
        );

        let public = &folio.public_dir;
        let routes = read_json(&public.join("routes.json"));
        assert_eq!(routes.as_array().unwrap().len(), 3);

        let newer = read_json(&public.join("newer/page-data.json"));
        assert_eq!(newer["title"], "A title worth\u{00A0}reading");
        assert_eq!(newer["previous"]["slug"], "/older/");
        assert!(newer["next"].is_null());

        let wip = read_json(&public.join("wip/page-data.json"));
        assert_eq!(wip["is_draft"], true);
        assert!(wip["previous"].is_null());
        assert!(wip["next"].is_null());

        let drafts = read_json(&public.join("drafts/page-data.json"));
        assert_eq!(drafts["drafts"][0]["slug"], "/wip/");

        assert!(!public.join("about").exists());

        let rss = fs::read_to_string(public.join("rss.xml")).unwrap();
        assert_eq!(rss.matches("<item>").count(), 2);
        assert!(!rss.contains("/wip/"));

        let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://example.com/newer/</loc>"));
        assert!(!sitemap.contains("/wip/"));
    }

    #[test]
    fn test_drafts_listing_route_is_reserved() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let nodes = vec![
            unannotated("drafts", "2024-03-01", SourceGroup::Posts),
            unannotated("other", "2024-02-01", SourceGroup::Posts),
        ];

        let err = Generator::new(&folio).generate(nodes).unwrap_err();
        assert!(err.to_string().contains("posts/drafts.mdx"));
        assert!(!folio.public_dir.join("drafts/page-data.json").exists());
    }

    #[test]
    fn test_sitemap_escapes_locations() {
        let dir = tempfile::tempdir().unwrap();
        let folio = Folio::with_config(dir.path(), SiteConfig::default());
        let nodes = vec![unannotated("tom&jerry", "2024-03-01", SourceGroup::Posts)];

        Generator::new(&folio).generate(nodes).unwrap();

        let sitemap = fs::read_to_string(folio.public_dir.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>http://localhost/tom&amp;jerry/</loc>"));
        assert!(!sitemap.contains("tom&jerry"));
    }
}
