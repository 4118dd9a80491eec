//! RSS feed of published content

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::ContentNode;
use crate::helpers::full_url_for;

/// One syndication entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub url: String,
    pub guid: String,
    pub rendered_body: String,
}

/// Map published nodes to feed items, preserving input order.
///
/// Drafts and nodes without a slug have no public URL and are left out.
pub fn feed_items<'a>(
    config: &SiteConfig,
    nodes: impl IntoIterator<Item = &'a ContentNode>,
) -> Vec<FeedItem> {
    nodes
        .into_iter()
        .filter(|node| !node.is_draft())
        .filter_map(|node| {
            let url = full_url_for(config, node.slug()?);
            Some(FeedItem {
                title: node.frontmatter.title.clone(),
                description: node
                    .frontmatter
                    .summary
                    .clone()
                    .unwrap_or_else(|| node.excerpt.clone()),
                date: node.frontmatter.date,
                guid: url.clone(),
                url,
                rendered_body: node.body.clone(),
            })
        })
        .collect()
}

/// Renders feed items as an RSS 2.0 document
pub struct FeedWriter<'a> {
    config: &'a SiteConfig,
}

impl<'a> FeedWriter<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Render the channel; `built_at` becomes `lastBuildDate`
    pub fn render(&self, items: &[FeedItem], built_at: DateTime<Utc>) -> String {
        let base_url = self.config.base_url();
        let items = match self.config.feed.limit {
            Some(limit) => &items[..items.len().min(limit)],
            None => items,
        };

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:atom="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str("  <channel>\n");
        feed.push_str(&format!(
            "    <title>{}</title>\n",
            escape_xml(&self.config.title)
        ));
        feed.push_str(&format!(
            "    <description>{}</description>\n",
            escape_xml(&self.config.description)
        ));
        feed.push_str(&format!("    <link>{}/</link>\n", escape_xml(base_url)));
        feed.push_str(&format!(
            "    <atom:link href=\"{}/{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
            escape_xml(base_url),
            escape_xml(self.config.feed.path.trim_start_matches('/'))
        ));
        feed.push_str("    <generator>folio</generator>\n");
        feed.push_str(&format!(
            "    <lastBuildDate>{}</lastBuildDate>\n",
            built_at.to_rfc2822()
        ));

        for item in items {
            feed.push_str("    <item>\n");
            feed.push_str(&format!("      <title>{}</title>\n", escape_xml(&item.title)));
            feed.push_str(&format!(
                "      <description>{}</description>\n",
                escape_xml(&item.description)
            ));
            feed.push_str(&format!("      <link>{}</link>\n", escape_xml(&item.url)));
            feed.push_str(&format!(
                "      <guid isPermaLink=\"true\">{}</guid>\n",
                escape_xml(&item.guid)
            ));
            feed.push_str(&format!(
                "      <pubDate>{}</pubDate>\n",
                item.date.to_rfc2822()
            ));
            let content = convert_relative_urls_to_absolute(&item.rendered_body, base_url);
            feed.push_str(&format!(
                "      <content:encoded>{}</content:encoded>\n",
                cdata(&strip_invalid_xml_chars(&content))
            ));
            feed.push_str("    </item>\n");
        }

        feed.push_str("  </channel>\n");
        feed.push_str("</rss>\n");
        feed
    }
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap in CDATA, splitting any `]]>` that would end the section early
fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

/// Convert root-relative `href`/`src` attributes to absolute URLs
fn convert_relative_urls_to_absolute(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip invalid XML control characters (except tab, newline, carriage return)
/// XML 1.0 only allows: #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::node;
    use chrono::TimeZone;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "souporserious".to_string(),
            description: "All things design & development.".to_string(),
            url: "https://www.souporserious.us".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_feed_items() {
        let mut first = node("one", "2024-03-01", false);
        first.frontmatter.summary = Some("A summary".to_string());
        let second = node("two", "2024-02-01", false);
        let draft = node("wip", "2024-02-15", true);
        let mut page = node("about", "2024-01-01", false);
        page.fields = None;

        let items = feed_items(&config(), [&first, &draft, &second, &page]);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Title of one");
        assert_eq!(items[0].description, "A summary");
        assert_eq!(items[0].url, "https://www.souporserious.us/one/");
        assert_eq!(items[0].guid, items[0].url);
        assert_eq!(items[0].rendered_body, "<p>one</p>");
        // Excerpt is the fallback description
        assert_eq!(items[1].description, "two");
        assert!(items[0].date > items[1].date);
    }

    #[test]
    fn test_render_rss() {
        let config = config();
        let mut post = node("one", "2024-03-11", false);
        post.body = r#"<p>See <a href="/two/">two</a> ]]> done</p>"#.to_string();
        let items = feed_items(&config, [&post]);
        let built_at = Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap();

        let xml = FeedWriter::new(&config).render(&items, built_at);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<description>All things design &amp; development.</description>"));
        assert!(xml.contains(r#"<atom:link href="https://www.souporserious.us/rss.xml""#));
        assert!(xml.contains("<lastBuildDate>Tue, 12 Mar 2024 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains("<guid isPermaLink=\"true\">https://www.souporserious.us/one/</guid>"));
        assert!(xml.contains("<pubDate>Mon, 11 Mar 2024 00:00:00 +0000</pubDate>"));
        assert!(xml.contains(r#"href="https://www.souporserious.us/two/""#));
        assert!(xml.contains("]]]]><![CDATA[>"));
    }

    #[test]
    fn test_description_escaped_once() {
        let mut post = node("one", "2024-03-11", false);
        post.excerpt = "Tom & Jerry".to_string();
        let items = feed_items(&config(), [&post]);

        let xml = FeedWriter::new(&config()).render(&items, Utc::now());
        assert!(xml.contains("<description>Tom &amp; Jerry</description>"));
        assert!(!xml.contains("&amp;amp;"));
    }

    #[test]
    fn test_feed_limit() {
        let mut config = config();
        config.feed.limit = Some(1);
        let nodes = [node("one", "2024-03-01", false), node("two", "2024-02-01", false)];
        let items = feed_items(&config, nodes.iter());

        let xml = FeedWriter::new(&config).render(&items, Utc::now());
        assert_eq!(xml.matches("<item>").count(), 1);
    }

    #[test]
    fn test_strip_invalid_xml_chars() {
        assert_eq!(strip_invalid_xml_chars("a\u{0008}b\nc"), "ab\nc");
    }
}
