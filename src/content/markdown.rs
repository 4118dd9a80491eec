//! Markdown rendering with syntax highlighting

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::sync::Arc;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::highlight::LineHighlighter;
use crate::orphans::{fix_orphans, TextTree};

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

/// Block currently being buffered
enum Pending<'a> {
    Code {
        info: String,
        code: String,
    },
    Paragraph(Vec<Event<'a>>),
    Heading {
        level: HeadingLevel,
        id: Option<String>,
        events: Vec<Event<'a>>,
    },
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a named syntect theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is stripped beforehand by FrontMatter::parse()
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut pending: Option<Pending> = None;

        for event in parser {
            pending = match pending.take() {
                None => start_block(event, &mut events),
                Some(block) => self.continue_block(block, event, &mut events)?,
            };
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Feed one event to a buffered block, flushing it when the block ends
    fn continue_block<'a>(
        &self,
        block: Pending<'a>,
        event: Event<'a>,
        events: &mut Vec<Event<'a>>,
    ) -> Result<Option<Pending<'a>>> {
        match (block, event) {
            (Pending::Code { info, mut code }, Event::Text(text)) => {
                code.push_str(&text);
                Ok(Some(Pending::Code { info, code }))
            }
            (Pending::Code { info, code }, Event::End(TagEnd::CodeBlock)) => {
                let html = self.highlight_code(code.trim(), &info)?;
                events.push(Event::Html(CowStr::from(html)));
                Ok(None)
            }
            (block @ Pending::Code { .. }, _) => Ok(Some(block)),

            (Pending::Paragraph(inline), Event::End(TagEnd::Paragraph)) => {
                let (tree, fragments) = inline_tree(inline);
                events.push(Event::Start(Tag::Paragraph));
                replay(&fix_orphans(&tree), fragments, events);
                events.push(Event::End(TagEnd::Paragraph));
                Ok(None)
            }
            (Pending::Paragraph(mut inline), event) => {
                inline.push(event);
                Ok(Some(Pending::Paragraph(inline)))
            }

            (Pending::Heading { level, id, events: inner }, Event::End(TagEnd::Heading(_))) => {
                let anchor = id.unwrap_or_else(|| slug::slugify(plain_text_of(&inner)));
                let anchor = html_escape(&anchor);
                // Inner events go through the main writer so footnote numbers stay shared
                events.push(Event::Html(CowStr::from(format!(
                    "<{tag} id=\"{id}\"><a href=\"#{id}\">",
                    tag = level,
                    id = anchor
                ))));
                events.extend(inner);
                events.push(Event::Html(CowStr::from(format!("</a></{}>\n", level))));
                Ok(None)
            }
            (Pending::Heading { level, id, events: mut inner }, event) => {
                inner.push(event);
                Ok(Some(Pending::Heading { level, id, events: inner }))
            }
        }
    }

    fn theme(&self) -> Result<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
            .ok_or_else(|| anyhow!("No syntax highlighting themes available"))
    }

    /// Highlight a code block, emphasising lines selected by the fence metadata
    fn highlight_code(&self, code: &str, info: &str) -> Result<String> {
        let (lang, meta) = split_info(info);
        let highlighter = LineHighlighter::parse(meta);
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut lines = HighlightLines::new(syntax, self.theme()?);

        let mut out = format!(
            r#"<pre class="language-{}"><code>"#,
            html_escape(lang)
        );
        for (index, line) in LinesWithEndings::from(code).enumerate() {
            let rendered = lines
                .highlight_line(line, &self.syntax_set)
                .and_then(|regions| styled_line_to_highlighted_html(&regions, IncludeBackground::No))
                .unwrap_or_else(|_| html_escape(line));
            let class = if highlighter.is_highlighted(index) {
                "line highlight-line"
            } else {
                "line"
            };
            out.push_str(&format!(r#"<span class="{}">{}</span>"#, class, rendered));
        }
        out.push_str("</code></pre>\n");

        Ok(out)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Begin buffering blocks that need post-processing, pass everything else through
fn start_block<'a>(event: Event<'a>, events: &mut Vec<Event<'a>>) -> Option<Pending<'a>> {
    match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            let info = match kind {
                CodeBlockKind::Fenced(info) => info.to_string(),
                CodeBlockKind::Indented => String::new(),
            };
            Some(Pending::Code {
                info,
                code: String::new(),
            })
        }
        Event::Start(Tag::Paragraph) => Some(Pending::Paragraph(Vec::new())),
        Event::Start(Tag::Heading { level, id, .. })
            if matches!(level, HeadingLevel::H2 | HeadingLevel::H3 | HeadingLevel::H4) =>
        {
            Some(Pending::Heading {
                level,
                id: id.map(|s| s.to_string()),
                events: Vec::new(),
            })
        }
        event => {
            events.push(event);
            None
        }
    }
}

/// Split a fence info string into language and free-form metadata
fn split_info(info: &str) -> (Option<&str>, Option<&str>) {
    let info = info.trim();
    let end = info
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(info.len());
    let lang = Some(&info[..end]).filter(|l| !l.is_empty());
    let meta = Some(info[end..].trim()).filter(|m| !m.is_empty());
    (lang, meta)
}

/// Group paragraph events into a tree of text leaves and opaque elements.
///
/// The returned fragments run parallel to the tree's children and hold the
/// original events of each element; text leaves have an empty fragment.
fn inline_tree(events: Vec<Event<'_>>) -> (Arc<TextTree>, Vec<Vec<Event<'_>>>) {
    let mut children = Vec::new();
    let mut fragments = Vec::new();
    let mut text = String::new();
    let mut element: Vec<Event> = Vec::new();
    let mut depth = 0usize;

    let flush_text = |text: &mut String,
                      children: &mut Vec<Arc<TextTree>>,
                      fragments: &mut Vec<Vec<Event>>| {
        if !text.is_empty() {
            children.push(TextTree::text(std::mem::take(text)));
            fragments.push(Vec::new());
        }
    };

    for event in events {
        match event {
            Event::Text(t) if depth == 0 => text.push_str(&t),
            Event::Start(_) => {
                if depth == 0 {
                    flush_text(&mut text, &mut children, &mut fragments);
                }
                depth += 1;
                element.push(event);
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                element.push(event);
                if depth == 0 {
                    children.push(TextTree::element(plain_text_of(&element)));
                    fragments.push(std::mem::take(&mut element));
                }
            }
            event if depth > 0 => element.push(event),
            event => {
                flush_text(&mut text, &mut children, &mut fragments);
                children.push(TextTree::element(plain_text_of(std::slice::from_ref(&event))));
                fragments.push(vec![event]);
            }
        }
    }
    flush_text(&mut text, &mut children, &mut fragments);

    (TextTree::nodes(children), fragments)
}

/// Emit a fixed paragraph tree back as events, restoring elements from their fragments
fn replay<'a>(tree: &TextTree, fragments: Vec<Vec<Event<'a>>>, events: &mut Vec<Event<'a>>) {
    let TextTree::Nodes(children) = tree else {
        return;
    };
    for (child, fragment) in children.iter().zip(fragments) {
        match child.as_ref() {
            TextTree::Text(s) => events.push(Event::Text(CowStr::from(s.clone()))),
            _ => events.extend(fragment),
        }
    }
}

fn plain_text_of(events: &[Event<'_>]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Text(t) | Event::Code(t) => Some(t.as_ref()),
            _ => None,
        })
        .collect()
}

/// Simple HTML escaping
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
