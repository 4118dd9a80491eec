//! Plain-text helpers for excerpts and reading time

use pulldown_cmark::{Event, Options, Parser, TagEnd};

/// Plain text of a markdown body, with entities already decoded.
///
/// Block boundaries and line breaks become spaces; raw HTML is dropped.
pub fn markdown_to_text(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_SMART_PUNCTUATION;
    let mut text = String::with_capacity(markdown.len());

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }

    text
}

/// Count words in plain text, treating each CJK ideograph as a word
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
            count += 1;
            in_word = false;
        } else if c.is_alphanumeric() {
            if !in_word {
                in_word = true;
                count += 1;
            }
        } else if c != '\'' && c != '\u{2019}' {
            in_word = false;
        }
    }

    count
}

/// Prune text to at most `max_chars` characters on a word boundary.
///
/// Whitespace is collapsed; an ellipsis is appended when text was cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut out = String::new();
    let mut len = 0;
    for word in words {
        let word_len = word.chars().count();
        let sep = usize::from(!out.is_empty());
        if len + sep + word_len > max_chars {
            break;
        }
        if sep == 1 {
            out.push(' ');
        }
        out.push_str(word);
        len += sep + word_len;
    }

    // A single word longer than the limit is cut mid-word
    if out.is_empty() {
        out = collapsed.chars().take(max_chars).collect();
    }
    out.push('…');
    out
}
