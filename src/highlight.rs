//! Highlighted line ranges for code blocks
//!
//! Code fence metadata may carry a compact range list, e.g.
//! `ts {2,5-7} filename=foo.ts` highlights lines 2, 5, 6 and 7 of the
//! block. Missing or malformed ranges highlight nothing; parsing never fails.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RANGE_LIST: Regex = Regex::new(r"\{([\d,-]+)\}").unwrap();
}

/// An inclusive range of 1-based line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRange {
    pub start: usize,
    pub end: usize,
}

impl HighlightRange {
    fn contains(&self, line_number: usize) -> bool {
        self.start <= line_number && line_number <= self.end
    }

    /// Parse `INT` or `INT-INT`
    fn parse(token: &str) -> Option<Self> {
        match token.split_once('-') {
            Some((start, end)) => Some(Self {
                start: start.parse().ok()?,
                end: end.parse().ok()?,
            }),
            None => {
                let line = token.parse().ok()?;
                Some(Self {
                    start: line,
                    end: line,
                })
            }
        }
    }
}

/// Predicate deciding which lines of a code block are highlighted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineHighlighter {
    ranges: Vec<HighlightRange>,
}

impl LineHighlighter {
    /// Build a highlighter from code fence metadata.
    pub fn parse(meta: Option<&str>) -> Self {
        meta.and_then(parse_range_list)
            .map(|ranges| Self { ranges })
            .unwrap_or_default()
    }

    /// Whether the line at 0-based `index` is highlighted
    pub fn is_highlighted(&self, index: usize) -> bool {
        let line_number = index + 1;
        self.ranges.iter().any(|r| r.contains(line_number))
    }

    /// True when no line can ever be highlighted
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

fn parse_range_list(meta: &str) -> Option<Vec<HighlightRange>> {
    let list = RANGE_LIST.captures(meta)?.get(1)?.as_str();
    list.split(',').map(HighlightRange::parse).collect()
}
