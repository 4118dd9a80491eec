//! Orphan avoidance for rendered text
//!
//! Joins the last two words of a text tree with a non-breaking space so a
//! single word never wraps onto its own line.

use std::sync::Arc;

/// Non-breaking space
pub const NBSP: char = '\u{00A0}';

/// Inline content: plain text, an opaque pre-rendered element, or a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextTree {
    Text(String),
    Element(String),
    Nodes(Vec<Arc<TextTree>>),
}

impl TextTree {
    pub fn text(s: impl Into<String>) -> Arc<Self> {
        Arc::new(TextTree::Text(s.into()))
    }

    pub fn element(html: impl Into<String>) -> Arc<Self> {
        Arc::new(TextTree::Element(html.into()))
    }

    pub fn nodes(children: Vec<Arc<TextTree>>) -> Arc<Self> {
        Arc::new(TextTree::Nodes(children))
    }
}

/// Rewrite the final word break of the last branch of `tree`.
///
/// Earlier siblings are shared with the input, not copied.
pub fn fix_orphans(tree: &Arc<TextTree>) -> Arc<TextTree> {
    match tree.as_ref() {
        TextTree::Text(s) => match fix_orphans_str(s) {
            Some(fixed) => Arc::new(TextTree::Text(fixed)),
            None => Arc::clone(tree),
        },
        TextTree::Element(_) => Arc::clone(tree),
        TextTree::Nodes(children) => {
            let Some((last, rest)) = children.split_last() else {
                return Arc::clone(tree);
            };
            let fixed = fix_orphans(last);
            if Arc::ptr_eq(&fixed, last) {
                return Arc::clone(tree);
            }
            let mut out: Vec<_> = rest.iter().map(Arc::clone).collect();
            out.push(fixed);
            Arc::new(TextTree::Nodes(out))
        }
    }
}

/// String form of [`fix_orphans`] for plain titles and summaries
pub fn fix_orphans_text(s: &str) -> String {
    fix_orphans_str(s).unwrap_or_else(|| s.to_string())
}

/// `None` when the string is left as is
fn fix_orphans_str(s: &str) -> Option<String> {
    let (pos, sep) = s.char_indices().rev().find(|&(_, c)| c == ' ' || c == NBSP)?;
    if sep == NBSP {
        return None;
    }
    let mut fixed = String::with_capacity(s.len() + 1);
    fixed.push_str(&s[..pos]);
    fixed.push(NBSP);
    fixed.push_str(&s[pos + 1..]);
    Some(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_sentence() {
        assert_eq!(
            fix_orphans_text("the quick brown fox"),
            "the quick brown\u{00A0}fox"
        );
    }

    #[test]
    fn test_short_strings_unchanged() {
        assert_eq!(fix_orphans_text(""), "");
        assert_eq!(fix_orphans_text("word"), "word");
    }

    #[test]
    fn test_two_words() {
        assert_eq!(fix_orphans_text("hello world"), "hello\u{00A0}world");
    }

    #[test]
    fn test_idempotent() {
        let once = fix_orphans_text("design systems at scale");
        assert_eq!(fix_orphans_text(&once), once);

        let tree = TextTree::nodes(vec![TextTree::text("a b"), TextTree::text("c d e")]);
        let once = fix_orphans(&tree);
        assert_eq!(fix_orphans(&once), once);
    }

    #[test]
    fn test_only_last_branch_changes() {
        let first = TextTree::text("leave me alone");
        let link = TextTree::element("<a href=\"/x/\">x</a>");
        let inner = TextTree::nodes(vec![TextTree::text("keep this"), TextTree::text("fix this one")]);
        let tree = TextTree::nodes(vec![first.clone(), link.clone(), inner]);

        let fixed = fix_orphans(&tree);
        let TextTree::Nodes(children) = fixed.as_ref() else {
            panic!("expected nodes");
        };
        assert!(Arc::ptr_eq(&children[0], &first));
        assert!(Arc::ptr_eq(&children[1], &link));

        let TextTree::Nodes(grand) = children[2].as_ref() else {
            panic!("expected nodes");
        };
        assert_eq!(*grand[0], TextTree::Text("keep this".to_string()));
        assert_eq!(*grand[1], TextTree::Text("fix this\u{00A0}one".to_string()));
    }

    #[test]
    fn test_trailing_element_is_opaque() {
        let tree = TextTree::nodes(vec![TextTree::text("see the"), TextTree::element("<code>x y</code>")]);
        let fixed = fix_orphans(&tree);
        assert!(Arc::ptr_eq(&fixed, &tree));
    }

    #[test]
    fn test_empty_inputs() {
        let empty = TextTree::nodes(Vec::new());
        assert!(Arc::ptr_eq(&fix_orphans(&empty), &empty));
        let blank = TextTree::text("");
        assert!(Arc::ptr_eq(&fix_orphans(&blank), &blank));
    }
}
