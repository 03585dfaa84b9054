use scraper::ElementRef;

use super::alias::AliasTable;
use super::markup::{element_text, next_sibling_element, siblings_until, Fragment};
use super::text::{clean_anchor_text, label_key, split_colon};

/// A markup node believed to name a field.
#[derive(Debug, Clone)]
pub struct LabelAnchor<'a> {
    pub node: ElementRef<'a>,
    /// Cleaned full text of the node.
    pub text: String,
    /// Part before the first colon (whole text when there is none).
    pub label: String,
    /// Part after the first colon.
    pub inline: String,
    /// Alias lookup key of `label`.
    pub key: String,
}

impl<'a> LabelAnchor<'a> {
    pub fn new(node: ElementRef<'a>) -> Self {
        let text = clean_anchor_text(&element_text(node));
        let (label, inline) = match split_colon(&text) {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (text.clone(), String::new()),
        };
        let key = label_key(&label);
        LabelAnchor {
            node,
            text,
            label,
            inline,
            key,
        }
    }

    pub fn has_colon(&self) -> bool {
        self.text.contains(':')
    }

    /// Same-kind anchors share the tag name; scans stop at them.
    pub fn is_same_kind(&self, other: ElementRef<'_>) -> bool {
        other.value().name() == self.node.value().name()
    }

    /// Sibling fragments up to the next same-kind anchor.
    pub fn following(&self) -> impl Iterator<Item = Fragment<'a>> + '_ {
        siblings_until(self.node, move |e| self.is_same_kind(e))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    pub inline: String,
    pub follow: String,
    pub value: String,
}

impl Located {
    /// inline + " " + follow, trimmed.
    pub fn combined(&self) -> String {
        format!("{} {}", self.inline, self.follow).trim().to_string()
    }
}

pub fn locate(anchor: &LabelAnchor<'_>, aliases: &AliasTable) -> Located {
    let inline = anchor.inline.clone();
    let follow = follow_value(anchor);
    let mut value = if inline.is_empty() {
        follow.clone()
    } else {
        inline.clone()
    };
    if value.is_empty() {
        value = next_anchor_value(anchor, aliases).unwrap_or_default();
    }
    Located {
        inline,
        follow,
        value,
    }
}

/// Sibling text up to the next anchor; one leading colon is dropped from the first fragment.
pub fn follow_value(anchor: &LabelAnchor<'_>) -> String {
    let mut segs: Vec<String> = Vec::new();
    for frag in anchor.following() {
        let mut t = frag.text();
        if t.is_empty() {
            continue;
        }
        if segs.is_empty() {
            if let Some(rest) = t.strip_prefix(':') {
                t = rest.trim_start().to_string();
                if t.is_empty() {
                    continue;
                }
            }
        }
        segs.push(t);
    }
    segs.join(" ").trim().to_string()
}

/// Value borrowed from the next anchor when the current one yielded nothing.
fn next_anchor_value(anchor: &LabelAnchor<'_>, aliases: &AliasTable) -> Option<String> {
    let next = next_sibling_element(anchor.node, |e| anchor.is_same_kind(e))?;
    let cand = clean_anchor_text(&element_text(next));
    if cand.starts_with(':') {
        return Some(cand.trim_start_matches(':').trim().to_string());
    }
    match split_colon(&cand) {
        None => Some(cand.clone()),
        Some((pre, post)) if pre.is_empty() || !aliases.is_known(&label_key(pre)) => {
            Some(post.to_string())
        }
        // next anchor is a known label of its own
        Some(_) => None,
    }
}
