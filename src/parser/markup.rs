use std::sync::LazyLock;

use scraper::{ElementRef, Node, Selector};

static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static HREF_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// A sibling as seen by value scans: either an element or a bare text node.
#[derive(Debug, Clone, Copy)]
pub enum Fragment<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

impl<'a> Fragment<'a> {
    /// Whitespace-joined text with nbsp folded, trimmed.
    pub fn text(&self) -> String {
        match self {
            Fragment::Element(el) => element_text(*el),
            Fragment::Text(t) => t.replace('\u{a0}', " ").trim().to_string(),
        }
    }
}

/// Following siblings of `el` in document order, stopping before the first
/// element that satisfies `stop`. Comments and other node kinds are skipped.
pub fn siblings_until<'a, F>(el: ElementRef<'a>, stop: F) -> impl Iterator<Item = Fragment<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    el.next_siblings()
        .filter_map(|node| match node.value() {
            Node::Text(t) => Some(Fragment::Text(&**t)),
            Node::Element(_) => ElementRef::wrap(node).map(Fragment::Element),
            _ => None,
        })
        .take_while(move |frag| !matches!(frag, Fragment::Element(e) if stop(*e)))
}

/// First following sibling element that satisfies `pred`.
pub fn next_sibling_element<'a, F>(el: ElementRef<'a>, pred: F) -> Option<ElementRef<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|e| pred(*e))
}

/// Non-empty trimmed text pieces under `el`, in document order.
pub fn stripped_strings(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .map(|t| t.replace('\u{a0}', " ").trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn element_text(el: ElementRef<'_>) -> String {
    stripped_strings(el).join(" ")
}

/// Text pieces joined by newlines, then split back into lines.
pub fn element_lines(el: ElementRef<'_>) -> Vec<String> {
    stripped_strings(el)
        .join("\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name() == name
}

pub fn has_ancestor_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| is_tag(a, name))
}

/// The element itself when it is a link with an href, else its first such descendant.
pub fn href_link(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if is_tag(el, "a") && el.value().attr("href").is_some() {
        return Some(el);
    }
    el.select(&HREF_LINK_SEL).next()
}

/// The element itself when it is a link, else its first link descendant.
pub fn any_link(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if is_tag(el, "a") {
        return Some(el);
    }
    el.select(&LINK_SEL).next()
}

/// href of a link, falling back to its visible text when the href is blank.
pub fn link_target(a: ElementRef<'_>) -> String {
    let href = a.value().attr("href").unwrap_or("").trim();
    if href.is_empty() {
        element_text(a)
    } else {
        href.to_string()
    }
}
