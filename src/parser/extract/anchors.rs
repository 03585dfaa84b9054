use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::trace;

use crate::parser::alias::{AliasTable, Field};
use crate::parser::fields::FieldMap;
use crate::parser::locate::{locate, LabelAnchor, Located};
use crate::parser::markup::{any_link, element_text, has_ancestor_tag, href_link, link_target, Fragment};

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());
static EMBEDDED_INSTAGRAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:İnstagram|Instagram)\s*:\s*([^\s,;]+)").unwrap());

/// Structural pass: every top-level `strong` inside a block is a candidate anchor.
pub struct AnchorPass<'t> {
    aliases: &'t AliasTable,
    /// Field of the most recent single-label anchor; continuation text goes here.
    last_field: Option<Field>,
}

impl<'t> AnchorPass<'t> {
    pub fn new(aliases: &'t AliasTable) -> Self {
        AnchorPass {
            aliases,
            last_field: None,
        }
    }

    pub fn scan_block(&mut self, block: ElementRef<'_>, fields: &mut FieldMap) {
        for node in block.select(&ANCHOR_SEL) {
            if has_ancestor_tag(node, "strong") {
                continue;
            }
            let anchor = LabelAnchor::new(node);
            if anchor.has_colon() || self.aliases.is_known(&anchor.key) {
                self.apply_label(&anchor, fields);
            } else {
                self.apply_continuation(&anchor.text, fields);
            }
        }
    }

    fn apply_label(&mut self, anchor: &LabelAnchor<'_>, fields: &mut FieldMap) {
        let loc = locate(anchor, self.aliases);
        let targets = self.aliases.resolve_composite(&anchor.label);
        for field in &targets {
            merge_located(field, anchor, &loc, fields);
        }
        if let [single] = targets.as_slice() {
            self.last_field = Some(single.clone());
        }
    }

    fn apply_continuation(&self, text: &str, fields: &mut FieldMap) {
        if text.is_empty() {
            return;
        }
        match &self.last_field {
            Some(field) => {
                if !fields.append_continuation(field, text) {
                    trace!(%field, text, "continuation not appended");
                }
            }
            None => trace!(text, "continuation before any label, discarded"),
        }
    }
}

fn merge_located(field: &Field, anchor: &LabelAnchor<'_>, loc: &Located, fields: &mut FieldMap) {
    match field {
        Field::Telefon | Field::Mobil => {
            fields.merge_phone(field.clone(), &loc.value);
        }
        Field::Email => {
            if !fields.has_value(field) {
                let v = non_empty_or(email_value(anchor, loc), &loc.value);
                fields.set_if_absent(Field::Email, &v);
            }
        }
        Field::Facebook | Field::Instagram => {
            if !fields.has_value(field) {
                let v = non_empty_or(social_value(anchor, loc), &loc.value);
                fields.set_if_absent(field.clone(), &v);
            }
            if *field == Field::Facebook {
                if let Some(handle) = embedded_instagram(&loc.combined()) {
                    fields.set_if_absent(Field::Instagram, &handle);
                }
            }
        }
        Field::Web | Field::Address | Field::Other(_) => {
            fields.set_if_absent(field.clone(), &loc.value);
        }
    }
}

fn non_empty_or(v: String, fallback: &str) -> String {
    if v.is_empty() {
        fallback.to_string()
    } else {
        v
    }
}

/// Visible text of the first non-empty sibling element; cloaked addresses only
/// survive in rendered text, so the href is not used.
fn email_value(anchor: &LabelAnchor<'_>, loc: &Located) -> String {
    for frag in anchor.following() {
        if let Fragment::Element(el) = frag {
            let shown = any_link(el).unwrap_or(el);
            let txt = element_text(shown);
            let txt = txt.trim_start_matches(':').trim();
            if !txt.is_empty() {
                return txt.to_string();
            }
        }
    }
    loc.combined()
}

/// Link target of the first sibling element carrying a link.
fn social_value(anchor: &LabelAnchor<'_>, loc: &Located) -> String {
    for frag in anchor.following() {
        if let Fragment::Element(el) = frag {
            if let Some(a) = href_link(el) {
                return link_target(a);
            }
        }
    }
    loc.combined()
}

fn embedded_instagram(text: &str) -> Option<String> {
    EMBEDDED_INSTAGRAM_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}
