pub mod anchors;
pub mod directory;
pub mod embeds;
pub mod lines;

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::alias::{AliasTable, Field};
use super::fields::FieldMap;
use crate::db::{ContactRow, Document};
use anchors::AnchorPass;

static ARTICLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.financity-single-article-content").unwrap());
static BLOCK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p, li").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Free-form article body with `strong` labels.
    Article,
    /// Directory listing with `div.label` / `div.text` pairs.
    Directory,
    Unknown,
}

pub fn detect_layout(html: &Html) -> Layout {
    if html.select(&ARTICLE_SEL).next().is_some() {
        Layout::Article
    } else if html.select(&directory::LABEL_SEL).next().is_some() {
        Layout::Directory
    } else {
        Layout::Unknown
    }
}

/// Run the layout's passes and assemble the fixed-schema record.
pub fn extract(doc: &Document, html: &Html, aliases: &AliasTable) -> ContactRow {
    let layout = detect_layout(html);
    let mut fields = FieldMap::new();

    match layout {
        Layout::Article => {
            if let Some(container) = html.select(&ARTICLE_SEL).next() {
                scan_article(container, aliases, &mut fields);
            }
        }
        Layout::Directory => directory::scan(html, aliases, &mut fields),
        Layout::Unknown => {}
    }

    if !fields.has_value(&Field::Web) {
        if let Some(link) = embeds::visit_site_link(html) {
            fields.set_if_absent(Field::Web, &link);
        }
    }

    debug!(url = %doc.url, ?layout, fields = fields.len(), "extracted document");
    assemble(doc, fields)
}

/// Anchor pass first; the flattened pass only fills what it left unset.
fn scan_article(container: ElementRef<'_>, aliases: &AliasTable, fields: &mut FieldMap) {
    let blocks: Vec<ElementRef<'_>> = container.select(&BLOCK_SEL).collect();

    let mut pass = AnchorPass::new(aliases);
    for block in &blocks {
        pass.scan_block(*block, fields);
    }
    for block in &blocks {
        lines::scan_block(*block, aliases, fields);
    }
    embeds::scan_embeds(container, fields);
}

/// Closed schema: only the known fields make it into the record.
pub fn assemble(doc: &Document, mut fields: FieldMap) -> ContactRow {
    let company = if doc.company.trim().is_empty() {
        fields.take(&Field::Other(directory::COMPANY_NAME_KEY.into()))
    } else {
        doc.company.clone()
    };

    ContactRow {
        company,
        category: doc.category.clone(),
        url: doc.url.clone(),
        address: fields.take(&Field::Address),
        telefon: fields.take(&Field::Telefon),
        mobil: fields.take(&Field::Mobil),
        email: fields.take(&Field::Email),
        web: fields.take(&Field::Web),
        facebook: fields.take(&Field::Facebook),
        instagram: fields.take(&Field::Instagram),
    }
}

// ── Tests ──
