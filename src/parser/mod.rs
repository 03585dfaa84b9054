pub mod alias;
pub mod extract;
pub mod fields;
pub mod locate;
pub mod markup;
pub mod text;

use scraper::Html;

use crate::db::{ContactRow, Document};

/// html → layout passes → field map → fixed-schema row.
pub fn process_document(doc: &Document) -> ContactRow {
    let html = Html::parse_document(&doc.html);
    extract::extract(doc, &html, &alias::ALIASES)
}
