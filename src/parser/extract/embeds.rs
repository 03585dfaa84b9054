use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::parser::alias::Field;
use crate::parser::fields::FieldMap;
use crate::parser::markup::{element_text, link_target};

static EMBED_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("figure .wp-block-embed__wrapper, .wp-block-embed__wrapper").unwrap()
});
static VISIT_SITE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3, p").unwrap());
static HREF_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Heading text meaning "visit site".
const VISIT_SITE_PHRASE: &str = "Sayta keçid";

/// Embedded posts/links are a last resort for the social and web fields.
/// Nothing already set is overwritten.
pub fn scan_embeds(container: ElementRef<'_>, fields: &mut FieldMap) {
    for wrapper in container.select(&EMBED_SEL) {
        let txt = element_text(wrapper);
        if txt.is_empty() {
            continue;
        }
        // A social embed whose field is taken still counts as a web link.
        let field = if txt.contains("instagram.com") && !fields.has_value(&Field::Instagram) {
            Field::Instagram
        } else if txt.contains("facebook.com") && !fields.has_value(&Field::Facebook) {
            Field::Facebook
        } else {
            Field::Web
        };
        fields.set_if_absent(field, &txt);
    }
}

/// Document-wide fallback: the link under the first "visit site" heading.
pub fn visit_site_link(doc: &Html) -> Option<String> {
    let heading = doc
        .select(&VISIT_SITE_SEL)
        .find(|el| el.text().collect::<String>().contains(VISIT_SITE_PHRASE))?;
    let link = heading.select(&HREF_LINK_SEL).next()?;
    let target = link_target(link);
    (!target.is_empty()).then_some(target)
}
