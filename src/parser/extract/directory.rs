use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::parser::alias::{AliasTable, Field};
use crate::parser::fields::{to_international, FieldMap};
use crate::parser::markup::{element_text, siblings_until, stripped_strings, Fragment};
use crate::parser::text::label_key;

pub(crate) static LABEL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.label").unwrap());
static COMPANY_NAME_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#company_name").unwrap());
static COMPANY_ADDRESS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#company_address").unwrap());
static TEL_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href^='tel:']").unwrap());
static HREF_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Label key naming the company itself on directory pages.
pub const COMPANY_NAME_KEY: &str = "company name";

/// Business-directory pages: `div.label` / `div.text` pairs inside `div.info`.
pub fn scan(doc: &Html, aliases: &AliasTable, fields: &mut FieldMap) {
    if let Some(addr) = doc.select(&COMPANY_ADDRESS_SEL).next() {
        fields.set_if_absent(Field::Address, &element_text(addr));
    }
    if let Some(name) = doc.select(&COMPANY_NAME_SEL).next() {
        fields.set_if_absent(Field::Other(COMPANY_NAME_KEY.into()), &element_text(name));
    }

    for label in doc.select(&LABEL_SEL) {
        let key = label_key(&element_text(label));
        if key.is_empty() {
            continue;
        }
        let field = aliases.resolve(&key);
        let text_el = value_element(label);
        if field.is_phone() {
            let mut nums = text_el.map(phone_strings).unwrap_or_default();
            if nums.is_empty() {
                nums = container_parts(label);
            }
            for num in &nums {
                fields.merge_phone(field.clone(), &to_international(num));
            }
        } else {
            let mut value = text_el.map(single_value).unwrap_or_default();
            if value.is_empty() {
                value = container_parts(label).join(" ");
            }
            fields.set_if_absent(field, &value);
        }
    }
}

/// First `div.text` after the label, not looking past the next label.
fn value_element(label: ElementRef<'_>) -> Option<ElementRef<'_>> {
    siblings_until(label, is_label).find_map(|frag| match frag {
        Fragment::Element(el) if has_class(el, "div", "text") => Some(el),
        _ => None,
    })
}

fn phone_strings(text_el: ElementRef<'_>) -> Vec<String> {
    let linked: Vec<String> = text_el
        .select(&TEL_LINK_SEL)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if linked.is_empty() {
        stripped_strings(text_el)
    } else {
        linked
    }
}

fn single_value(text_el: ElementRef<'_>) -> String {
    text_el
        .select(&TEL_LINK_SEL)
        .chain(text_el.select(&HREF_LINK_SEL))
        .next()
        .map(element_text)
        .unwrap_or_else(|| element_text(text_el))
}

/// Loose layout: bare strings after the label inside its `div.info`,
/// up to the next label.
fn container_parts(label: ElementRef<'_>) -> Vec<String> {
    let in_info = label
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| has_class(el, "div", "info"));
    if !in_info {
        return Vec::new();
    }
    siblings_until(label, is_label)
        .flat_map(|frag| match frag {
            Fragment::Element(el) => stripped_strings(el),
            Fragment::Text(_) => vec![frag.text()],
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_label(el: ElementRef<'_>) -> bool {
    has_class(el, "div", "label")
}

fn has_class(el: ElementRef<'_>, tag: &str, class: &str) -> bool {
    el.value().name() == tag && el.value().classes().any(|c| c == class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::alias::ALIASES;

    fn scan_html(html: &str) -> FieldMap {
        let doc = Html::parse_document(html);
        let mut f = FieldMap::new();
        scan(&doc, &ALIASES, &mut f);
        f
    }

    #[test]
    fn label_text_pairs() {
        let f = scan_html(
            r#"<div class="info"><div class="label">Address</div><div class="text">Baku, Nizami str. 5</div></div>
               <div class="info"><div class="label">Contact number</div>
                 <div class="text"><a href="tel:0124981234">(012) 498-12-34</a>, <a href="tel:0125550000">(012) 555-00-00</a></div></div>
               <div class="info"><div class="label">Website address</div><div class="text"><a href="http://site.az">site.az</a></div></div>"#,
        );
        assert_eq!(f.get(&Field::Address), Some("Baku, Nizami str. 5"));
        assert_eq!(f.get(&Field::Telefon), Some("+994124981234; +994125550000"));
        assert_eq!(f.get(&Field::Web), Some("site.az"));
    }

    #[test]
    fn id_shortcuts_take_precedence() {
        let f = scan_html(
            r#"<h1 id="company_name">Acme MMC</h1><div id="company_address">Sumqayıt</div>
               <div class="info"><div class="label">Address</div><div class="text">elsewhere</div></div>"#,
        );
        assert_eq!(f.get(&Field::Address), Some("Sumqayıt"));
        assert_eq!(f.get(&Field::Other(COMPANY_NAME_KEY.into())), Some("Acme MMC"));
    }

    #[test]
    fn phones_without_links_use_strings_and_dedup() {
        let f = scan_html(
            r#"<div class="info"><div class="label">Mobile phone</div>
               <div class="text">050 123 45 67<br>+994 50 123 45 67<br>(055) 222-33-44</div></div>"#,
        );
        assert_eq!(f.get(&Field::Mobil), Some("+994501234567; +994552223344"));
    }

    #[test]
    fn value_from_container_when_text_missing() {
        let f = scan_html(
            r#"<div class="info"><div class="label">Fax</div> <span>(012) 111-22-33</span></div>
               <div class="info"><div class="label">Contact number</div> <span>012 444 55 66</span></div>"#,
        );
        assert_eq!(f.get(&Field::Other("fax".into())), Some("(012) 111-22-33"));
        assert_eq!(f.get(&Field::Telefon), Some("+994124445566"));
    }

    #[test]
    fn empty_text_falls_back_to_container() {
        let f = scan_html(
            r#"<div class="info"><div class="label">Contact number</div><div class="text"></div> <span>012 444 55 66</span></div>
               <div class="info"><div class="label">Address</div><div class="text"> </div> Gəncə, Atatürk pr. 3</div>"#,
        );
        assert_eq!(f.get(&Field::Telefon), Some("+994124445566"));
        assert_eq!(f.get(&Field::Address), Some("Gəncə, Atatürk pr. 3"));
    }

    #[test]
    fn text_of_next_label_is_not_borrowed() {
        let f = scan_html(
            r#"<div class="info"><div class="label">Address</div><div class="label">Website address</div><div class="text">site.az</div></div>"#,
        );
        assert!(!f.has_value(&Field::Address));
        assert_eq!(f.get(&Field::Web), Some("site.az"));
    }
}
