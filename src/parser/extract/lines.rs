use scraper::ElementRef;

use crate::parser::alias::{AliasTable, Field};
use crate::parser::fields::FieldMap;
use crate::parser::markup::element_lines;
use crate::parser::text::{label_key, split_colon};

/// Secondary, lower-confidence pass over a block flattened to text lines.
/// Phones still merge; every other field is only filled when still unset.
pub fn scan_block(block: ElementRef<'_>, aliases: &AliasTable, fields: &mut FieldMap) {
    for line in element_lines(block) {
        let Some((key, value)) = split_colon(&line) else {
            continue;
        };
        let field = aliases.resolve(&label_key(key));
        match field {
            Field::Telefon | Field::Mobil => {
                fields.merge_phone(field, value);
            }
            Field::Email | Field::Facebook | Field::Instagram | Field::Web | Field::Address => {
                fields.set_if_absent(field, value);
            }
            Field::Other(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::alias::ALIASES;
    use scraper::{Html, Selector};

    fn scan(html: &str, fields: &mut FieldMap) {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("p, li").unwrap();
        for block in doc.select(&sel) {
            scan_block(block, &ALIASES, fields);
        }
    }

    #[test]
    fn picks_up_plain_text_labels() {
        let mut f = FieldMap::new();
        scan("<p>Ünvan: Bakı<br>Telefon: 012 555 44 33<br>Veb: www.a.az</p>", &mut f);
        assert_eq!(f.get(&Field::Address), Some("Bakı"));
        assert_eq!(f.get(&Field::Telefon), Some("012 555 44 33"));
        assert_eq!(f.get(&Field::Web), Some("www.a.az"));
    }

    #[test]
    fn fills_only_unset_fields() {
        let mut f = FieldMap::new();
        f.set_if_absent(Field::Address, "Sumqayıt");
        f.merge_phone(Field::Telefon, "012 555 44 33");
        scan("<p>Ünvan: Bakı<br>Telefon: 012 555 44 33<br>Telefon: 050 000 00 00</p>", &mut f);
        assert_eq!(f.get(&Field::Address), Some("Sumqayıt"));
        assert_eq!(f.get(&Field::Telefon), Some("012 555 44 33; 050 000 00 00"));
    }

    #[test]
    fn ignores_lines_without_colon_and_unknown_labels() {
        let mut f = FieldMap::new();
        scan("<p>Salam dünya<br>İş vaxtı: 09:00</p>", &mut f);
        assert!(f.is_empty());
    }

    #[test]
    fn empty_values_are_skipped() {
        let mut f = FieldMap::new();
        scan("<p>E-mail:</p><p>E-mail: a@b.az</p>", &mut f);
        assert_eq!(f.get(&Field::Email), Some("a@b.az"));
    }
}
