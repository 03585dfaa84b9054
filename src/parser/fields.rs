use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::alias::Field;

static PLUS_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+\s+(\d)").unwrap());
static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

const PHONE_SEP: &str = "; ";

/// Per-document accumulator: canonical field → merged value.
#[derive(Debug, Default, Clone)]
pub struct FieldMap {
    values: HashMap<Field, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_value(&self, field: &Field) -> bool {
        self.values.get(field).is_some_and(|v| !v.is_empty())
    }

    pub fn get(&self, field: &Field) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First-writer-wins. Empty values are never recorded.
    pub fn set_if_absent(&mut self, field: Field, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.has_value(&field) {
            return false;
        }
        self.values.insert(field, value.to_string());
        true
    }

    /// Append a phone value unless it is already contained in the accumulated one.
    pub fn merge_phone(&mut self, field: Field, value: &str) -> bool {
        let existing = self.get(&field).unwrap_or("");
        match merge_phone_value(existing, value) {
            Some(merged) => {
                self.values.insert(field, merged);
                true
            }
            None => false,
        }
    }

    /// Route label-less text to `field` using that field's continuation policy.
    pub fn append_continuation(&mut self, field: &Field, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        if field.is_phone() {
            return self.merge_phone(field.clone(), text);
        }
        if !(field.is_social() || matches!(field, Field::Address | Field::Web)) {
            return false;
        }
        let prev = self.get(field).unwrap_or("");
        if prev.contains(text) {
            return false;
        }
        let joined = if prev.is_empty() {
            text.to_string()
        } else {
            format!("{prev} {text}")
        };
        self.values.insert(field.clone(), joined);
        true
    }

    /// Value for a schema field, empty when unset.
    pub fn take(&mut self, field: &Field) -> String {
        self.values.remove(field).unwrap_or_default()
    }
}

/// "+ 994 50" → "+994 50".
pub fn normalize_phone(raw: &str) -> String {
    PLUS_GAP_RE.replace_all(raw.trim(), "+$1").trim().to_string()
}

/// `None` when the merge would leave `existing` unchanged.
pub fn merge_phone_value(existing: &str, new: &str) -> Option<String> {
    let v = normalize_phone(new);
    if v.is_empty() {
        return None;
    }
    if existing.is_empty() {
        return Some(v);
    }
    if existing.contains(&v) {
        return None;
    }
    let sep = if existing.ends_with(PHONE_SEP) { "" } else { PHONE_SEP };
    Some(format!("{existing}{sep}{v}"))
}

/// Local Azerbaijani numbers to international form; short numbers are left alone.
pub fn to_international(raw: &str) -> String {
    let digits = NON_DIGIT_RE.replace_all(raw, "");
    if digits.len() <= 7 {
        return raw.trim().to_string();
    }
    if let Some(rest) = digits.strip_prefix("00994") {
        return format!("+994{rest}");
    }
    if digits.starts_with("994") {
        return format!("+{digits}");
    }
    let local = digits.strip_prefix('0').unwrap_or(&digits);
    format!("+994{local}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_merge_appends_with_separator() {
        let mut m = FieldMap::new();
        m.merge_phone(Field::Telefon, "+994 12 123 45 67");
        m.merge_phone(Field::Telefon, "+ 994 50 765 43 21");
        assert_eq!(
            m.get(&Field::Telefon),
            Some("+994 12 123 45 67; +994 50 765 43 21")
        );
    }

    #[test]
    fn phone_merge_is_idempotent_under_containment() {
        let mut m = FieldMap::new();
        m.merge_phone(Field::Mobil, "+994 12 123 45 67");
        m.merge_phone(Field::Mobil, "+ 994 50 765 43 21");
        let before = m.get(&Field::Mobil).unwrap().to_string();
        assert!(!m.merge_phone(Field::Mobil, "+ 994 50 765 43 21"));
        assert!(!m.merge_phone(Field::Mobil, "765 43 21"));
        assert_eq!(m.get(&Field::Mobil), Some(before.as_str()));
    }

    #[test]
    fn phone_merge_ignores_empty() {
        assert_eq!(merge_phone_value("012", "   "), None);
        assert_eq!(merge_phone_value("", " 012 "), Some("012".into()));
        assert_eq!(merge_phone_value("012; ", "050"), Some("012; 050".into()));
    }

    #[test]
    fn first_writer_wins() {
        let mut m = FieldMap::new();
        assert!(m.set_if_absent(Field::Web, " https://a.az "));
        assert!(!m.set_if_absent(Field::Web, "https://b.az"));
        assert_eq!(m.get(&Field::Web), Some("https://a.az"));
    }

    #[test]
    fn empty_value_never_recorded() {
        let mut m = FieldMap::new();
        assert!(!m.set_if_absent(Field::Address, "  "));
        assert!(!m.has_value(&Field::Address));
        assert!(m.is_empty());
    }

    #[test]
    fn continuation_appends_new_text_only() {
        let mut m = FieldMap::new();
        m.set_if_absent(Field::Address, "Bakı, Nəsimi r.");
        assert!(m.append_continuation(&Field::Address, "Füzuli küç. 5"));
        assert!(!m.append_continuation(&Field::Address, "Nəsimi"));
        assert_eq!(m.get(&Field::Address), Some("Bakı, Nəsimi r. Füzuli küç. 5"));
    }

    #[test]
    fn continuation_for_phones_merges() {
        let mut m = FieldMap::new();
        m.merge_phone(Field::Telefon, "012 555 11 22");
        m.append_continuation(&Field::Telefon, "050 333 44 55");
        assert_eq!(m.get(&Field::Telefon), Some("012 555 11 22; 050 333 44 55"));
    }

    #[test]
    fn continuation_extends_social_fields() {
        let mut m = FieldMap::new();
        m.set_if_absent(Field::Instagram, "@soel");
        assert!(m.append_continuation(&Field::Instagram, "@soel.parfum.az"));
        assert!(!m.append_continuation(&Field::Instagram, "soel"));
        assert_eq!(m.get(&Field::Instagram), Some("@soel @soel.parfum.az"));
    }

    #[test]
    fn continuation_discarded_for_singular_fields() {
        let mut m = FieldMap::new();
        m.set_if_absent(Field::Email, "a@b.az");
        assert!(!m.append_continuation(&Field::Email, "c@d.az"));
        assert!(!m.append_continuation(&Field::Other("iş saatları".into()), "09-18"));
        assert_eq!(m.get(&Field::Email), Some("a@b.az"));
    }

    #[test]
    fn international_form() {
        assert_eq!(to_international("(012) 498-12-34"), "+994124981234");
        assert_eq!(to_international("00994 50 123 45 67"), "+994501234567");
        assert_eq!(to_international("994501234567"), "+994501234567");
        assert_eq!(to_international("501234567"), "+994501234567");
        assert_eq!(to_international(" 1234 "), "1234");
    }
}
