use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::text::{normalize_key, strip_leading_non_alpha};

static COMPOSITE_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:,|/|\s+və\s+|\s+and\s+)\s*").unwrap());

/// Shared synonym table, built on first use and read-only afterwards.
pub static ALIASES: LazyLock<AliasTable> = LazyLock::new(AliasTable::new);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Address,
    Telefon,
    Mobil,
    Email,
    Web,
    Facebook,
    Instagram,
    /// Label with no alias; carries its normalized text.
    Other(String),
}

impl Field {
    pub fn as_str(&self) -> &str {
        match self {
            Field::Address => "address",
            Field::Telefon => "telefon",
            Field::Mobil => "mobil",
            Field::Email => "email",
            Field::Web => "web",
            Field::Facebook => "facebook",
            Field::Instagram => "instagram",
            Field::Other(key) => key,
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, Field::Telefon | Field::Mobil)
    }

    pub fn is_social(&self) -> bool {
        matches!(self, Field::Facebook | Field::Instagram)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RAW_ALIASES: &[(&str, Field)] = &[
    ("ünvan", Field::Address),
    ("unvan", Field::Address),
    ("telefon", Field::Telefon),
    ("mobil", Field::Mobil),
    ("instagram", Field::Instagram),
    ("facebook", Field::Facebook),
    ("web", Field::Web),
    ("veb", Field::Web),
    ("sayt", Field::Web),
    ("e-mail", Field::Email),
    ("email", Field::Email),
    ("mail", Field::Email),
    ("e-mektub", Field::Email),
    ("e-məktub", Field::Email),
    ("e-poct", Field::Email),
    ("e-poçt", Field::Email),
    // business directory labels
    ("address", Field::Address),
    ("contact number", Field::Telefon),
    ("mobile phone", Field::Mobil),
    ("website address", Field::Web),
];

#[derive(Debug)]
pub struct AliasTable {
    entries: HashMap<String, Field>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::from_pairs(RAW_ALIASES.iter().cloned())
    }

    /// Keys are normalized on the way in, so raw spellings like "e-poçt" still match.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Field)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(raw, field)| (normalize_key(raw), field))
            .collect();
        AliasTable { entries }
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Unknown keys resolve to themselves.
    pub fn resolve(&self, key: &str) -> Field {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| Field::Other(key.to_string()))
    }

    /// Fan a composite label ("Telefon/Mobil", "Telefon və Mobil") out into fields.
    pub fn resolve_composite(&self, label: &str) -> Vec<Field> {
        split_composite(label)
            .into_iter()
            .map(|part| self.resolve(&normalize_key(part)))
            .collect()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits unconditionally; a false split only yields an extra unknown field.
pub fn split_composite(label: &str) -> Vec<&str> {
    COMPOSITE_SEP_RE
        .split(label)
        .map(strip_leading_non_alpha)
        .filter(|part| !part.is_empty())
        .collect()
}
