use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Drop ordinal/list prefixes: "5. Ünvan" → "Ünvan".
/// Input without any alphabetic character comes back trimmed but otherwise intact.
pub fn strip_leading_non_alpha(s: &str) -> &str {
    let s = s.trim();
    match s.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((i, _)) => &s[i..],
        None => s,
    }
}

/// Case- and diacritic-insensitive comparison key: "İnstagram" → "instagram".
/// Lowercasing stands in for full case folding; it covers the Azerbaijani,
/// Russian and English label alphabets but not expansions such as "ß" → "ss".
pub fn normalize_key(s: &str) -> String {
    s.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Key used for alias lookup of a raw label ("3. Telefon:" → "telefon").
pub fn label_key(raw: &str) -> String {
    let stripped = strip_leading_non_alpha(raw)
        .trim_end_matches(|c: char| c == ':' || c.is_whitespace());
    normalize_key(stripped)
}

/// Anchor text as authors type it: nbsp padding and full-width colons.
pub fn clean_anchor_text(s: &str) -> String {
    s.replace('\u{a0}', " ").replace('：', ":").trim().to_string()
}

/// Split once at the first colon, trimming both halves.
pub fn split_colon(s: &str) -> Option<(&str, &str)> {
    s.split_once(':').map(|(k, v)| (k.trim(), v.trim()))
}
