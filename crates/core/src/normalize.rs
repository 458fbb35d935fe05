//! Input normalization
//!
//! Free-text and language inputs are normalized once, here, before they
//! reach either a stored row or an index dispatch — the stored sort keys
//! and the search partition values must agree exactly.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical capitalization for languages the catalog knows about
static LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("sanskrit", "Sanskrit"),
        ("telugu", "Telugu"),
        ("tamil", "Tamil"),
        ("kannada", "Kannada"),
        ("malayalam", "Malayalam"),
        ("hindi", "Hindi"),
        ("marathi", "Marathi"),
        ("bengali", "Bengali"),
        ("braj", "Braj"),
        ("manipravalam", "Manipravalam"),
    ])
});

/// Trim and collapse internal whitespace
///
/// `"  vathapi   ganapathim "` becomes `"vathapi ganapathim"`. Applied to
/// titles and names at write time and to free-text queries at dispatch.
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Map a language name to its canonical capitalized form
///
/// Known languages come from a fixed lookup table; anything else is
/// title-cased as a fallback (`"unknown-lang"` → `"Unknown-lang"`).
pub fn canonical_language(input: &str) -> String {
    let cleaned = clean_text(input);
    let lower = cleaned.to_lowercase();
    match LANGUAGES.get(lower.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => title_case(&lower),
    }
}

/// Canonical capitalized form of a tradition name
pub fn canonical_tradition(input: &str) -> String {
    title_case(&clean_text(input).to_lowercase())
}

/// Uppercase the first character, leave the rest as given
pub fn title_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First letter of a normalized name, lowercased, for letter search
pub fn first_letter(name: &str) -> Option<char> {
    clean_text(name)
        .chars()
        .next()
        .and_then(|c| c.to_lowercase().next())
}
