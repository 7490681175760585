//! Country-name canonicalization.
//!
//! The quiz dataset and the world-boundary file come from different sources
//! and do not agree on country naming ("United States of America" vs "United
//! States", "Czech Republic" vs "Czechia"). `canonical_key` maps both
//! vocabularies onto one comparison key:
//!
//!   lowercase → strip diacritics → collapse whitespace → trim
//!   → keep only `[a-z' -]` → alias lookup
//!
//! The function is pure and total: every input, including "", has a defined
//! output, and applying it twice yields the same key.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Alias table mapping already-canonicalized spellings to the preferred key.
/// Both sides are stored post-cleanup so lookups stay a single pass.
const ALIASES: &[(&str, &str)] = &[
    ("united states of america", "united states"),
    ("usa", "united states"),
    ("us", "united states"),
    ("russian federation", "russia"),
    ("czech republic", "czechia"),
    ("republic of korea", "south korea"),
    ("korea republic of", "south korea"),
    ("democratic people's republic of korea", "north korea"),
    ("myanmar", "burma"),
    ("republic of the congo", "congo"),
    ("democratic republic of the congo", "dr congo"),
    ("congo the democratic republic of the", "dr congo"),
    ("united republic of tanzania", "tanzania"),
    ("viet nam", "vietnam"),
    ("lao people's democratic republic", "laos"),
    ("lao pdr", "laos"),
    ("republic of moldova", "moldova"),
    ("brunei darussalam", "brunei"),
    ("cote d'ivoire", "ivory coast"),
    ("cabo verde", "cape verde"),
    ("timor-leste", "east timor"),
    ("north macedonia", "macedonia"),
    ("the former yugoslav republic of macedonia", "macedonia"),
    ("syrian arab republic", "syria"),
    ("iran islamic republic of", "iran"),
    ("islamic republic of iran", "iran"),
    ("bolivia plurinational state of", "bolivia"),
    ("venezuela bolivarian republic of", "venezuela"),
    ("united kingdom of great britain and northern ireland", "united kingdom"),
    ("uk", "united kingdom"),
    ("eswatini", "swaziland"),
    ("turkiye", "turkey"),
];

/// Map a raw country-name string to its canonical comparison key.
pub fn canonical_key(raw: &str) -> String {
    let cleaned = clean(raw);
    match ALIASES.iter().find(|(from, _)| *from == cleaned) {
        Some((_, to)) => (*to).to_string(),
        None => cleaned,
    }
}

/// Cleanup pass without the alias lookup: lowercase, drop combining marks,
/// collapse whitespace, keep only `[a-z' -]`.
fn clean(raw: &str) -> String {
    let decomposed: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut out = String::with_capacity(decomposed.len());
    let mut pending_space = false;
    for ch in decomposed.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if !matches!(ch, 'a'..='z' | '\'' | '-') {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}
