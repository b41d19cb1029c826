//! Text normalization and fuzzy matching.
//!
//! Titles coming from the catalog and from the lyrics-search index differ
//! in diacritics, punctuation and release qualifiers ("(Live)",
//! "- Remastered 2011"). These helpers fold both sides into comparable
//! token sets. Everything here is pure.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Release qualifiers matched case-insensitively as substrings.
const QUALIFIERS: &[&str] = &[
    "live",
    "remaster",
    "edit",
    "version",
    "demo",
    "acoustic",
    "mono",
    "stereo",
    "deluxe",
    "bonus",
    "reissue",
    "mix",
    "session",
    "take",
    "instrumental",
];

// The patterns below are literals; compilation cannot fail at runtime.
#[allow(clippy::expect_used)]
static PAREN_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)").expect("valid paren-group pattern"));

#[allow(clippy::expect_used)]
static ANY_PAREN_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid paren pattern"));

#[allow(clippy::expect_used)]
static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year pattern"));

/// Anything outside the letter and number categories, whitespace and hyphen.
/// Spacing vowel signs (category M) fall outside and become separators.
#[allow(clippy::expect_used)]
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s-]").expect("valid word-class pattern"));

/// Combining diacritical marks block (U+0300..U+036F).
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Fold a string for comparison.
///
/// Decomposes (NFKD), drops combining diacritics, maps quote variants to an
/// apostrophe, replaces anything that is not a letter, digit, whitespace or
/// hyphen with a space, collapses whitespace and lowercases.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' | '\u{201e}' | '"' | '\u{2019}' => '\'',
            other => other,
        })
        .collect();

    NON_WORD
        .replace_all(&folded, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether `text` mentions any release qualifier.
pub fn is_qualifier(text: &str) -> bool {
    let lower = text.to_lowercase();
    QUALIFIERS.iter().any(|q| lower.contains(q))
}

/// Drop parenthesized groups whose contents are release qualifiers.
///
/// `"Song (Live) (feat. X)"` becomes `"Song  (feat. X)"`; non-qualifier
/// groups are kept verbatim.
pub fn strip_qualifier_parens(title: &str) -> String {
    PAREN_GROUP
        .replace_all(title, |caps: &regex::Captures<'_>| {
            if is_qualifier(&caps[1]) {
                String::new()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Drop a trailing `" - ..."` segment when it is a qualifier or a year.
///
/// Only the first separator splits; `"A - B - Live"` keeps `"A"` because
/// the trailing segment `"B - Live"` mentions a qualifier.
pub fn strip_trailing_qualifiers(title: &str) -> String {
    match title.split_once(" - ") {
        Some((left, right)) if is_qualifier(right) || YEAR.is_match(right) => left.to_string(),
        _ => title.to_string(),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title variants to try against an external search index.
///
/// The first candidate has qualifiers stripped; the second additionally
/// drops every parenthesized group. Duplicates and empty strings are
/// removed, so the result holds one or two entries (none for a blank
/// title).
pub fn title_candidates(title: &str) -> Vec<String> {
    let keep = collapse_whitespace(&strip_trailing_qualifiers(&strip_qualifier_parens(title)));
    let drop_all = collapse_whitespace(&ANY_PAREN_GROUP.replace_all(&keep, ""));

    let mut candidates: Vec<String> = Vec::with_capacity(2);
    for candidate in [keep, drop_all] {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

/// Normalized, whitespace-separated token set.
pub fn tokens(s: &str) -> HashSet<String> {
    normalize(s)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Jaccard similarity of two token sets.
///
/// The union is floored at one, so two empty sets score 0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = (a.len() + b.len() - intersection).max(1);
    intersection as f64 / union as f64
}

/// Permissive artist comparison: equal after normalization, or one
/// contains the other ("Artist" vs "Artist feat. X").
///
/// A blank name on either side never matches.
pub fn artists_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}
