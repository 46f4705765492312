//! Title to filter pattern conversion
//!
//! Turns a human-readable title ("The Marvelous Mrs. Maisel", "MasterChef (US)")
//! into the glob patterns autobrr matches release names against. In those
//! patterns `?` stands for exactly one character and `*` for any run.
//!
//! Every rule reads the same cleaned title and contributes its own candidates.
//! No rule ever sees another rule's output.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing release year the Arr apps append, e.g. " (2020)"
static YEAR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+\(\d+\)$").expect("year suffix regex should compile"));

/// Trailing two-letter region tag, e.g. "MasterChef (US)"
static REGION_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*\S)\s+\(([A-Za-z]{2})\)$").expect("region suffix regex should compile")
});

/// Two or more adjacent rule-made wildcards
static MARK_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{E000}\x{E001}]{2,}").expect("marker run regex should compile")
});

const SINGLE_WILDCARD: &str = "?";
const MULTI_WILDCARD: &str = "*";

// Rule-made wildcards stay private-use markers until `render`. Literal `?` and
// `*` in a title are never squeezed.
const SINGLE_MARK: &str = "\u{E000}";
const MULTI_MARK: &str = "\u{E001}";

/// Convert a title into its set of filter patterns.
///
/// With `match_release` every pattern is wrapped in `*` so it matches anywhere
/// in a release name instead of against the parsed show/movie field.
///
/// Empty and whitespace-only titles produce an empty set; any other title
/// produces at least one pattern.
pub fn process_title(title: &str, match_release: bool) -> HashSet<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return HashSet::new();
    }

    let cleaned = YEAR_SUFFIX.replace(trimmed, "");
    let cleaned = cleaned.trim();

    let mut patterns = HashSet::new();

    // Nothing to anchor on, keep it verbatim.
    if !cleaned.chars().any(char::is_alphanumeric) {
        patterns.insert(cleaned.to_string());
        return wrap_all(patterns, match_release);
    }

    let (stem, region) = split_region(cleaned);

    for candidate in candidates(stem) {
        emit(&mut patterns, &render(&candidate), region);
    }

    wrap_all(patterns, match_release)
}

/// Split "Title (US)" into ("Title", Some("US")).
fn split_region(title: &str) -> (&str, Option<&str>) {
    match REGION_SUFFIX.captures(title) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(stem), Some(code)) => (stem.as_str(), Some(code.as_str())),
            _ => (title, None),
        },
        None => (title, None),
    }
}

/// Run every rule against the stem and collect the raw candidates.
///
/// Hyphens are a single-character wildcard in every candidate, so
/// "Nine-Nine" never survives as a literal.
fn candidates(stem: &str) -> Vec<String> {
    let stem = stem.replace('-', SINGLE_MARK);
    let stem = stem.as_str();

    let mut out = vec![collapse_whitespace(stem)];

    // "Mrs. Maisel" -> "Mrs*Maisel", "Mrs?Maisel"
    if stem.contains(". ") {
        out.push(collapse_whitespace(&stem.replace(". ", &SINGLE_MARK.repeat(2))));
        out.push(collapse_whitespace(&stem.replace(". ", " ")));
    }

    // "Master.Chef" -> "Master?Chef", "S.W.A.T." -> "S?W?A?T?"
    if stem.contains('.') {
        out.push(collapse_whitespace(&stem.replace('.', SINGLE_MARK)));
    }

    if stem.contains('!') {
        out.push(collapse_whitespace(&stem.replace('!', SINGLE_MARK)));
    }

    if let Some((left, right)) = stem.split_once(':') {
        out.push(collapse_whitespace(&stem.replace(':', "")));
        out.push(format!(
            "{}{MULTI_MARK}{}",
            collapse_whitespace(left.trim()),
            collapse_whitespace(right.trim())
        ));
    }

    if stem.contains('&') {
        out.push(collapse_whitespace(stem));
        out.push(collapse_whitespace(&stem.replace('&', "and")));
    }

    if stem.contains(['\'', '\u{2019}']) {
        out.push(collapse_whitespace(&stem.replace(['\'', '\u{2019}'], "")));
    }

    out
}

/// Insert a rendered candidate, its form without trailing wildcards and,
/// for region titles, that form joined to the region code.
fn emit(patterns: &mut HashSet<String>, candidate: &str, region: Option<&str>) {
    if candidate.is_empty() {
        return;
    }

    let stripped = candidate.trim_end_matches(['?', '*']);
    if !stripped.is_empty() {
        if let Some(code) = region {
            patterns.insert(format!("{stripped}{MULTI_WILDCARD}{code}"));
        }
        patterns.insert(stripped.to_string());
    }

    patterns.insert(candidate.to_string());
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(SINGLE_MARK)
}

/// Turn markers into wildcards; a run of two or more becomes one `*`.
fn render(s: &str) -> String {
    MARK_RUN
        .replace_all(s, MULTI_WILDCARD)
        .replace(SINGLE_MARK, SINGLE_WILDCARD)
        .replace(MULTI_MARK, MULTI_WILDCARD)
}

fn wrap_all(patterns: HashSet<String>, match_release: bool) -> HashSet<String> {
    if !match_release {
        return patterns;
    }

    patterns
        .into_iter()
        .map(|p| format!("{MULTI_WILDCARD}{p}{MULTI_WILDCARD}"))
        .collect()
}
