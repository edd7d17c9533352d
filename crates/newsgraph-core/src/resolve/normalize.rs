//! Canonical-name normalization for entity matching.
//!
//! Two levels of normalization are used by the engine:
//!
//! - [`fold`] — case and whitespace folding only. This is the form stored
//!   as `normalized_text` on mentions and recorded as an alias on merges.
//! - [`canonicalize`] — the full canonical form: titles and honorifics
//!   stripped, generational suffixes handled, multi-token names collapsed
//!   to "first last". This is the form used as a KB entry's canonical
//!   name and as the matcher probe.
//!
//! Both are pure, deterministic, and idempotent.

/// Titles and honorifics removed wherever they occur in a name.
const TITLES: &[&str] = &[
    "mr.",
    "mrs.",
    "ms.",
    "mx.",
    "dr.",
    "prof.",
    "hon.",
    "sir",
    "dame",
    "mayor",
    "councilmember",
    "councilperson",
    "president",
    "governor",
    "senator",
    "representative",
    "judge",
    "attorney",
    "lawyer",
    "doctor",
    "professor",
];

/// Two-token title phrases removed as a unit.
const TWO_WORD_TITLES: &[(&str, &str)] = &[("prime", "minister"), ("vice", "president")];

/// Trailing generational suffixes.
const SUFFIXES: &[&str] = &["jr.", "sr.", "ii", "iii", "iv", "v"];

/// Lower-case and collapse internal whitespace.
///
/// `fold(fold(s)) == fold(s)` for all strings.
pub fn fold(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Produce the canonical comparable form of an entity name.
///
/// Lower-cases, tokenizes on whitespace, removes title tokens wherever
/// they occur, then collapses:
///
/// - last token is a generational suffix and more than two tokens
///   survive → `"first second-to-last suffix"`;
/// - at least two tokens survive → `"first last"`;
/// - otherwise → whatever remains (possibly the empty string).
///
/// Idempotent: `canonicalize(canonicalize(s)) == canonicalize(s)`.
///
/// # Examples
///
/// ```
/// use newsgraph_core::resolve::normalize::canonicalize;
///
/// assert_eq!(canonicalize("Dr. John Doe"), "john doe");
/// assert_eq!(canonicalize("Mayor Jacob Frey"), "jacob frey");
/// assert_eq!(canonicalize("Ms. Jane Smith Jr."), "jane smith jr.");
/// ```
pub fn canonicalize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let filtered = strip_titles(&tokens);

    if filtered.len() >= 2 {
        let first = filtered[0];
        let last = filtered[filtered.len() - 1];
        if SUFFIXES.contains(&last) && filtered.len() > 2 {
            return format!("{} {} {}", first, filtered[filtered.len() - 2], last);
        }
        return format!("{} {}", first, last);
    }
    filtered.join(" ")
}

/// Remove title tokens, including two-token title phrases.
fn strip_titles<'a>(tokens: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if i + 1 < tokens.len()
            && TWO_WORD_TITLES
                .iter()
                .any(|(a, b)| *a == tokens[i] && *b == tokens[i + 1])
        {
            i += 2;
            continue;
        }
        if TITLES.contains(&tokens[i]) {
            i += 1;
            continue;
        }
        out.push(tokens[i]);
        i += 1;
    }
    out
}
