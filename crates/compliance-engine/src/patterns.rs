//! Regex patterns and match helpers shared by rules and scanners

use lazy_static::lazy_static;
use regex::Regex;

use crate::flatten::FlatText;

lazy_static! {
    /// Green loan context, including "eligible green" project language
    pub static ref GREEN_LOAN_CONTEXT: Regex =
        Regex::new(r"(?i)green loan|green bond|sustainable finance|eligible green").unwrap();

    /// Narrower green loan context used by the verification rules
    pub static ref GREEN_LOAN_CORE: Regex =
        Regex::new(r"(?i)green loan|green bond|sustainable finance").unwrap();

    /// Mortgage / property credit context
    pub static ref MORTGAGE_CONTEXT: Regex =
        Regex::new(r"(?i)mortgage|hypothek|hipoteca|immobilier|property loan").unwrap();
}

/// Span reported for an anchor placeholder when the anchor phrase is missing
pub const PLACEHOLDER_SPAN_CHARS: usize = 20;

/// A located match, in character offsets of the position-mapped text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// All non-overlapping matches of `pattern` in the position-mapped text
pub fn find_all_matches(flat: &FlatText, pattern: &Regex) -> Vec<TextMatch> {
    pattern
        .find_iter(flat.text())
        .filter(|m| !m.as_str().is_empty())
        .map(|m| to_text_match(flat, m))
        .collect()
}

/// First match of `pattern` in the position-mapped text
pub fn find_first_match(flat: &FlatText, pattern: &Regex) -> Option<TextMatch> {
    pattern
        .find(flat.text())
        .filter(|m| !m.as_str().is_empty())
        .map(|m| to_text_match(flat, m))
}

/// Boolean presence check against the whitespace-collapsed text
pub fn mentions(flat: &FlatText, pattern: &Regex) -> bool {
    pattern.is_match(flat.search_text())
}

/// Anchor on `pattern`, or fall back to the start of the document.
///
/// The fallback carries `placeholder` as its matched text and clamps its span
/// to the text length. An empty document has nothing to anchor to.
pub fn anchor_or_placeholder(
    flat: &FlatText,
    pattern: &Regex,
    placeholder: &str,
) -> Option<TextMatch> {
    if let Some(m) = find_first_match(flat, pattern) {
        return Some(m);
    }
    if flat.is_empty() {
        return None;
    }
    Some(TextMatch {
        text: placeholder.to_string(),
        start: 0,
        end: PLACEHOLDER_SPAN_CHARS.min(flat.len()),
    })
}

pub fn is_green_loan(flat: &FlatText) -> bool {
    mentions(flat, &GREEN_LOAN_CONTEXT)
}

fn to_text_match(flat: &FlatText, m: regex::Match<'_>) -> TextMatch {
    let start = flat.char_offset(m.start());
    let end = flat.char_offset(m.end());
    TextMatch {
        text: m.as_str().to_string(),
        start,
        end,
    }
}
