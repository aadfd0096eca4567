//! Splitting a lecture artifact into per-slide segments.
//!
//! Extraction tools emit a handful of slide delimiter styles. We try each
//! known delimiter in turn and fall back to paragraph splitting when none
//! matches.

use regex::RegexBuilder;

/// Known slide delimiter patterns, most specific first.
const SLIDE_PATTERNS: &[&str] = &[
    r"---\s*Slide\s+\d+\s*---",
    r"===\s*Slide\s+\d+\s*===",
    r"(?m)^Slide\s+\d+\s*:",
];

/// Split raw artifact text into slide-sized segments.
///
/// Tries each slide delimiter pattern; the first one present in the text
/// wins. Otherwise the text is split on blank lines. Empty segments are
/// dropped here; length filtering happens in the loader.
pub fn split_units(content: &str) -> Vec<String> {
    for pattern in SLIDE_PATTERNS {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .expect("slide pattern is a valid regex");

        if re.is_match(content) {
            return re
                .split(content)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }
    }

    content
        .split("\n\n")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}
