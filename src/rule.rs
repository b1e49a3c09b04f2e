//! Filter rule classification
//!
//! A line is a rule when it is bounded by `||` and `^`, like
//! `||ads.example.com^`. Nothing between the boundaries is parsed.

/// Prefix every deduplicated rule starts with
pub const RULE_PREFIX: &str = "||";

/// Suffix every deduplicated rule ends with
pub const RULE_SUFFIX: &str = "^";

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `||...^` line, subject to deduplication
    Rule,
    /// Comment, header, blank or malformed line, always kept
    Other,
}

impl LineKind {
    pub fn is_rule(self) -> bool {
        self == Self::Rule
    }
}

/// Remove every trailing `\r` and `\n` from a line
#[inline]
pub fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Classify a line that has already had its terminator stripped
#[inline]
pub fn classify(line: &str) -> LineKind {
    if is_rule(line) {
        LineKind::Rule
    } else {
        LineKind::Other
    }
}

/// Check the `||` / `^` boundaries
#[inline]
pub fn is_rule(line: &str) -> bool {
    line.starts_with(RULE_PREFIX) && line.ends_with(RULE_SUFFIX)
}
