//! Block name filters
//!
//! Patterns use AutoCAD-style wildcards: `*` matches any run of characters
//! (including none) and `?` matches exactly one. Matching is case-insensitive
//! and anchored to the whole name. A name passes the filter if any pattern
//! matches it; a filter with no patterns passes everything.

use argus_error::ArgusError;
use log::{debug, warn};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct NamePattern {
    pub source: String,
    pub regex: Regex,
}

impl NamePattern {
    pub fn compile(pattern: &str) -> Result<Self, ArgusError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(ArgusError::malformed_filter("Empty filter pattern"));
        }
        let regex = Regex::new(&wildcard_to_regex(trimmed)).map_err(|e| {
            ArgusError::malformed_filter(format!("Invalid filter pattern '{trimmed}': {e}"))
        })?;
        Ok(Self {
            source: trimmed.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    patterns: Vec<NamePattern>,
}

impl NameFilter {
    /// A filter that accepts every name
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Compile each pattern independently, dropping the ones that are unusable
    pub fn compile<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for pattern in patterns {
            match NamePattern::compile(pattern.as_ref()) {
                Ok(p) => compiled.push(p),
                Err(e) if pattern.as_ref().trim().is_empty() => {
                    debug!("Dropping filter pattern: {}", e.user_message());
                }
                Err(e) => warn!("Dropping filter pattern: {}", e.user_message()),
            }
        }
        debug!("Compiled {} filter pattern(s)", compiled.len());
        Self { patterns: compiled }
    }

    /// Compile a comma-separated pattern list such as `"VALVE*, PUMP-?"`
    pub fn parse_list(list: &str) -> Self {
        Self::compile(list.split(','))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.is_match(name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[NamePattern] {
        &self.patterns
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?i)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcards() {
        let filter = NameFilter::compile(["VALVE*", "PUMP-?"]);
        assert!(filter.matches("VALVE-100"));
        assert!(filter.matches("valve"));
        assert!(filter.matches("PUMP-A"));
        assert!(!filter.matches("PUMP-AB"));
        assert!(!filter.matches("TANK-1"));
        assert!(!filter.matches("XVALVE"));
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = NameFilter::compile(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(filter.matches("ANYTHING"));
        assert!(NameFilter::accept_all().matches(""));
    }

    #[test]
    fn test_parse_list_drops_blank_entries() {
        let filter = NameFilter::parse_list(" VALVE* ,, ,TANK");
        assert_eq!(filter.patterns().len(), 2);
        assert_eq!(filter.patterns()[0].source, "VALVE*");
        assert!(filter.matches("tank"));
        assert!(!filter.matches("TANK-1"));
    }

    #[test]
    fn test_only_blank_patterns_means_no_filtering() {
        let filter = NameFilter::parse_list(" , ");
        assert!(filter.is_empty());
        assert!(filter.matches("TANK-1"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let filter = NameFilter::compile(["V.1(A)+"]);
        assert!(filter.matches("V.1(A)+"));
        assert!(!filter.matches("VX1AA"));
    }

    #[test]
    fn test_blank_pattern_is_malformed() {
        let err = NamePattern::compile("  ").unwrap_err();
        assert!(!err.is_fatal());
    }
}
