//! Filtering logic for harness listings
//!
//! Filters harnesses by name, with `*` wildcards.

use kani_harness_parser::FileScan;
use regex::Regex;

/// Keep only harnesses whose name matches `pattern`. Files left with no
/// harnesses and no desyncs are dropped.
pub fn filter_scans(scans: Vec<FileScan>, pattern: Option<&str>) -> Vec<FileScan> {
    let Some(pattern) = pattern else {
        return scans;
    };
    let matcher = NameMatcher::new(pattern);

    scans
        .into_iter()
        .map(|mut scan| {
            scan.harnesses.retain(|h| matcher.matches(&h.name));
            scan.desyncs.retain(|d| matcher.matches(&d.harness));
            scan
        })
        .filter(|scan| !scan.harnesses.is_empty() || !scan.desyncs.is_empty())
        .collect()
}

/// Exact name, or a `*` glob matched against the whole name.
pub enum NameMatcher {
    Exact(String),
    Glob(Regex),
}

impl NameMatcher {
    pub fn new(pattern: &str) -> Self {
        if !pattern.contains('*') {
            return NameMatcher::Exact(pattern.to_string());
        }
        let escaped: Vec<String> = pattern.split('*').map(regex::escape).collect();
        match Regex::new(&format!("^{}$", escaped.join(".*"))) {
            Ok(re) => NameMatcher::Glob(re),
            Err(_) => NameMatcher::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(expected) => name == expected,
            NameMatcher::Glob(re) => re.is_match(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_name() {
        assert!(NameMatcher::new("check_add").matches("check_add"));
        assert!(!NameMatcher::new("check_add").matches("check_add_2"));
        assert!(NameMatcher::new("check_*").matches("check_add"));
        assert!(NameMatcher::new("*_add").matches("check_add"));
        assert!(!NameMatcher::new("*_add").matches("check_sub"));
        assert!(NameMatcher::new("a.b*").matches("a.bc"));
        assert!(!NameMatcher::new("a.b*").matches("axbc"));
    }
}
