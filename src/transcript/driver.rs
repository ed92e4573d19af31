//! Courier name detection.

use regex::Regex;
use std::collections::HashSet;

/// Finds one of a configured set of courier names in free text.
///
/// Names match as whole words only, so "Francisco" never counts as "FRANCIS".
#[derive(Debug, Clone)]
pub struct DriverDetector {
    names: Vec<String>,
    pattern: Option<Regex>,
}

impl DriverDetector {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, regex::Error> {
        let mut seen = HashSet::new();
        let names: Vec<String> = names
            .iter()
            .map(|n| n.as_ref().trim().to_uppercase())
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();

        let pattern = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"\b(?:{})\b", alternation))?)
        };

        Ok(Self { names, pattern })
    }

    /// Canonical (upper-case) names this detector knows.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The leftmost courier name in `text`.
    pub fn detect(&self, text: &str) -> Option<&str> {
        let pattern = self.pattern.as_ref()?;
        let upper = text.to_uppercase();
        let found = pattern.find(&upper)?;
        self.canonical(found.as_str())
    }

    /// Every distinct courier name in `text`, in order of first appearance.
    pub fn detect_all(&self, text: &str) -> Vec<&str> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        let upper = text.to_uppercase();
        let mut found: Vec<&str> = Vec::new();
        for m in pattern.find_iter(&upper) {
            if let Some(name) = self.canonical(m.as_str()) {
                if !found.contains(&name) {
                    found.push(name);
                }
            }
        }
        found
    }

    fn canonical(&self, matched: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|n| n.as_str() == matched)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> DriverDetector {
        DriverDetector::new(&["RAFA", "FRANCIS", "RODRIGO", "KAROL", "ARTHUR"]).unwrap()
    }

    #[test]
    fn test_detect_case_insensitive() {
        assert_eq!(detector().detect("Essas foram da Rodrigo"), Some("RODRIGO"));
        assert_eq!(detector().detect("karol"), Some("KAROL"));
    }

    #[test]
    fn test_detect_whole_word_only() {
        assert_eq!(detector().detect("Francisco levou"), None);
        assert_eq!(detector().detect("Rafael"), None);
        assert_eq!(detector().detect("Francis levou"), Some("FRANCIS"));
    }

    #[test]
    fn test_detect_punctuation_boundaries() {
        assert_eq!(detector().detect("(Arthur), quinta"), Some("ARTHUR"));
    }

    #[test]
    fn test_detect_leftmost() {
        assert_eq!(detector().detect("Karol e Rafa"), Some("KAROL"));
    }

    #[test]
    fn test_detect_all_distinct_in_order() {
        assert_eq!(
            detector().detect_all("Rafa, Karol e rafa de novo"),
            vec!["RAFA", "KAROL"]
        );
    }

    #[test]
    fn test_detect_none() {
        assert_eq!(detector().detect("2x Produto A"), None);
        assert!(detector().detect_all("").is_empty());
    }

    #[test]
    fn test_custom_names() {
        let d = DriverDetector::new(&["ana", " Beto "]).unwrap();
        assert_eq!(d.names(), &["ANA".to_string(), "BETO".to_string()]);
        assert_eq!(d.detect("foi o beto"), Some("BETO"));
    }

    #[test]
    fn test_duplicate_names_collapsed() {
        let d = DriverDetector::new(&["RAFA", "KAROL", "rafa", " Karol"]).unwrap();
        assert_eq!(d.names(), &["RAFA".to_string(), "KAROL".to_string()]);
    }

    #[test]
    fn test_empty_name_set_never_matches() {
        let d = DriverDetector::new::<&str>(&[]).unwrap();
        assert_eq!(d.detect("Rafa"), None);
    }
}
