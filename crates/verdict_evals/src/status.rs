use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use verdict_domain::Status;

lazy_static! {
    /// Most specific first: exact outcome tokens, then pass/fail verb
    /// forms, then the looser approval, validity, and success vocabularies.
    /// The first group with a hit anywhere in the text decides; a text
    /// containing both "approve" and "invalid" therefore canonicalizes via
    /// the approval group. That tie-break is part of this scanner's
    /// contract.
    static ref STATUS_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(PASSED|FAILED|NOT ELIGIBLE|ELIGIBLE)\b").unwrap(),
        Regex::new(r"(?i)\b(passes|pass)\b").unwrap(),
        Regex::new(r"(?i)\b(fails|fail)\b").unwrap(),
        Regex::new(r"(?i)\b(approved?)\b").unwrap(),
        Regex::new(r"(?i)\b(rejected?)\b").unwrap(),
        Regex::new(r"(?i)\b(valid|invalid)\b").unwrap(),
        Regex::new(r"(?i)\b(successful|success)\b").unwrap(),
        Regex::new(r"(?i)\b(unsuccessful)\b").unwrap(),
    ];
}

/// Finds a status token in free text and canonicalizes it through a mapping
/// table. The default table folds the semantic variants onto
/// `PASSED`/`FAILED`; callers may extend or override entries.
#[derive(Debug, Clone)]
pub struct StatusScanner {
    mapping: HashMap<String, String>,
}

impl Default for StatusScanner {
    fn default() -> Self {
        let mapping = [
            ("PASSES", "PASSED"),
            ("PASS", "PASSED"),
            ("FAILS", "FAILED"),
            ("FAIL", "FAILED"),
            ("APPROVED", "PASSED"),
            ("APPROVE", "PASSED"),
            ("REJECTED", "FAILED"),
            ("REJECT", "FAILED"),
            ("VALID", "PASSED"),
            ("INVALID", "FAILED"),
            ("SUCCESSFUL", "PASSED"),
            ("SUCCESS", "PASSED"),
            ("UNSUCCESSFUL", "FAILED"),
        ]
        .into_iter()
        .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
        .collect();
        Self { mapping }
    }
}

impl StatusScanner {
    /// Default table with caller entries merged on top.
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let mut scanner = Self::default();
        for (raw, canonical) in overrides {
            scanner
                .mapping
                .insert(raw.to_string().to_uppercase(), canonical.to_string().to_uppercase());
        }
        scanner
    }

    pub fn scan(&self, text: &str) -> Option<Status> {
        for pattern in STATUS_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(text) {
                let raw = captures.get(1)?.as_str().to_uppercase();
                let canonical = self.mapping.get(&raw).cloned().unwrap_or(raw);
                return Some(Status::new(canonical));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_exact_token_wins() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("Result: NOT ELIGIBLE for the grant.");
        assert_eq!(actual, Some(Status::from("NOT ELIGIBLE")));
    }

    #[test]
    fn test_approved_maps_to_passed() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("Your application was Approved today.");
        assert_eq!(actual, Some(Status::from("PASSED")));
    }

    #[test]
    fn test_approved_and_passed_canonicalize_equal() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("Approved");
        let expected = fixture.scan("The check PASSED");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_rejected_maps_to_failed() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("The proposal was rejected.");
        assert_eq!(actual, Some(Status::from("FAILED")));
    }

    #[test]
    fn test_invalid_maps_to_failed() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("The quorum is invalid.");
        assert_eq!(actual, Some(Status::from("FAILED")));
    }

    #[test]
    fn test_approve_outranks_invalid() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("We approve despite the invalid signature.");
        assert_eq!(actual, Some(Status::from("PASSED")));
    }

    #[test]
    fn test_no_status_in_text() {
        let fixture = StatusScanner::default();
        let actual = fixture.scan("The total comes to $42.");
        assert_eq!(actual, None);
    }

    #[test]
    fn test_override_changes_canonical_label() {
        let fixture = StatusScanner::with_overrides([("ELIGIBLE", "PASSED")]);
        let actual = fixture.scan("You are ELIGIBLE.");
        assert_eq!(actual, Some(Status::from("PASSED")));
    }
}
