use std::fmt::Display;

/// Canonical status token recovered from response text, e.g. `PASSED`.
/// Always stored uppercase; construction canonicalizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status(String);

impl Status {
    pub fn new(value: impl ToString) -> Self {
        Status(value.to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Status::new(value)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derived view of one text blob. Recomputed per comparison, never cached
/// across turns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedInfo {
    pub numbers: Vec<f64>,
    pub percentages: Vec<f64>,
    pub amounts: Vec<f64>,
    pub status: Option<Status>,
    pub warnings: Vec<String>,
}

impl ExtractedInfo {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_status_canonicalizes_to_uppercase() {
        let actual = Status::new("Passed");
        let expected = Status::from("PASSED");
        assert_eq!(actual, expected);
    }
}
