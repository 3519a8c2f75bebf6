use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use verdict_domain::{ExtractedInfo, MetricResult, SessionRecord};

use crate::status::StatusScanner;

pub const RESPONSE_THRESHOLD: f64 = 0.7;

/// Tolerance for matching an expected percentage against an actual one.
const PERCENT_TOLERANCE: f64 = 0.1;

/// An `additional_requirements` entry counts as a warning only when it
/// carries cautionary language.
const CAUTION_MARKERS: [&str; 5] =
    ["close to threshold", "verify", "caution", "warning", "alert"];

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"\b\d+(?:,\d{3})*(?:\.\d+)?\b").unwrap();
    static ref PERCENT: Regex = Regex::new(r"(\d+(?:\.\d+)?)%").unwrap();
    static ref AMOUNT: Regex = Regex::new(r"\$([\d,]+(?:\.\d+)?)").unwrap();
    static ref WARNING_SENTENCE: Regex = Regex::new(r"(?i)warning[^.]*\.").unwrap();
}

/// Pulls the comparable facts out of an answer — numbers, percentages,
/// currency amounts, a canonical status, warnings — and scores how closely
/// two such extractions agree.
#[derive(Debug, Clone, Default)]
pub struct ResponseAnalyzer {
    status: StatusScanner,
}

impl ResponseAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(status: StatusScanner) -> Self {
        Self { status }
    }

    /// Extraction from bare text. Warnings come from sentence scanning.
    pub fn extract(&self, text: &str) -> ExtractedInfo {
        ExtractedInfo {
            numbers: NUMBER
                .find_iter(text)
                .filter_map(|m| parse_grouped(m.as_str()))
                .collect(),
            percentages: PERCENT
                .captures_iter(text)
                .filter_map(|c| c[1].parse().ok())
                .collect(),
            amounts: AMOUNT
                .captures_iter(text)
                .filter_map(|c| parse_grouped(&c[1]))
                .collect(),
            status: self.status.scan(text),
            warnings: text_warnings(text),
        }
    }

    /// Extraction for a live turn: when the session log carries a tool's own
    /// JSON response, its structured warnings replace the text scan.
    pub fn extract_with_session(&self, text: &str, session: &SessionRecord) -> ExtractedInfo {
        let mut info = self.extract(text);
        if let Some(warnings) = structured_warnings(session) {
            info.warnings = warnings;
        }
        info
    }

    /// Equal-weight average over the sub-checks that apply. A fact absent
    /// from the expected side contributes no sub-score; warning presence
    /// always applies.
    pub fn similarity(&self, expected: &ExtractedInfo, actual: &ExtractedInfo) -> MetricResult {
        let mut scores = Vec::new();
        let mut reasons = Vec::new();

        match (&expected.status, &actual.status) {
            (Some(e), Some(a)) if e == a => {
                scores.push(1.0);
                reasons.push("Status matches".to_string());
            }
            (Some(e), Some(a)) => {
                scores.push(0.0);
                reasons.push(format!("Status mismatch: expected {e}, got {a}"));
            }
            (Some(e), None) => {
                scores.push(0.0);
                reasons.push(format!("Missing status: expected {e}"));
            }
            _ => {}
        }

        if let (Some(&e0), Some(&a0)) = (expected.amounts.first(), actual.amounts.first()) {
            let accuracy = if e0 > 0.0 {
                (1.0 - (e0 - a0).abs() / e0).max(0.0)
            } else if a0 == 0.0 {
                1.0
            } else {
                0.0
            };
            scores.push(accuracy);
            reasons.push(format!(
                "Main amount accuracy: {accuracy:.2} (expected {e0}, actual {a0})"
            ));
        }

        if !expected.percentages.is_empty() && !actual.percentages.is_empty() {
            let matched = expected
                .percentages
                .iter()
                .filter(|e| {
                    actual
                        .percentages
                        .iter()
                        .any(|a| (**e - *a).abs() < PERCENT_TOLERANCE)
                })
                .count();
            let fraction = matched as f64 / expected.percentages.len() as f64;
            scores.push(fraction);
            reasons.push(format!("Percentage accuracy: {fraction:.2}"));
        }

        if expected.has_warnings() == actual.has_warnings() {
            scores.push(1.0);
            reasons.push("Warning presence matches".to_string());
        } else {
            scores.push(0.5);
            reasons.push("Warning presence mismatch".to_string());
        }

        let overall = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let reason = if reasons.is_empty() {
            "No comparable elements found".to_string()
        } else {
            reasons.join("; ")
        };
        MetricResult::new(overall, reason, RESPONSE_THRESHOLD)
    }
}

/// Warnings from the tool's own JSON-shaped answer, recovered from
/// `Response:` fragments in the execution log. `None` means no structured
/// response was recoverable at all, and the caller should fall back to text
/// scanning; `Some(vec![])` means a response was recovered and carried no
/// warnings.
pub fn structured_warnings(session: &SessionRecord) -> Option<Vec<String>> {
    let mut recovered = false;
    let mut warnings = Vec::new();

    for turn in &session.turns {
        for fragment in &turn.raw_fragments {
            if !(fragment.contains("tool_execution>") && fragment.contains("Response:")) {
                continue;
            }
            let Some(payload) = response_payload(fragment) else {
                continue;
            };
            let Ok(Value::Object(body)) = serde_json::from_str::<Value>(payload) else {
                tracing::debug!("tool response payload is not valid JSON, skipping");
                continue;
            };
            recovered = true;

            if let Some(Value::Array(items)) = body.get("warnings") {
                warnings.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)));
            }
            if let Some(Value::Array(items)) = body.get("additional_requirements") {
                for item in items.iter().filter_map(|v| v.as_str()) {
                    let lowered = item.to_lowercase();
                    if CAUTION_MARKERS.iter().any(|marker| lowered.contains(marker)) {
                        warnings.push(item.to_string());
                    }
                }
            }
        }
    }
    recovered.then_some(warnings)
}

/// The quoted text content inside a logged tool response, e.g.
/// `Response: TextContentItem(text='{"warnings": […]}')`.
fn response_payload(fragment: &str) -> Option<&str> {
    let start = fragment.find("Response:")?;
    let section = &fragment[start + "Response:".len()..];
    let marker = section.find("TextContentItem(text=")?;
    let tail = &section[marker..];
    let open = tail.find('\'')?;
    let close = tail.rfind('\'')?;
    (close > open).then(|| &tail[open + 1..close])
}

fn text_warnings(text: &str) -> Vec<String> {
    if !text.to_lowercase().contains("warning") {
        return Vec::new();
    }
    WARNING_SENTENCE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn parse_grouped(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}
