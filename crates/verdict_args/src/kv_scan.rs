use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref KEY_VALUE: Regex = Regex::new(
        r#""([^"]+)"\s*:\s*("[^"]*"|'[^']*'|-?\d+(?:\.\d+)?|true|false|null)"#
    )
    .unwrap();
}

/// Last-resort extraction of `"key": value` pairs straight from undecodable
/// payload text. Values are coerced to int, float, bool, or null where they
/// look like one; everything else stays a trimmed string.
pub fn scan_key_values(payload: &str) -> Map<String, Value> {
    let mut arguments = Map::new();
    for captures in KEY_VALUE.captures_iter(payload) {
        arguments.insert(captures[1].to_string(), coerce_scalar(&captures[2]));
    }
    arguments
}

fn coerce_scalar(raw: &str) -> Value {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let body = trimmed.strip_prefix('-').unwrap_or(trimmed);

    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = trimmed.parse::<i64>() {
            return Value::from(number);
        }
    }
    if !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        if let Ok(number) = trimmed.parse::<f64>() {
            return Value::from(number);
        }
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => Value::String(trimmed.to_string()),
    }
}
