use serde_json::{Map, Value};

/// Normalizes string-typed values after a permissive parse: all-digit
/// strings become integers, `"true"`/`"false"` (any case) become booleans.
/// Everything else passes through unchanged.
pub fn refine_values(arguments: Map<String, Value>) -> Map<String, Value> {
    arguments
        .into_iter()
        .map(|(key, value)| (key, refine_value(value)))
        .collect()
}

fn refine_value(value: Value) -> Value {
    let Value::String(text) = value else {
        return value;
    };
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(number) = text.parse::<i64>() {
            return Value::from(number);
        }
    }
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(text)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fixture_map(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_digit_strings_become_integers() {
        let fixture = fixture_map(&[("days_late", json!("15"))]);
        let actual = refine_values(fixture);
        assert_eq!(actual.get("days_late"), Some(&json!(15)));
    }

    #[test]
    fn test_boolean_strings_become_booleans() {
        let fixture = fixture_map(&[("a", json!("True")), ("b", json!("false"))]);
        let actual = refine_values(fixture);

        assert_eq!(actual.get("a"), Some(&json!(true)));
        assert_eq!(actual.get("b"), Some(&json!(false)));
    }

    #[test]
    fn test_other_values_pass_through() {
        let fixture = fixture_map(&[
            ("label", json!("fifteen")),
            ("count", json!(7)),
            ("decimal", json!("2.5")),
        ]);
        let actual = refine_values(fixture);

        assert_eq!(actual.get("label"), Some(&json!("fifteen")));
        assert_eq!(actual.get("count"), Some(&json!(7)));
        assert_eq!(actual.get("decimal"), Some(&json!("2.5")));
    }

    #[test]
    fn test_huge_digit_string_survives_overflow() {
        let fixture = fixture_map(&[("id", json!("99999999999999999999999999"))]);
        let actual = refine_values(fixture);
        assert_eq!(actual.get("id"), Some(&json!("99999999999999999999999999")));
    }
}
