mod braces;
mod dict_repr;
mod error;
mod kv_scan;
mod refine;

pub use braces::balanced_object;
pub use dict_repr::from_dict_repr;
pub use error::{ArgsError, Result};
pub use kv_scan::scan_key_values;
pub use refine::refine_values;

use serde_json::{Map, Value};

/// Recovers an argument mapping from a JSON-ish payload fragment.
///
/// Strict parsing of the longest balanced `{...}` span comes first; when the
/// payload is truncated or otherwise undecodable, a key/value scan over the
/// raw text salvages what it can. An empty map is a total miss, which the
/// caller scores as such rather than treating as an error.
pub fn from_json_fragment(payload: &str) -> Map<String, Value> {
    let Some(span) = balanced_object(payload) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!(kind = %kind_of(&other), "argument payload is not an object, scanning key/value pairs");
            scan_key_values(payload)
        }
        Err(e) => {
            tracing::debug!(error = %e, "argument JSON undecodable, scanning key/value pairs");
            scan_key_values(payload)
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
