use serde_json::{Map, Value};

use crate::error::{ArgsError, Result};
use crate::balanced_object;

/// Parses a permissive dict-literal payload, the notation older execution
/// logs use for tool arguments: single-quoted keys and values, capitalized
/// `True`/`False`/`None`.
///
/// The payload is first narrowed to its balanced `{...}` span, then coerced
/// to strict JSON: single-quote delimiters become double quotes and the
/// literals are rewritten case-sensitively, before a structural parse.
pub fn from_dict_repr(payload: &str) -> Result<Map<String, Value>> {
    let span = balanced_object(payload).ok_or(ArgsError::MissingObject)?;
    let coerced = span
        .replace('\'', "\"")
        .replace("True", "true")
        .replace("False", "false")
        .replace("None", "null");

    match serde_json::from_str::<Value>(&coerced)? {
        Value::Object(map) => Ok(map),
        _ => Err(ArgsError::MissingObject),
    }
}
