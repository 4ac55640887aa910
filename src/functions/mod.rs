//! Built-in local functions the hosted model can call.

use serde_json::Value;

use crate::types::FunctionDefinition;

pub mod calculator;
pub mod clock;
pub mod dungeon;
pub mod extraction;
pub mod scheduling;
pub mod stocks;
pub mod weather;
pub mod writer;

pub(crate) fn definition(name: &str, description: &str, parameters: Value) -> FunctionDefinition {
    FunctionDefinition {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// Numeric argument; numeric strings are accepted too.
pub(crate) fn number_arg(input: &Value, key: &str) -> Result<f64, String> {
    match input.get(key) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| format!("'{key}' is not a number")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| format!("'{key}' is not a number: {s}")),
        Some(_) => Err(format!("'{key}' is not a number")),
        None => Err(format!("missing argument '{key}'")),
    }
}

/// Whole-number argument falling back to `default` when absent.
pub(crate) fn int_arg_or(input: &Value, key: &str, default: i64) -> Result<i64, String> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(_) => Ok(number_arg(input, key)?.trunc() as i64),
    }
}

pub(crate) fn string_arg(input: &Value, key: &str) -> Result<String, String> {
    text_arg(input, key).ok_or_else(|| format!("missing argument '{key}'"))
}

/// String argument; numbers are rendered, blanks count as absent.
pub(crate) fn text_arg(input: &Value, key: &str) -> Option<String> {
    match input.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Array of strings or a comma separated string.
pub(crate) fn list_arg(input: &Value, key: &str) -> Vec<String> {
    match input.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
