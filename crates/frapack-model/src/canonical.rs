//! Stable-key JSON text.
//!
//! Header bytes must be identical for identical input, so objects are always
//! written with keys sorted lexicographically regardless of how the value was
//! built. Two layouts are supported:
//! - compact: no whitespace between tokens
//! - pretty: two-space indentation, one member per line

use serde_json::Value;

/// Writes a JSON value compactly with sorted object keys.
///
/// # Example
/// ```
/// use frapack_model::canonical::to_stable_string;
///
/// let value = serde_json::json!({"b": 1, "a": [1.0, 2.5]});
/// assert_eq!(to_stable_string(&value), r#"{"a":[1,2.5],"b":1}"#);
/// ```
pub fn to_stable_string(value: &Value) -> String {
    let mut out = String::new();
    write_compact(value, &mut out);
    out
}

/// Writes a JSON value with sorted object keys and two-space indentation.
pub fn to_stable_pretty_string(value: &Value) -> String {
    let mut out = String::new();
    write_pretty(value, 0, &mut out);
    out
}

fn sorted_entries(obj: &serde_json::Map<String, Value>) -> Vec<(&String, &Value)> {
    let mut entries: Vec<(&String, &Value)> = obj.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn write_compact(value: &Value, out: &mut String) {
    match value {
        Value::Array(arr) => {
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(item, out);
            }
            out.push(']');
        }
        Value::Object(obj) => {
            out.push('{');
            for (i, (key, item)) in sorted_entries(obj).into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&format_string(key));
                out.push(':');
                write_compact(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&format_scalar(scalar)),
    }
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_pretty(value: &Value, depth: usize, out: &mut String) {
    match value {
        Value::Array(arr) if arr.is_empty() => out.push_str("[]"),
        Value::Object(obj) if obj.is_empty() => out.push_str("{}"),
        Value::Array(arr) => {
            out.push_str("[\n");
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(depth + 1, out);
                write_pretty(item, depth + 1, out);
            }
            out.push('\n');
            push_indent(depth, out);
            out.push(']');
        }
        Value::Object(obj) => {
            out.push_str("{\n");
            for (i, (key, item)) in sorted_entries(obj).into_iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(depth + 1, out);
                out.push_str(&format_string(key));
                out.push_str(": ");
                write_pretty(item, depth + 1, out);
            }
            out.push('\n');
            push_indent(depth, out);
            out.push('}');
        }
        scalar => out.push_str(&format_scalar(scalar)),
    }
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => format_string(s),
        Value::Array(_) | Value::Object(_) => unreachable!("containers are written by the caller"),
    }
}

/// Formats a number. Integral floats are written without a fraction.
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if !f.is_finite() => "null".to_string(),
        Some(f) if f == 0.0 => "0".to_string(),
        // f64 Display is the shortest round-trip form and never uses an exponent
        Some(f) => format!("{}", f),
        None => "null".to_string(),
    }
}

/// Formats a string literal with minimal escaping.
fn format_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\u{08}' => result.push_str("\\b"),
            '\u{0c}' => result.push_str("\\f"),
            c if c < '\x20' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}
