//! TOON (Token-Oriented Object Notation) encoder.
//!
//! A compact, indentation-based rendering of JSON aimed at LLM prompts.
//! Uniform arrays of flat objects are written as tables with a single field
//! header, which is where most of the token savings come from.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

const INDENT: &str = "  ";
const DELIMITER: char = ',';

fn numeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?$").expect("static regex is valid")
    })
}

fn bare_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("static regex is valid"))
}

/// Encode a JSON value as TOON text.
pub fn encode(value: &Value) -> String {
    let mut lines = Vec::new();

    match value {
        Value::Object(map) => encode_object(map, 0, &mut lines),
        Value::Array(items) => encode_array(None, items, 0, &mut lines),
        primitive => lines.push(encode_primitive(primitive)),
    }

    lines.join("\n")
}

fn indent(depth: usize) -> String {
    INDENT.repeat(depth)
}

fn is_primitive(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s != s.trim()
        || matches!(s, "true" | "false" | "null")
        || numeric_regex().is_match(s)
        || (s.len() > 1 && s.starts_with('0') && s.chars().all(|c| c.is_ascii_digit()))
        || s.starts_with('-')
        || s.chars().any(|c| {
            c == DELIMITER
                || matches!(c, ':' | '"' | '\\' | '[' | ']' | '{' | '}')
                || c.is_control()
        })
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn encode_key(key: &str) -> String {
    if bare_key_regex().is_match(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

fn encode_primitive(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if needs_quotes(s) => quote(s),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn join_primitives(items: &[Value]) -> String {
    items
        .iter()
        .map(encode_primitive)
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

fn encode_object(map: &Map<String, Value>, depth: usize, lines: &mut Vec<String>) {
    for (key, value) in map {
        let key = encode_key(key);
        match value {
            Value::Object(inner) => {
                lines.push(format!("{}{key}:", indent(depth)));
                encode_object(inner, depth + 1, lines);
            }
            Value::Array(items) => encode_array(Some(&key), items, depth, lines),
            primitive => lines.push(format!(
                "{}{key}: {}",
                indent(depth),
                encode_primitive(primitive)
            )),
        }
    }
}

/// Field names shared by every element, when the array can be a table.
fn tabular_fields(items: &[Value]) -> Option<Vec<String>> {
    let first = items.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<String> = first.keys().cloned().collect();

    for item in items {
        let object = item.as_object()?;
        if object.len() != fields.len() {
            return None;
        }
        for field in &fields {
            if !object.get(field).is_some_and(is_primitive) {
                return None;
            }
        }
    }

    Some(fields)
}

fn encode_array(key: Option<&str>, items: &[Value], depth: usize, lines: &mut Vec<String>) {
    let prefix = format!("{}{}", indent(depth), key.unwrap_or(""));
    let len = items.len();

    if items.is_empty() {
        lines.push(format!("{prefix}[0]:"));
        return;
    }

    if items.iter().all(is_primitive) {
        lines.push(format!("{prefix}[{len}]: {}", join_primitives(items)));
        return;
    }

    if let Some(fields) = tabular_fields(items) {
        let header = fields
            .iter()
            .map(|f| encode_key(f))
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string());
        lines.push(format!("{prefix}[{len}]{{{header}}}:"));

        for item in items {
            if let Some(object) = item.as_object() {
                let row: Vec<Value> = fields
                    .iter()
                    .map(|f| object.get(f).cloned().unwrap_or(Value::Null))
                    .collect();
                lines.push(format!("{}{}", indent(depth + 1), join_primitives(&row)));
            }
        }
        return;
    }

    lines.push(format!("{prefix}[{len}]:"));
    for item in items {
        encode_list_item(item, depth + 1, lines);
    }
}

/// Write one `- ` entry of an expanded list.
///
/// Complex items are rendered one level deeper than the hyphen so that the
/// hyphen and its trailing space line up with that indentation; the first
/// rendered line is then moved onto the hyphen line.
fn encode_list_item(item: &Value, depth: usize, lines: &mut Vec<String>) {
    let hyphen = format!("{}- ", indent(depth));

    let mut nested = Vec::new();
    match item {
        Value::Object(map) if map.is_empty() => {
            lines.push(format!("{}-", indent(depth)));
            return;
        }
        Value::Object(map) => encode_object(map, depth + 1, &mut nested),
        Value::Array(inner) => encode_array(None, inner, depth + 1, &mut nested),
        primitive => {
            lines.push(format!("{hyphen}{}", encode_primitive(primitive)));
            return;
        }
    }

    let inner_indent = indent(depth + 1);
    for (i, line) in nested.into_iter().enumerate() {
        if i == 0 {
            let content = line.strip_prefix(inner_indent.as_str()).unwrap_or(&line);
            lines.push(format!("{hyphen}{content}"));
        } else {
            lines.push(line);
        }
    }
}
