//! Best-effort repair of malformed JSON.
//!
//! Handles the usual suspects from hand-edited files and LLM output: comments,
//! single quotes, unquoted keys, Python literals, trailing or missing commas,
//! truncated documents, Markdown code fences and JSONP wrappers.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Deepest container nesting accepted. Stays under the `serde_json` recursion
/// limit used to verify the output.
pub const MAX_DEPTH: usize = 100;

fn jsonp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*[A-Za-z_$][\w$.]*\s*\((.*)\)\s*;?\s*$").expect("static regex is valid")
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };

    // Drop the info string (```json) up to the first newline
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body)
}

fn strip_jsonp(text: &str) -> &str {
    match jsonp_regex().captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text,
    }
}

struct Repairer {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    too_deep: bool,
}

impl Repairer {
    fn new(text: &str) -> Self {
        Repairer {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
            too_deep: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == '/' && self.peek_at(1) == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else if c == '/' && self.peek_at(1) == Some('*') {
                self.pos += 2;
                while !self.at_end() {
                    if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Parse one value. Returns `None` when the current character cannot
    /// start a value; in that case it has been consumed.
    fn parse_value(&mut self) -> Option<String> {
        self.skip_whitespace_and_comments();
        let c = self.peek()?;

        match c {
            '{' | '[' if self.depth >= MAX_DEPTH => {
                self.too_deep = true;
                self.pos = self.chars.len();
                Some("null".to_string())
            }
            '{' | '[' => {
                self.depth += 1;
                let value = if c == '{' {
                    self.parse_object()
                } else {
                    self.parse_array()
                };
                self.depth -= 1;
                Some(value)
            }
            '"' | '\'' | '\u{201c}' | '\u{2018}' => Some(self.parse_string()),
            '-' | '+' | '.' | '0'..='9' => Some(self.parse_number()),
            c if c.is_alphabetic() || c == '_' || c == '$' => Some(self.parse_bare_value()),
            _ => {
                self.pos += 1;
                None
            }
        }
    }

    fn parse_object(&mut self) -> String {
        self.pos += 1;
        let mut out = String::from("{");
        let mut first = true;

        loop {
            self.skip_whitespace_and_comments();
            let Some(c) = self.peek() else { break };

            match c {
                '}' | ']' => {
                    self.pos += 1;
                    break;
                }
                ',' | ';' => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let key = match c {
                '"' | '\'' | '\u{201c}' | '\u{2018}' => self.parse_string(),
                _ => match self.parse_bare_key() {
                    Some(key) => key,
                    None => {
                        self.pos += 1;
                        continue;
                    }
                },
            };

            self.skip_whitespace_and_comments();
            if self.peek() == Some(':') || self.peek() == Some('=') {
                self.pos += 1;
            }
            self.skip_whitespace_and_comments();

            let value = match self.peek() {
                None | Some(',') | Some('}') => "null".to_string(),
                _ => self.parse_value().unwrap_or_else(|| "null".to_string()),
            };

            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&key);
            out.push(':');
            out.push_str(&value);
        }

        out.push('}');
        out
    }

    fn parse_array(&mut self) -> String {
        self.pos += 1;
        let mut out = String::from("[");
        let mut first = true;

        loop {
            self.skip_whitespace_and_comments();
            let Some(c) = self.peek() else { break };

            match c {
                ']' | '}' => {
                    self.pos += 1;
                    break;
                }
                ',' => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            if let Some(value) = self.parse_value() {
                if !first {
                    out.push(',');
                }
                first = false;
                out.push_str(&value);
            }
        }

        out.push(']');
        out
    }

    fn parse_string(&mut self) -> String {
        let open = self.chars[self.pos];
        let close = match open {
            '\u{201c}' => '\u{201d}',
            '\u{2018}' => '\u{2019}',
            other => other,
        };
        self.pos += 1;

        let mut out = String::from("\"");
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                c if c == close => break,
                '\\' => match self.peek() {
                    Some(next @ ('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u')) => {
                        self.pos += 1;
                        out.push('\\');
                        out.push(next);
                    }
                    Some('\'') => {
                        self.pos += 1;
                        out.push('\'');
                    }
                    _ => out.push_str("\\\\"),
                },
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
                c => out.push(c),
            }
        }
        out.push('"');
        out
    }

    fn parse_number(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let raw: String = self.chars[start..self.pos].iter().collect();

        // -Infinity, +Infinity
        if matches!(raw.as_str(), "-" | "+")
            && self.peek().is_some_and(|c| c.is_alphabetic())
        {
            let _ = self.parse_bare_value();
            return "null".to_string();
        }

        let mut fixed = raw.trim_start_matches('+').to_string();
        if fixed.starts_with('.') {
            fixed.insert(0, '0');
        } else if fixed.starts_with("-.") {
            fixed.insert(1, '0');
        }
        if fixed.ends_with(['.', 'e', 'E', '-', '+']) {
            fixed.push('0');
        }
        let (sign, digits) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest.to_string()),
            None => ("", fixed.clone()),
        };
        let trimmed_zeros = digits.trim_start_matches('0');
        let digits = if trimmed_zeros.is_empty() || trimmed_zeros.starts_with(['.', 'e', 'E']) {
            format!("0{trimmed_zeros}")
        } else {
            trimmed_zeros.to_string()
        };
        let fixed = format!("{sign}{digits}");

        if serde_json::from_str::<serde_json::Number>(&fixed).is_ok() {
            fixed
        } else {
            quote_json(&raw)
        }
    }

    fn parse_bare_value(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | '}' | ']' | '\n' | '\r') {
                break;
            }
            if c == '/' && matches!(self.peek_at(1), Some('/') | Some('*')) {
                break;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        let raw = raw.trim();

        match raw {
            "true" | "True" | "TRUE" => "true".to_string(),
            "false" | "False" | "FALSE" => "false".to_string(),
            "null" | "None" | "NULL" | "nil" | "undefined" | "NaN" | "Infinity" => {
                "null".to_string()
            }
            other => quote_json(other),
        }
    }

    fn parse_bare_key(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ':' | '=' | ',' | '{' | '}' | '[' | ']') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        Some(quote_json(&raw))
    }
}

fn quote_json(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Repair `text` into valid, compact JSON.
///
/// Several top-level values (newline-delimited JSON) are collected into an
/// array. The output is checked with `serde_json` before it is returned.
pub fn repair(text: &str) -> Result<String> {
    let text = strip_jsonp(strip_code_fence(text));
    if text.trim().is_empty() {
        return Err(Error::invalid("nothing to repair, input is empty"));
    }

    let mut repairer = Repairer::new(text);
    let mut values = Vec::new();

    loop {
        repairer.skip_whitespace_and_comments();
        if repairer.at_end() {
            break;
        }
        if let Some(value) = repairer.parse_value() {
            values.push(value);
        }
    }

    if repairer.too_deep {
        return Err(Error::invalid(format!(
            "nesting deeper than {MAX_DEPTH} levels"
        )));
    }

    let output = match values.len() {
        0 => return Err(Error::invalid("no JSON value found in input")),
        1 => values.remove(0),
        _ => format!("[{}]", values.join(",")),
    };

    serde_json::from_str::<serde_json::Value>(&output)
        .map_err(|e| Error::parse("JSON", format!("unable to repair document: {e}")))?;

    Ok(output)
}
