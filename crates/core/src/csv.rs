//! CSV to JSON with path-addressed headers.
//!
//! A header such as `user.name` or `items[0].id` is read as a path into a
//! nested structure, so each data row becomes one nested JSON object.

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// Largest array index a header may address. Gaps are padded with `null`, so
/// the index bounds the memory a single cell can claim.
pub const MAX_ARRAY_INDEX: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Use headers verbatim instead of expanding them into paths.
    pub flat: bool,
    /// Turn numeric, boolean and empty cells into typed JSON values.
    pub infer: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            flat: false,
            infer: false,
        }
    }
}

/// Parse a header like `a.b[0][1].c` into path segments.
pub fn parse_path(header: &str) -> Result<Vec<PathSegment>> {
    let invalid = |reason: &str| Error::invalid(format!("invalid header '{header}': {reason}"));

    let mut segments = Vec::new();
    for part in header.split('.') {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if key.is_empty() {
            return Err(invalid("empty key"));
        }
        if key.contains(']') {
            return Err(invalid("unbalanced brackets"));
        }
        segments.push(PathSegment::Key(key.to_string()));

        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(|| invalid("unbalanced brackets"))?;
            if !rest.starts_with('[') {
                return Err(invalid("unexpected characters after index"));
            }
            let index = rest[1..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("array index must be a non-negative integer"))?;
            if index > MAX_ARRAY_INDEX {
                return Err(invalid(&format!("array index must not exceed {MAX_ARRAY_INDEX}")));
            }
            segments.push(PathSegment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    Ok(segments)
}

/// Write `value` into `target` along `path`, creating containers on demand.
///
/// Arrays are padded with `null` up to the requested index. A scalar that is
/// in the way of a container is replaced by it.
pub fn insert_at_path(target: &mut Value, path: &[PathSegment], value: Value) -> Result<()> {
    let Some((head, tail)) = path.split_first() else {
        *target = value;
        return Ok(());
    };

    match head {
        PathSegment::Key(key) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                let slot = map.entry(key.clone()).or_insert(Value::Null);
                insert_at_path(slot, tail, value)?;
            }
        }
        PathSegment::Index(index) => {
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            if let Value::Array(items) = target {
                if items.len() <= *index {
                    let len = index
                        .checked_add(1)
                        .ok_or_else(|| Error::invalid(format!("array index {index} is too large")))?;
                    items.resize(len, Value::Null);
                }
                insert_at_path(&mut items[*index], tail, value)?;
            }
        }
    }

    Ok(())
}

fn infer_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            if trimmed.chars().any(|c| c == '.' || c == 'e' || c == 'E') {
                return Value::Number(n);
            }
        }
    }
    Value::String(cell.to_string())
}

/// Convert CSV text into a JSON array with one object per data row.
pub fn csv_to_json(text: &str, options: &CsvOptions) -> Result<Value> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::parse("CSV", e))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(Error::parse("CSV", "missing header row"));
    }

    let paths = headers
        .iter()
        .map(|header| {
            if options.flat {
                Ok(vec![PathSegment::Key(header.clone())])
            } else {
                parse_path(header)
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::parse("CSV", e))?;
        let mut row = Value::Object(Map::new());

        for (path, cell) in paths.iter().zip(record.iter()) {
            let value = if options.infer {
                infer_value(cell)
            } else {
                Value::String(cell.to_string())
            };
            insert_at_path(&mut row, path, value)?;
        }

        rows.push(row);
    }

    Ok(Value::Array(rows))
}
