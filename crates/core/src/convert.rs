//! Format conversion hub.
//!
//! Every supported format is parsed into a `serde_json::Value` and rendered
//! back out from it. Key order is preserved end to end.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::csv::{csv_to_json, CsvOptions};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Xml,
    Csv,
    Toon,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Xml => "XML",
            Format::Csv => "CSV",
            Format::Toon => "TOON",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStyle {
    pub compact: bool,
    pub indent: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            compact: false,
            indent: 2,
        }
    }
}

/// Parse `text` written in `format` into the shared value model.
pub fn parse(format: Format, text: &str) -> Result<Value> {
    match format {
        Format::Json => serde_json::from_str(text).map_err(|e| Error::parse("JSON", e)),
        Format::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| Error::parse("YAML", e))?;
            yaml_to_json(value)
        }
        Format::Toml => {
            let table: toml::Table = text.parse().map_err(|e| Error::parse("TOML", e))?;
            Ok(toml_to_json(toml::Value::Table(table)))
        }
        Format::Xml => crate::xml::xml_to_json(text),
        Format::Csv => csv_to_json(text, &CsvOptions::default()),
        Format::Toon => Err(Error::Unsupported {
            what: "input format",
            value: "TOON is output only".to_string(),
        }),
    }
}

/// Render a value in `format`.
pub fn render(format: Format, value: &Value, style: &RenderStyle) -> Result<String> {
    match format {
        Format::Json => render_json(value, style),
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| Error::serialize("YAML", e)),
        Format::Toml => {
            let table = match json_to_toml(value)? {
                toml::Value::Table(table) => table,
                _ => {
                    return Err(Error::serialize(
                        "TOML",
                        "the document root must be a table (object)",
                    ))
                }
            };
            toml::to_string_pretty(&table).map_err(|e| Error::serialize("TOML", e))
        }
        Format::Xml => {
            let indent = if style.compact { 0 } else { style.indent };
            crate::xml::json_to_xml(value, indent)
        }
        Format::Toon => Ok(crate::toon::encode(value)),
        Format::Csv => Err(Error::Unsupported {
            what: "output format",
            value: "CSV".to_string(),
        }),
    }
}

/// Convert `text` from one format to another.
pub fn convert(text: &str, from: Format, to: Format, style: &RenderStyle) -> Result<String> {
    let value = parse(from, text)?;
    render(to, &value, style)
}

/// Re-render a document in its own format.
///
/// XML is re-indented event by event so that comments, declarations and
/// attribute order survive; the other formats round-trip through the value
/// model.
pub fn reformat(format: Format, text: &str, style: &RenderStyle) -> Result<String> {
    match format {
        Format::Xml => crate::xml::reformat(text, style.indent),
        other => render(other, &parse(other, text)?, style),
    }
}

fn render_json(value: &Value, style: &RenderStyle) -> Result<String> {
    if style.compact {
        return serde_json::to_string(value).map_err(|e| Error::serialize("JSON", e));
    }

    let indent = " ".repeat(style.indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| Error::serialize("JSON", e))?;

    String::from_utf8(buf).map_err(|e| Error::serialize("JSON", e))
}

/// Convert a YAML value, stringifying scalar mapping keys.
pub fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f).map(Value::Number).ok_or_else(|| {
                    Error::parse("YAML", format!("{f} cannot be represented in JSON"))
                })?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Null => "null".to_string(),
                    _ => return Err(Error::parse("YAML", "mapping keys must be scalars")),
                };
                map.insert(key, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

/// Convert a TOML value; date-times become RFC 3339 strings.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert a JSON value into TOML. TOML has no null, so nulls are rejected.
pub fn json_to_toml(value: &Value) -> Result<toml::Value> {
    Ok(match value {
        Value::Null => {
            return Err(Error::serialize(
                "TOML",
                "null values cannot be represented in TOML",
            ))
        }
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                toml::Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                toml::Value::Float(f)
            } else {
                return Err(Error::serialize("TOML", format!("number {n} is out of range")));
            }
        }
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(items) => toml::Value::Array(
            items
                .iter()
                .map(json_to_toml)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(map) => {
            let mut table = toml::Table::new();
            for (key, value) in map {
                table.insert(key.clone(), json_to_toml(value)?);
            }
            toml::Value::Table(table)
        }
    })
}
