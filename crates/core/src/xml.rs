//! XML <-> JSON mapping.
//!
//! Elements become object keys, attributes become `-name` keys and text that
//! sits next to attributes or child elements becomes `#text`. Repeated
//! siblings collapse into arrays. An element with text only maps to a plain
//! string.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub const ATTRIBUTE_PREFIX: char = '-';
pub const TEXT_KEY: &str = "#text";
const WRAPPER: &str = "doc";

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Frame {
            name,
            fields: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        let value = if self.fields.is_empty() {
            Value::String(text)
        } else {
            let mut fields = self.fields;
            if !text.is_empty() {
                fields.insert(TEXT_KEY.to_string(), Value::String(text));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }
}

fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

fn start_frame(e: &BytesStart<'_>) -> Result<Frame> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut frame = Frame::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::parse("XML", e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::parse("XML", e))?
            .into_owned();
        frame
            .fields
            .insert(format!("{ATTRIBUTE_PREFIX}{key}"), Value::String(value));
    }

    Ok(frame)
}

/// Parse an XML document into a JSON value keyed by the root element name.
pub fn xml_to_json(text: &str) -> Result<Value> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut root = Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event().map_err(|e| Error::parse("XML", e))? {
            Event::Start(e) => stack.push(start_frame(&e)?),
            Event::Empty(e) => {
                let (name, value) = start_frame(&e)?.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.fields, name, value),
                    None => insert_child(&mut root, name, value),
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| Error::parse("XML", e))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| Error::parse("XML", "unexpected closing tag"))?;
                let (name, value) = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.fields, name, value),
                    None => insert_child(&mut root, name, value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(Error::parse(
            "XML",
            format!("unexpected end of document, <{}> is not closed", frame.name),
        ));
    }

    if root.is_empty() {
        return Err(Error::parse("XML", "document has no root element"));
    }

    Ok(Value::Object(root))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Element and attribute names must start with a letter, `_` or `:` and
/// continue with letters, digits, `-`, `.`, `_` or `:`.
fn check_name(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == ':' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(Error::serialize("XML", format!("invalid {kind} name '{name}'")))
    }
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &Value,
) -> Result<()> {
    if !value.is_array() {
        check_name("element", name)?;
    }

    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        Value::Null => writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(|e| Error::serialize("XML", e)),
        Value::Object(fields) => {
            let mut start = BytesStart::new(name);
            let mut text = None;
            let mut children = Vec::new();

            for (key, field) in fields {
                if key == TEXT_KEY {
                    text = scalar_text(field);
                } else if let Some(attr) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    check_name("attribute", attr)?;
                    let attr_value = scalar_text(field).unwrap_or_default();
                    start.push_attribute((attr, attr_value.as_str()));
                } else {
                    children.push((key, field));
                }
            }

            if text.is_none() && children.is_empty() {
                return writer
                    .write_event(Event::Empty(start))
                    .map_err(|e| Error::serialize("XML", e));
            }

            writer
                .write_event(Event::Start(start))
                .map_err(|e| Error::serialize("XML", e))?;
            if let Some(text) = text {
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(|e| Error::serialize("XML", e))?;
            }
            for (key, child) in children {
                write_element(writer, key, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(|e| Error::serialize("XML", e))
        }
        scalar => {
            let text = scalar_text(scalar).unwrap_or_default();
            writer
                .write_event(Event::Start(BytesStart::new(name)))
                .map_err(|e| Error::serialize("XML", e))?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(|e| Error::serialize("XML", e))?;
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(|e| Error::serialize("XML", e))
        }
    }
}

/// Serialize a JSON value as XML.
///
/// A single-key object whose value is not an array becomes the root element;
/// anything else is wrapped in `<doc>`, with array items written as `<item>`.
pub fn json_to_xml(value: &Value, indent: usize) -> Result<String> {
    let mut writer = if indent > 0 {
        Writer::new_with_indent(Vec::new(), b' ', indent)
    } else {
        Writer::new(Vec::new())
    };

    match value {
        Value::Object(fields) if fields.len() == 1 => match fields.iter().next() {
            Some((name, inner)) if !inner.is_array() => {
                write_element(&mut writer, name, inner)?;
            }
            _ => write_wrapped(&mut writer, value)?,
        },
        Value::Array(items) => {
            let mut wrapper = Map::new();
            wrapper.insert("item".to_string(), Value::Array(items.clone()));
            write_element(&mut writer, WRAPPER, &Value::Object(wrapper))?;
        }
        other => write_wrapped(&mut writer, other)?,
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::serialize("XML", e))
}

fn write_wrapped<W: std::io::Write>(writer: &mut Writer<W>, value: &Value) -> Result<()> {
    write_element(writer, WRAPPER, value)
}

/// Re-indent an XML document without changing its structure.
pub fn reformat(text: &str, indent: usize) -> Result<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| Error::parse("XML", e))?;
        match &event {
            Event::Eof => break,
            Event::Start(_) => {
                depth += 1;
                seen_root = true;
            }
            Event::Empty(_) => seen_root = true,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }
        writer
            .write_event(event)
            .map_err(|e| Error::serialize("XML", e))?;
    }

    if depth > 0 {
        return Err(Error::parse("XML", "unexpected end of document"));
    }
    if !seen_root {
        return Err(Error::parse("XML", "document has no root element"));
    }

    String::from_utf8(writer.into_inner()).map_err(|e| Error::serialize("XML", e))
}
