//! JSON decoder
//!
//! JSON documents are converted to XML and then validated and serialized by
//! the XML path, so both dialects share one set of rules.
//!
//! Conversion:
//! - the top-level object becomes `<Record>` (an object whose only key is
//!   `Record` is unwrapped first)
//! - a top-level array becomes a `<Records>` wrapper, one `<Record>` per item
//! - keys starting with `@` become attributes (`"@required": "true"`)
//! - `#text` sets an element's text next to its attributes
//! - arrays repeat the element once per item

use super::{text, xml, DecodeOptions, Decoded, Decoder};
use crate::domain::record::escape_into;
use crate::domain::{InputFormat, PharmaGateError, Result};
use serde_json::{Map, Value};

/// Decoder for JSON documents in canonical record shape
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn format(&self) -> InputFormat {
        InputFormat::Json
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let value: Value = serde_json::from_str(&text(raw))?;
        let document = to_xml(&value)?;
        tracing::trace!(length = document.len(), "JSON converted to XML");

        let mut queue = options.queue();
        for record in xml::to_tagged(&document)? {
            queue.push_tagged(record);
        }
        Ok(Decoded::single(queue))
    }
}

/// Converts a JSON document to an XML document rooted at `Record`
///
/// # Errors
///
/// Returns `MalformedRecord` when the top-level value is not an object or
/// an array of objects.
pub fn to_xml(value: &Value) -> Result<String> {
    let mut out = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    match value {
        Value::Object(map) => {
            let inner = match map.iter().next() {
                Some((key, Value::Object(inner))) if map.len() == 1 && key == "Record" => inner,
                _ => map,
            };
            write_object(&mut out, "Record", inner);
        }
        Value::Array(items) => {
            out.push_str("<Records>");
            for item in items {
                let Value::Object(map) = item else {
                    return Err(PharmaGateError::MalformedRecord(
                        "JSON record array items must be objects".to_string(),
                    ));
                };
                write_object(&mut out, "Record", map);
            }
            out.push_str("</Records>");
        }
        _ => {
            return Err(PharmaGateError::MalformedRecord(
                "JSON document must be an object or an array of objects".to_string(),
            ))
        }
    }
    Ok(out)
}

fn write_value(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Object(map) => write_object(out, name, map),
        Value::Array(items) => {
            for item in items {
                write_value(out, name, item);
            }
        }
        Value::Null => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        scalar => {
            out.push('<');
            out.push_str(name);
            out.push('>');
            escape_into(out, &scalar_text(scalar));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn write_object(out: &mut String, name: &str, map: &Map<String, Value>) {
    out.push('<');
    out.push_str(name);
    for (key, value) in map {
        if let Some(attr) = key.strip_prefix('@') {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            let mut escaped = String::new();
            escape_into(&mut escaped, &scalar_text(value));
            out.push_str(&escaped.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out.push('>');
    for (key, value) in map {
        match key.as_str() {
            "#text" => escape_into(out, &scalar_text(value)),
            k if k.starts_with('@') => {}
            k => write_value(out, k, value),
        }
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
