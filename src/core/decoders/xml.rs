//! XML decoder
//!
//! Documents must start with an `<?xml` prolog. Elements may carry three
//! validation attributes:
//!
//! | attribute | rule |
//! |---|---|
//! | `required="true"` | content must not be empty |
//! | `size="N"` | content at most N characters |
//! | `maxvalue="N"` | numeric content at most N |
//!
//! After validation the document is re-serialized as canonical tagged text
//! without comments, attributes or namespace prefixes. The root element is
//! either a single `Record` or a wrapper whose `Record` children are the
//! records.

use super::{text, DecodeOptions, Decoded, Decoder};
use crate::domain::record::push_element;
use crate::domain::{InputFormat, PharmaGateError, Result, TableType};
use roxmltree::{Document, Node};

/// Required document prefix
pub const PROLOG: &str = "<?xml";

const RECORD: &str = "Record";

/// Decoder for XML documents in canonical record shape
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlDecoder;

impl Decoder for XmlDecoder {
    fn format(&self) -> InputFormat {
        InputFormat::Xml
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let mut queue = options.queue();
        for record in to_tagged(&text(raw))? {
            queue.push_tagged(record);
        }
        Ok(Decoded::single(queue))
    }
}

/// Validates an XML document and returns its records as canonical tagged text
///
/// # Errors
///
/// - `MalformedRecord` when the prolog or every `Record` element is missing,
///   or a record has no recognizable `Table`
/// - `MissingRequiredField`, `FieldOverflow`, `NumericOverflow` for the
///   validation attributes
/// - `Serialization` when the document is not well-formed
pub fn to_tagged(document: &str) -> Result<Vec<String>> {
    let body = document.trim_start_matches('\u{feff}').trim_start();
    if !body.starts_with(PROLOG) {
        return Err(PharmaGateError::MalformedRecord(
            "XML input has no <?xml prolog".to_string(),
        ));
    }

    let doc = Document::parse(body)?;
    let root = doc.root_element();

    for node in root.descendants().filter(Node::is_element) {
        validate(node)?;
    }

    let records: Vec<Node> = if is_record(root) {
        vec![root]
    } else {
        root.children().filter(|n| is_record(*n)).collect()
    };
    if records.is_empty() {
        return Err(PharmaGateError::MalformedRecord(format!(
            "XML document <{}> contains no <Record> element",
            root.tag_name().name()
        )));
    }

    records.into_iter().map(serialize_record).collect()
}

fn is_record(node: Node) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(RECORD)
}

/// Direct text content, trimmed
fn content(node: Node) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn validate(node: Node) -> Result<()> {
    let name = node.tag_name().name();
    let value = content(node);

    if node
        .attribute("required")
        .is_some_and(|r| r.trim().eq_ignore_ascii_case("true"))
        && value.is_empty()
        && !node.children().any(|c| c.is_element())
    {
        return Err(PharmaGateError::MissingRequiredField(name.to_string()));
    }

    if let Some(size) = node.attribute("size").and_then(|s| s.trim().parse::<usize>().ok()) {
        let actual = value.chars().count();
        if actual > size {
            return Err(PharmaGateError::FieldOverflow {
                field: name.to_string(),
                size,
                actual,
            });
        }
    }

    if let Some(max) = node
        .attribute("maxvalue")
        .and_then(|m| m.trim().parse::<f64>().ok())
    {
        if let Ok(parsed) = value.parse::<f64>() {
            if parsed > max {
                return Err(PharmaGateError::NumericOverflow {
                    field: name.to_string(),
                    max,
                    value: parsed,
                });
            }
        }
    }

    Ok(())
}

fn serialize_record(record: Node) -> Result<String> {
    let table = record
        .children()
        .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case("Table"))
        .map(content)
        .ok_or_else(|| PharmaGateError::MalformedRecord("<Record> has no <Table>".to_string()))?;
    table
        .parse::<TableType>()
        .map_err(PharmaGateError::MalformedRecord)?;

    let mut out = String::with_capacity(256);
    write_element(&mut out, record);
    Ok(out)
}

fn write_element(out: &mut String, node: Node) {
    let name = node.tag_name().name();
    if node.children().any(|c| c.is_element()) {
        out.push('<');
        out.push_str(name);
        out.push('>');
        for child in node.children().filter(Node::is_element) {
            write_element(out, child);
        }
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    } else {
        push_element(out, name, &content(node));
    }
}
