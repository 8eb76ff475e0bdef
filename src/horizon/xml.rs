//! XML to document tree decoding
//!
//! Converts an XML body into the same `serde_json::Value` tree the JSON
//! endpoints produce, so one set of metric tables works for both:
//!
//! - the root element becomes a single-key mapping `{root: ...}`
//! - attributes are stored under `@name` keys
//! - child elements are stored under their tag name; repeated siblings
//!   collapse into a sequence in document order
//! - an element with only text becomes a string, an empty element `null`
//! - text next to attributes or children is stored under `#text`

use crate::error::{ExporterError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Reserved key prefix for attributes
pub const ATTRIBUTE_PREFIX: char = '@';

/// Key for text content mixed with attributes or children
pub const TEXT_KEY: &str = "#text";

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ExporterError::Xml(e.to_string()))?;
            let key = format!(
                "{}{}",
                ATTRIBUTE_PREFIX,
                String::from_utf8_lossy(attr.key.as_ref())
            );
            let value = attr
                .unescape_value()
                .map_err(|e| ExporterError::Xml(e.to_string()))?;
            children.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = match (self.children.is_empty(), text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(text.to_string()),
            (false, true) => Value::Object(self.children),
            (false, false) => {
                let mut children = self.children;
                children.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
                Value::Object(children)
            }
        };
        (self.name, value)
    }
}

/// Insert `value` under `key`, turning repeated keys into a sequence
fn insert_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

/// Decode an XML document into a document tree
pub fn parse(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ExporterError::Xml(format!("at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                finish_element(&mut stack, &mut root, name, value)?;
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| ExporterError::Xml(e.to_string()))?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ExporterError::Xml("unbalanced closing tag".to_string()))?;
                let (name, value) = frame.close();
                finish_element(&mut stack, &mut root, name, value)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ExporterError::Xml("document ended inside an element".to_string()));
    }
    root.ok_or_else(|| ExporterError::Xml("document has no root element".to_string()))
}

fn finish_element(
    stack: &mut [Frame],
    root: &mut Option<Value>,
    name: String,
    value: Value,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            insert_child(&mut parent.children, name, value);
            Ok(())
        }
        None if root.is_none() => {
            let mut map = Map::new();
            map.insert(name, value);
            *root = Some(Value::Object(map));
            Ok(())
        }
        None => Err(ExporterError::Xml("more than one root element".to_string())),
    }
}
