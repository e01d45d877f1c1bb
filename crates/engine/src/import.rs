//! System-view XML import
//!
//! Builds a detached tree from a JCR system-view document:
//!
//! ```xml
//! <sv:node sv:name="page" xmlns:sv="http://www.jcp.org/jcr/sv/1.0">
//!   <sv:property sv:name="jcr:primaryType" sv:type="Name">
//!     <sv:value>mgnl:page</sv:value>
//!   </sv:property>
//!   <sv:property sv:name="title" sv:type="String">
//!     <sv:value>Hello</sv:value>
//!   </sv:property>
//! </sv:node>
//! ```
//!
//! `jcr:primaryType`, `jcr:mixinTypes` and `jcr:uuid` map onto the node's
//! primary type, mixins and identifier; every other property is stored as a
//! property of its declared type. Binary values are base64.

use crate::node::Node;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use jcrmock_core::{Error, PropertyType, Result, Value};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use tracing::{debug, warn};

const PRIMARY_TYPE: &str = "jcr:primaryType";
const MIXIN_TYPES: &str = "jcr:mixinTypes";
const UUID: &str = "jcr:uuid";

/// Parse a system-view document into a detached tree
///
/// # Errors
///
/// - `Error::Import` for malformed XML or a document without exactly one
///   top-level `sv:node`
/// - `Error::Format` for values that do not parse as their declared type
/// - `Error::Precondition` for invalid names or duplicate siblings
pub fn import_system_view(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut builder = TreeBuilder::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => builder.start(e, false)?,
            Ok(Event::Empty(ref e)) => builder.start(e, true)?,
            Ok(Event::End(ref e)) => builder.end(e.local_name().as_ref())?,
            Ok(Event::Text(ref t)) => builder.text(&String::from_utf8_lossy(t)),
            Ok(Event::CData(ref t)) => builder.text(&String::from_utf8_lossy(t)),
            Ok(Event::GeneralRef(ref r)) => {
                let entity = resolve_entity(&String::from_utf8_lossy(r))?;
                builder.text(entity.encode_utf8(&mut [0; 4]));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::import(format!(
                    "malformed XML at byte {}: {e}",
                    reader.error_position()
                )))
            }
            _ => (),
        }
        buf.clear();
    }

    let top = builder.finish()?;
    debug!(target: "jcrmock::import", name = %top.name(), "System view imported");
    Ok(top)
}

/// Parse a system-view document and attach its top node under `parent`
pub fn import_system_view_into(parent: &Node, xml: &str) -> Result<Node> {
    let top = import_system_view(xml)?;
    parent.add_child(&top)?;
    Ok(top)
}

struct PendingProperty {
    name: String,
    property_type: PropertyType,
    multiple: bool,
    values: Vec<String>,
}

#[derive(Default)]
struct TreeBuilder {
    top: Option<Node>,
    nodes: Vec<Node>,
    property: Option<PendingProperty>,
    value: Option<String>,
}

impl TreeBuilder {
    fn start(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<()> {
        match element.local_name().as_ref() {
            b"node" => {
                let node = Node::new(required(element, "name")?);
                match self.nodes.last() {
                    Some(parent) => parent.add_child(&node)?,
                    None if self.top.is_some() => {
                        return Err(Error::import("more than one top-level sv:node"));
                    }
                    None => self.top = Some(node.clone()),
                }
                if !empty {
                    self.nodes.push(node);
                }
            }
            b"property" => {
                if self.nodes.is_empty() {
                    return Err(Error::import("sv:property outside of sv:node"));
                }
                let attributes = attributes(element)?;
                let name = attributes
                    .get("name")
                    .cloned()
                    .ok_or_else(|| Error::import("sv:property without sv:name"))?;
                let property_type = match attributes.get("type") {
                    Some(ty) => PropertyType::from_name(ty).ok_or_else(|| {
                        Error::import(format!("unknown property type '{ty}' on '{name}'"))
                    })?,
                    None => PropertyType::String,
                };
                let pending = PendingProperty {
                    name,
                    property_type,
                    multiple: attributes.get("multiple").is_some_and(|m| m == "true"),
                    values: Vec::new(),
                };
                if empty {
                    self.apply(pending)?;
                } else {
                    self.property = Some(pending);
                }
            }
            b"value" => {
                let property = self
                    .property
                    .as_mut()
                    .ok_or_else(|| Error::import("sv:value outside of sv:property"))?;
                if empty {
                    property.values.push(String::new());
                } else {
                    self.value = Some(String::new());
                }
            }
            other => {
                warn!(
                    target: "jcrmock::import",
                    element = %String::from_utf8_lossy(other),
                    "Ignoring unknown element"
                );
            }
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) -> Result<()> {
        match local_name {
            b"node" => {
                self.nodes.pop();
            }
            b"property" => {
                if let Some(pending) = self.property.take() {
                    self.apply(pending)?;
                }
            }
            b"value" => {
                if let (Some(value), Some(property)) = (self.value.take(), self.property.as_mut()) {
                    property.values.push(value);
                }
            }
            _ => (),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(value) = self.value.as_mut() {
            value.push_str(text);
        }
    }

    fn apply(&self, pending: PendingProperty) -> Result<()> {
        let Some(node) = self.nodes.last() else {
            return Err(Error::import("sv:property outside of sv:node"));
        };
        let first = pending.values.first();
        match pending.name.as_str() {
            PRIMARY_TYPE => {
                if let Some(primary_type) = first {
                    node.set_primary_type(primary_type)?;
                }
            }
            MIXIN_TYPES => {
                for mixin in &pending.values {
                    node.add_mixin(mixin)?;
                }
            }
            UUID => {
                if let Some(identifier) = first {
                    node.set_identifier(identifier)?;
                }
            }
            name if pending.values.is_empty() => {
                debug!(
                    target: "jcrmock::import",
                    property = name,
                    "Skipping property without values"
                );
            }
            name => {
                let values = pending
                    .values
                    .iter()
                    .map(|text| decode(pending.property_type, text))
                    .collect::<Result<Vec<Value>>>()?;
                if pending.multiple || values.len() > 1 {
                    node.set_property_values(name, values)?;
                } else if let Some(value) = values.into_iter().next() {
                    node.set_property(name, value)?;
                }
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<Node> {
        if !self.nodes.is_empty() {
            return Err(Error::import("document ended inside an sv:node"));
        }
        self.top
            .ok_or_else(|| Error::import("document contains no sv:node"))
    }
}

fn decode(property_type: PropertyType, text: &str) -> Result<Value> {
    match property_type {
        PropertyType::Binary => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            BASE64
                .decode(compact)
                .map(Value::Binary)
                .map_err(|e| Error::format(PropertyType::String, "binary", e.to_string()))
        }
        other => Value::parse_as(other, text),
    }
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| Error::import(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::import(e.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn required(element: &BytesStart<'_>, name: &str) -> Result<String> {
    attributes(element)?.remove(name).ok_or_else(|| {
        Error::import(format!(
            "sv:{} without sv:{name}",
            String::from_utf8_lossy(element.local_name().as_ref())
        ))
    })
}

fn resolve_entity(name: &str) -> Result<char> {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let hex = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"));
            let code = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = name.strip_prefix('#') {
                decimal.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    };
    resolved.ok_or_else(|| Error::import(format!("unknown entity '&{name};'")))
}
