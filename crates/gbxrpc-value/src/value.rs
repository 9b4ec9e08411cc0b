//! The typed value variants and their XML encode/decode rules.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use gbxrpc_xml::XmlNode;

use crate::elements;
use crate::error::{ParseError, Result};
use crate::timestamp;

/// A single XML-RPC value.
///
/// Arrays are homogeneous: the element kind is part of the value, declared
/// statically rather than discovered from documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Double(f64),
    String(String),
    DateTime(NaiveDateTime),
    Base64(Vec<u8>),
    Array { kind: ValueKind, items: Vec<Value> },
    Struct(StructValue),
}

impl Value {
    /// An empty homogeneous array of the given element kind.
    pub fn empty_array(kind: ValueKind) -> Self {
        Value::Array {
            kind,
            items: Vec::new(),
        }
    }

    /// The kind discriminator of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Bool(_) => ValueKind::Bool,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Base64(_) => ValueKind::Base64,
            Value::Array { kind, .. } => ValueKind::Array(Box::new(kind.clone())),
            Value::Struct(_) => ValueKind::Struct,
        }
    }
}

/// Kind discriminator for [`Value`], used to drive expected-variant decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Bool,
    Double,
    String,
    DateTime,
    Base64,
    /// Homogeneous array with the given element kind.
    Array(Box<ValueKind>),
    Struct,
}

impl ValueKind {
    /// Canonical element tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            ValueKind::Int => elements::INT,
            ValueKind::Bool => elements::BOOLEAN,
            ValueKind::Double => elements::DOUBLE,
            ValueKind::String => elements::STRING,
            ValueKind::DateTime => elements::DATETIME,
            ValueKind::Base64 => elements::BASE64,
            ValueKind::Array(_) => elements::ARRAY,
            ValueKind::Struct => elements::STRUCT,
        }
    }

    /// Whether a document tag selects this kind. `i4` aliases `int`.
    fn matches_tag(&self, tag: &str) -> bool {
        match self {
            ValueKind::Int => tag == elements::INT || tag == elements::I4,
            other => tag == other.tag(),
        }
    }

    /// The default value of this kind, used when rendering an incomplete
    /// response envelope.
    pub fn default_value(&self) -> Value {
        match self {
            ValueKind::Int => Value::Int(0),
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Double => Value::Double(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::DateTime => Value::DateTime(NaiveDateTime::default()),
            ValueKind::Base64 => Value::Base64(Vec::new()),
            ValueKind::Array(kind) => Value::empty_array((**kind).clone()),
            ValueKind::Struct => Value::Struct(StructValue::new()),
        }
    }
}

/// Ordered-insertion mapping from member name to value.
///
/// Member order is preserved and re-emitted verbatim, keeping encoding
/// deterministic. Names must be unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    members: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member. Fails if the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(ParseError::DuplicateField(name));
        }
        self.members.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| value)
    }

    pub fn members(&self) -> &[(String, Value)] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Encode a value as its `<value>` element. Pure and total.
pub fn encode(value: &Value) -> XmlNode {
    match value {
        Value::Int(v) => scalar(elements::INT, v.to_string()),
        Value::Bool(v) => scalar(elements::BOOLEAN, if *v { "1" } else { "0" }),
        Value::Double(v) => scalar(elements::DOUBLE, v.to_string()),
        Value::String(v) => scalar(elements::STRING, v.clone()),
        Value::DateTime(v) => scalar(elements::DATETIME, timestamp::encode(v)),
        Value::Base64(v) => scalar(elements::BASE64, BASE64_STANDARD.encode(v)),
        Value::Array { items, .. } => {
            let mut data = XmlNode::new(elements::ARRAY_DATA);
            for item in items {
                data.push(encode(item));
            }
            XmlNode::new(elements::VALUE).child(XmlNode::new(elements::ARRAY).child(data))
        }
        Value::Struct(members) => {
            let mut node = XmlNode::new(elements::STRUCT);
            for (name, member) in members.members() {
                node.push(
                    XmlNode::new(elements::MEMBER)
                        .child(XmlNode::with_text(elements::MEMBER_NAME, name.clone()))
                        .child(encode(member)),
                );
            }
            XmlNode::new(elements::VALUE).child(node)
        }
    }
}

fn scalar(tag: &str, text: impl Into<String>) -> XmlNode {
    XmlNode::new(elements::VALUE).child(XmlNode::with_text(tag, text))
}

/// Decode a `<value>` element against an expected kind.
///
/// A value node with bare text and no child element decodes only as
/// [`ValueKind::String`]; every other kind requires its tag to be present.
pub fn decode(node: &XmlNode, kind: &ValueKind) -> Result<Value> {
    let content = match content_element(node)? {
        Some(content) => content,
        None => {
            if *kind == ValueKind::String {
                return Ok(Value::String(node.text().to_string()));
            }
            return Err(ParseError::BadShape(format!(
                "expected <{}> content, found bare text",
                kind.tag()
            )));
        }
    };

    if !kind.matches_tag(content.name()) {
        return Err(ParseError::BadShape(format!(
            "expected <{}> content, found <{}>",
            kind.tag(),
            content.name()
        )));
    }

    decode_content(content, kind)
}

/// Decode a `<value>` element, discovering the variant from its tag.
///
/// Used where the document is self-describing (struct members). Bare text
/// defaults to string. Untagged arrays take their element kind from the
/// first element and must be homogeneous.
pub fn decode_any(node: &XmlNode) -> Result<Value> {
    let content = match content_element(node)? {
        Some(content) => content,
        None => return Ok(Value::String(node.text().to_string())),
    };

    let kind = match content.name() {
        elements::INT | elements::I4 => ValueKind::Int,
        elements::BOOLEAN => ValueKind::Bool,
        elements::DOUBLE => ValueKind::Double,
        elements::STRING => ValueKind::String,
        elements::DATETIME => ValueKind::DateTime,
        elements::BASE64 => ValueKind::Base64,
        elements::ARRAY => return decode_array_any(content),
        elements::STRUCT => ValueKind::Struct,
        other => {
            return Err(ParseError::BadShape(format!("unknown value tag <{other}>")));
        }
    };

    decode_content(content, &kind)
}

/// Validate the `<value>` wrapper and return its single content element,
/// or `None` for a bare-text value node.
fn content_element(node: &XmlNode) -> Result<Option<&XmlNode>> {
    if node.name() != elements::VALUE {
        return Err(ParseError::BadShape(format!(
            "expected <value>, found <{}>",
            node.name()
        )));
    }
    match node.children() {
        [] => Ok(None),
        [content] => Ok(Some(content)),
        children => Err(ParseError::BadShape(format!(
            "<value> must hold one element, found {}",
            children.len()
        ))),
    }
}

fn decode_content(content: &XmlNode, kind: &ValueKind) -> Result<Value> {
    match kind {
        ValueKind::Int => {
            let text = scalar_text(content)?;
            text.parse::<i32>()
                .map(Value::Int)
                .map_err(|_| ParseError::bad_content(elements::INT, text))
        }
        ValueKind::Bool => {
            let text = scalar_text(content)?;
            match text.to_ascii_lowercase().as_str() {
                "0" | "false" => Ok(Value::Bool(false)),
                "1" | "true" => Ok(Value::Bool(true)),
                _ => Err(ParseError::bad_content(elements::BOOLEAN, text)),
            }
        }
        ValueKind::Double => {
            let text = scalar_text(content)?;
            text.parse::<f64>()
                .map(Value::Double)
                .map_err(|_| ParseError::bad_content(elements::DOUBLE, text))
        }
        ValueKind::String => Ok(Value::String(scalar_text(content)?.to_string())),
        ValueKind::DateTime => timestamp::decode(scalar_text(content)?).map(Value::DateTime),
        ValueKind::Base64 => {
            let text = scalar_text(content)?;
            BASE64_STANDARD
                .decode(text.trim())
                .map(Value::Base64)
                .map_err(|_| ParseError::bad_content(elements::BASE64, text))
        }
        ValueKind::Array(element_kind) => {
            let mut items = Vec::new();
            for element in array_data(content)?.children() {
                items.push(decode(element, element_kind)?);
            }
            Ok(Value::Array {
                kind: (**element_kind).clone(),
                items,
            })
        }
        ValueKind::Struct => decode_struct(content).map(Value::Struct),
    }
}

fn scalar_text(content: &XmlNode) -> Result<&str> {
    if content.has_children() {
        return Err(ParseError::BadShape(format!(
            "<{}> must hold text, found child elements",
            content.name()
        )));
    }
    Ok(content.text())
}

/// The `<data>` element inside an `<array>`.
fn array_data(content: &XmlNode) -> Result<&XmlNode> {
    match content.children() {
        [data] if data.name() == elements::ARRAY_DATA => Ok(data),
        _ => Err(ParseError::BadShape(
            "<array> must hold exactly one <data>".to_string(),
        )),
    }
}

fn decode_array_any(content: &XmlNode) -> Result<Value> {
    let mut items = Vec::new();
    for element in array_data(content)?.children() {
        items.push(decode_any(element)?);
    }
    let kind = items
        .first()
        .map(Value::kind)
        .unwrap_or(ValueKind::String);
    if items.iter().any(|item| item.kind() != kind) {
        return Err(ParseError::BadShape(
            "array elements must share one kind".to_string(),
        ));
    }
    Ok(Value::Array { kind, items })
}

fn decode_struct(content: &XmlNode) -> Result<StructValue> {
    let mut members = StructValue::new();
    for member in content.children() {
        let (name, value) = decode_member(member)?;
        members.insert(name, decode_any(value)?)?;
    }
    Ok(members)
}

/// Split a `<member>` element into its name and `<value>` child.
///
/// Each member must have exactly a name child and a value child.
pub(crate) fn decode_member(member: &XmlNode) -> Result<(String, &XmlNode)> {
    if member.name() != elements::MEMBER || member.children().len() != 2 {
        return Err(ParseError::BadShape(
            "<struct> must hold <member><name/><value/></member> entries".to_string(),
        ));
    }
    let name = member
        .find(elements::MEMBER_NAME)
        .filter(|name| !name.has_children())
        .ok_or_else(|| ParseError::BadShape("<member> is missing <name>".to_string()))?;
    let value = member
        .find(elements::VALUE)
        .ok_or_else(|| ParseError::BadShape("<member> is missing <value>".to_string()))?;
    Ok((name.text().to_string(), value))
}
