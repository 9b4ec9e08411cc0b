//! The call side of an envelope: method name plus ordered parameter slots.

use gbxrpc_xml::XmlNode;

use crate::elements;
use crate::error::{ParseError, Result};
use crate::value::{self, Value};

/// One remote call's request: a method name and a variable-length ordered
/// list of parameter slots.
///
/// Each slot pairs the current value with its kind; the kind drives strict
/// positional decoding in [`MethodCall::parse`]. Arity is simply the slot
/// count — there is no per-arity type family.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    method: String,
    params: Vec<Value>,
}

impl MethodCall {
    /// A call with no parameters.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter slot (builder form). The value's kind becomes the
    /// slot's declared kind.
    pub fn param(mut self, value: Value) -> Self {
        self.params.push(value);
        self
    }

    /// Append a parameter slot.
    pub fn push_param(&mut self, value: Value) {
        self.params.push(value);
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Render the complete call document, XML declaration included.
    pub fn render(&self) -> String {
        format!("{}{}", elements::XML_DECLARATION, self.to_node().to_xml())
    }

    /// The `<methodCall>` element for this call.
    pub fn to_node(&self) -> XmlNode {
        let mut params = XmlNode::new(elements::PARAMS);
        for param in &self.params {
            params.push(XmlNode::new(elements::PARAM).child(value::encode(param)));
        }
        XmlNode::new(elements::METHOD_CALL)
            .child(XmlNode::with_text(elements::METHOD_NAME, self.method.clone()))
            .child(params)
    }

    /// Parse a call document back into this envelope's parameter slots.
    ///
    /// The method name must match, the parameter count must equal the slot
    /// count, and every parameter must decode against its slot's kind. Any
    /// mismatch rejects the document as a whole; the slots are only
    /// replaced once every parameter has decoded.
    pub fn parse(&mut self, document: &str) -> Result<()> {
        let root = XmlNode::parse(document)?;
        self.parse_node(&root)
    }

    /// Parse an already-built `<methodCall>` element. See [`MethodCall::parse`].
    pub fn parse_node(&mut self, root: &XmlNode) -> Result<()> {
        if root.name() != elements::METHOD_CALL {
            return Err(ParseError::BadShape(format!(
                "expected <methodCall>, found <{}>",
                root.name()
            )));
        }

        let name = root
            .find(elements::METHOD_NAME)
            .filter(|name| !name.has_children())
            .ok_or_else(|| {
                ParseError::BadShape("<methodCall> is missing <methodName>".to_string())
            })?;
        if name.text() != self.method {
            return Err(ParseError::MethodNameMismatch {
                expected: self.method.clone(),
                got: name.text().to_string(),
            });
        }

        let params = root.find(elements::PARAMS).ok_or_else(|| {
            ParseError::BadShape("<methodCall> is missing <params>".to_string())
        })?;
        if params.children().len() != self.params.len() {
            return Err(ParseError::ParamCountMismatch {
                expected: self.params.len(),
                got: params.children().len(),
            });
        }

        let mut decoded = Vec::with_capacity(self.params.len());
        for (slot, param) in self.params.iter().zip(params.children()) {
            decoded.push(value::decode(param_value(param)?, &slot.kind())?);
        }
        self.params = decoded;
        Ok(())
    }
}

/// The single `<value>` inside a `<param>`.
pub(crate) fn param_value(param: &XmlNode) -> Result<&XmlNode> {
    match param.children() {
        [value] if param.name() == elements::PARAM => Ok(value),
        _ => Err(ParseError::BadShape(
            "<param> must hold exactly one <value>".to_string(),
        )),
    }
}
