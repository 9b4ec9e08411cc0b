//! The fixed-field fault struct returned in place of a normal result.

use gbxrpc_xml::XmlNode;

use crate::elements;
use crate::error::{ParseError, Result};
use crate::value::{self, Value, ValueKind};

/// A structured error outcome: `faultCode: int` + `faultString: string`.
///
/// The member set is closed: decoding rejects unknown and duplicate member
/// names, and both members must be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: i32,
    pub message: String,
}

impl Fault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Encode as the `<value><struct>` element carried inside `<fault>`.
    pub fn encode(&self) -> XmlNode {
        XmlNode::new(elements::VALUE).child(
            XmlNode::new(elements::STRUCT)
                .child(member(elements::FAULT_CODE, Value::Int(self.code)))
                .child(member(
                    elements::FAULT_STRING,
                    Value::String(self.message.clone()),
                )),
        )
    }

    /// Decode from the `<value>` element carried inside `<fault>`.
    pub fn decode(node: &XmlNode) -> Result<Fault> {
        let content = match node.children() {
            [content]
                if node.name() == elements::VALUE && content.name() == elements::STRUCT =>
            {
                content
            }
            _ => {
                return Err(ParseError::BadShape(
                    "<fault> must hold a <value><struct>".to_string(),
                ))
            }
        };

        let mut code: Option<i32> = None;
        let mut message: Option<String> = None;

        for entry in content.children() {
            let (name, value_node) = value::decode_member(entry)?;
            match name.as_str() {
                elements::FAULT_CODE => {
                    if code.is_some() {
                        return Err(ParseError::DuplicateField(name));
                    }
                    if let Value::Int(decoded) = value::decode(value_node, &ValueKind::Int)? {
                        code = Some(decoded);
                    }
                }
                elements::FAULT_STRING => {
                    if message.is_some() {
                        return Err(ParseError::DuplicateField(name));
                    }
                    if let Value::String(decoded) =
                        value::decode(value_node, &ValueKind::String)?
                    {
                        message = Some(decoded);
                    }
                }
                _ => return Err(ParseError::UnknownField(name)),
            }
        }

        match (code, message) {
            (Some(code), Some(message)) => Ok(Fault { code, message }),
            _ => Err(ParseError::BadShape(
                "fault struct must carry faultCode and faultString".to_string(),
            )),
        }
    }
}

fn member(name: &str, value: Value) -> XmlNode {
    XmlNode::new(elements::MEMBER)
        .child(XmlNode::with_text(elements::MEMBER_NAME, name))
        .child(value::encode(&value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let fault = Fault::new(-1000, "Login unknown.");
        let decoded = Fault::decode(&fault.encode()).unwrap();
        assert_eq!(decoded, fault);
    }

    #[test]
    fn decode_wire_form() {
        let node = XmlNode::parse(
            "<value><struct>\
             <member><name>faultCode</name><value><int>1</int></value></member>\
             <member><name>faultString</name><value><string>bad</string></value></member>\
             </struct></value>",
        )
        .unwrap();
        assert_eq!(Fault::decode(&node).unwrap(), Fault::new(1, "bad"));
    }

    #[test]
    fn unknown_member_rejected() {
        let node = XmlNode::parse(
            "<value><struct>\
             <member><name>faultCode</name><value><int>1</int></value></member>\
             <member><name>extra</name><value><int>2</int></value></member>\
             </struct></value>",
        )
        .unwrap();
        assert_eq!(
            Fault::decode(&node).unwrap_err(),
            ParseError::UnknownField("extra".to_string())
        );
    }

    #[test]
    fn duplicate_member_rejected() {
        let node = XmlNode::parse(
            "<value><struct>\
             <member><name>faultCode</name><value><int>1</int></value></member>\
             <member><name>faultCode</name><value><int>2</int></value></member>\
             </struct></value>",
        )
        .unwrap();
        assert_eq!(
            Fault::decode(&node).unwrap_err(),
            ParseError::DuplicateField("faultCode".to_string())
        );
    }

    #[test]
    fn missing_member_rejected() {
        let node = XmlNode::parse(
            "<value><struct>\
             <member><name>faultCode</name><value><int>1</int></value></member>\
             </struct></value>",
        )
        .unwrap();
        assert!(matches!(
            Fault::decode(&node),
            Err(ParseError::BadShape(_))
        ));
    }
}
