//! The response side of an envelope: a typed return slot plus fault state.

use gbxrpc_xml::XmlNode;

use crate::call::param_value;
use crate::elements;
use crate::error::{ParseError, Result};
use crate::fault::Fault;
use crate::value::{self, Value, ValueKind};

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Returned(Value),
    Faulted(Fault),
}

/// One remote call's outcome.
///
/// Lifecycle: fresh → completed (with a return value or a fault) →
/// [`MethodResponse::reset`] → fresh. Parsing a second response into a
/// completed envelope is [`ParseError::AlreadyCompleted`]; a failed parse
/// leaves the envelope fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResponse {
    return_kind: ValueKind,
    outcome: Option<Outcome>,
}

impl MethodResponse {
    /// A fresh envelope whose return slot decodes as `return_kind`.
    pub fn new(return_kind: ValueKind) -> Self {
        Self {
            return_kind,
            outcome: None,
        }
    }

    pub fn return_kind(&self) -> &ValueKind {
        &self.return_kind
    }

    /// Whether a response has been parsed or set, fault or not.
    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether the completed outcome was a fault.
    pub fn had_fault(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Faulted(_)))
    }

    /// The fault, when completed with one.
    pub fn fault(&self) -> Option<&Fault> {
        match &self.outcome {
            Some(Outcome::Faulted(fault)) => Some(fault),
            _ => None,
        }
    }

    /// The return value, when completed without a fault.
    pub fn returned(&self) -> Option<&Value> {
        match &self.outcome {
            Some(Outcome::Returned(value)) => Some(value),
            _ => None,
        }
    }

    /// Complete this envelope with a return value (render-side tooling).
    pub fn set_returned(&mut self, value: Value) {
        self.outcome = Some(Outcome::Returned(value));
    }

    /// Complete this envelope with a fault (render-side tooling).
    pub fn set_fault(&mut self, fault: Fault) {
        self.outcome = Some(Outcome::Faulted(fault));
    }

    /// Clear fault/return state and go back to fresh. Idempotent.
    pub fn reset(&mut self) {
        self.outcome = None;
    }

    /// Render the complete response document, XML declaration included.
    ///
    /// When completed with a fault this emits the `<fault>` block; when
    /// completed with a value, a single-return `<params>` block. A fresh
    /// envelope emits the default value of the return kind — the path used
    /// by round-trip tooling, not by live calls.
    pub fn render(&self) -> String {
        format!("{}{}", elements::XML_DECLARATION, self.to_node().to_xml())
    }

    /// The `<methodResponse>` element for this outcome.
    pub fn to_node(&self) -> XmlNode {
        let body = match &self.outcome {
            Some(Outcome::Faulted(fault)) => {
                XmlNode::new(elements::FAULT).child(fault.encode())
            }
            Some(Outcome::Returned(value)) => single_param(value::encode(value)),
            None => single_param(value::encode(&self.return_kind.default_value())),
        };
        XmlNode::new(elements::METHOD_RESPONSE).child(body)
    }

    /// Parse a response document into this envelope.
    ///
    /// The document must hold exactly one of `<params>` (single return,
    /// decoded against the return kind) or `<fault>`. Either completes the
    /// envelope; errors leave it unchanged.
    pub fn parse(&mut self, document: &str) -> Result<()> {
        if self.outcome.is_some() {
            return Err(ParseError::AlreadyCompleted);
        }

        let root = XmlNode::parse(document)?;
        if root.name() != elements::METHOD_RESPONSE {
            return Err(ParseError::BadShape(format!(
                "expected <methodResponse>, found <{}>",
                root.name()
            )));
        }
        let child = match root.children() {
            [child] => child,
            _ => {
                return Err(ParseError::BadShape(
                    "<methodResponse> must hold exactly one child".to_string(),
                ))
            }
        };

        let outcome = match child.name() {
            elements::PARAMS => {
                let param = match child.children() {
                    [param] => param,
                    _ => {
                        return Err(ParseError::BadShape(
                            "response <params> must hold exactly one <param>".to_string(),
                        ))
                    }
                };
                Outcome::Returned(value::decode(param_value(param)?, &self.return_kind)?)
            }
            elements::FAULT => {
                let fault_value = match child.children() {
                    [fault_value] => fault_value,
                    _ => {
                        return Err(ParseError::BadShape(
                            "<fault> must hold exactly one <value>".to_string(),
                        ))
                    }
                };
                Outcome::Faulted(Fault::decode(fault_value)?)
            }
            other => {
                return Err(ParseError::BadShape(format!(
                    "expected <params> or <fault>, found <{other}>"
                )))
            }
        };

        self.outcome = Some(outcome);
        Ok(())
    }
}

fn single_param(value: XmlNode) -> XmlNode {
    XmlNode::new(elements::PARAMS).child(XmlNode::new(elements::PARAM).child(value))
}
