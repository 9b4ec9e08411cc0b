//! Minimal XML document model for the XML-RPC subset spoken by GBXRemote.
//!
//! XML-RPC documents never use attributes, namespaces, or mixed content, so
//! this crate models exactly what the grammar needs: named elements holding
//! either character data or child elements. [`XmlNode::parse`] accepts a
//! complete document (optionally prefixed with an XML declaration and
//! comments) and [`XmlNode::to_xml`] re-emits the canonical text form.

pub mod error;
pub mod node;
pub mod parser;

pub use error::{Result, XmlError};
pub use node::XmlNode;
