/// Errors that can occur while parsing an XML document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// The input ended before the document was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// An unexpected character was found at the given byte offset.
    #[error("unexpected character at byte {0}")]
    Unexpected(usize),

    /// A closing tag did not match the element it closes.
    #[error("mismatched closing tag (expected </{expected}>, got </{got}>)")]
    MismatchedTag { expected: String, got: String },

    /// An unrecognized character or entity reference.
    #[error("unknown entity reference &{0};")]
    UnknownEntity(String),

    /// An element contains both child elements and non-whitespace text.
    #[error("mixed element and text content in <{0}>")]
    MixedContent(String),

    /// Non-whitespace content remained after the document root was closed.
    #[error("trailing content after document root")]
    TrailingContent,
}

pub type Result<T> = std::result::Result<T, XmlError>;
