/// Errors produced while decoding documents into values and envelopes.
///
/// All of these are recoverable: a failed parse returns the error and
/// leaves the envelope it was called on unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The document text is not well-formed XML.
    #[error("malformed document: {0}")]
    Xml(#[from] gbxrpc_xml::XmlError),

    /// An element did not have the expected name or child structure.
    #[error("unexpected document shape: {0}")]
    BadShape(String),

    /// Element content could not be converted to the expected variant.
    #[error("invalid {kind} content: {text:?}")]
    BadContent { kind: &'static str, text: String },

    /// A struct member name outside the fixed field set.
    #[error("unknown struct member {0:?}")]
    UnknownField(String),

    /// The same struct member name appeared twice.
    #[error("duplicate struct member {0:?}")]
    DuplicateField(String),

    /// A call document carried a different method name than the envelope.
    #[error("method name mismatch (expected {expected:?}, got {got:?})")]
    MethodNameMismatch { expected: String, got: String },

    /// A call document carried the wrong number of parameters.
    #[error("parameter count mismatch (expected {expected}, got {got})")]
    ParamCountMismatch { expected: usize, got: usize },

    /// A response was parsed into an envelope that is already completed.
    #[error("response already completed; reset() before reuse")]
    AlreadyCompleted,
}

impl ParseError {
    pub(crate) fn bad_content(kind: &'static str, text: &str) -> Self {
        ParseError::BadContent {
            kind,
            text: text.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
