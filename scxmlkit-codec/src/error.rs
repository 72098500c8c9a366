//! Codec error types and error codes.

use quick_xml::encoding::EncodingError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Failures raised while turning text into a generic element tree.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] AttrError),

    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("unexpected end of input: <{open}> is not closed")]
    UnexpectedEof { open: String },

    #[error("no root element")]
    NoRootElement,

    #[error("unexpected content after root element: {found}")]
    TrailingContent { found: String },
}

/// Errors returned by [`parse`](crate::parse).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("not an SCXML document: root element is <{found}>")]
    Format { found: String },

    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

impl CodecError {
    /// Returns a stable code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            CodecError::Format { .. } => "FORMAT_ERROR",
            CodecError::Tokenizer(_) => "TOKENIZER_ERROR",
        }
    }
}
