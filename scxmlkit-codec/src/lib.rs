//! # scxmlkit-codec
//!
//! Markup transcoder for scxmlkit documents.
//!
//! This crate provides:
//! - Deterministic serialization of a [`Document`](scxmlkit_model::Document) to SCXML text
//! - Parsing of SCXML text back into the document model
//! - A pluggable markup tokenizer ([`MarkupParser`]) with a `quick-xml` default
//! - Content checksums of the serialized form
//!
//! For every document built through the model API,
//! `serialize(parse(serialize(d))) == serialize(d)`.

pub mod error;
pub mod parse;
pub mod writer;
pub mod xml;

pub use error::{CodecError, TokenizerError};
pub use parse::{parse, parse_with, ROOT_TAG};
pub use writer::{checksum, serialize, to_string, SerializeOptions, XML_DECLARATION};
pub use xml::{MarkupParser, QuickXmlParser, XmlElement, XmlNode};
