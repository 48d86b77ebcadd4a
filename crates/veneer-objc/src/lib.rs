//! Objective-C header front-end.
//!
//! This crate provides:
//! - A `logos` tokenizer for interface declarations
//! - Method and property signature parsing
//! - Documentation comment parsing
//! - The text extraction strategy ([`TextExtractor`])
//!
//! # Architecture
//!
//! ```text
//! header text → lines → state machine → declaration tokens → MethodModel / PropertyModel
//! ```

mod cursor;
mod doc;
mod error;
mod interface;
pub mod lexer;
mod scanner;
mod signature;

pub use doc::parse_doc_comment;
pub use error::{Result, SignatureError};
pub use interface::{parse_class_header, ClassHeader};
pub use scanner::TextExtractor;
pub use signature::{
    canonical_type, canonical_type_str, is_availability_macro, normalize_availability, parse_method,
    parse_property, try_parse_property, CanonicalType, ParseContext,
};
