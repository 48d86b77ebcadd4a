//! Errors raised while parsing individual declarations.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for declaration parsing.
pub type Result<T> = std::result::Result<T, SignatureError>;

/// A declaration that does not have the expected shape.
///
/// Both variants are recovered by the extractors: the member (or class) is
/// skipped and a warning is recorded.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// A method or property string does not match the expected shape.
    #[error("malformed signature `{decl}`: {reason}")]
    #[diagnostic(code(veneer::malformed_signature))]
    MalformedSignature { decl: String, reason: String },

    /// An `@interface` line could not be parsed.
    #[error("malformed class header `{line}`: {reason}")]
    #[diagnostic(
        code(veneer::malformed_class_header),
        help("the class body is skipped up to its `@end`")
    )]
    MalformedClassHeader { line: String, reason: String },
}

impl SignatureError {
    pub(crate) fn signature(decl: &str, reason: impl Into<String>) -> Self {
        SignatureError::MalformedSignature {
            decl: decl.trim().to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn class_header(line: &str, reason: impl Into<String>) -> Self {
        SignatureError::MalformedClassHeader {
            line: line.trim().to_string(),
            reason: reason.into(),
        }
    }
}
