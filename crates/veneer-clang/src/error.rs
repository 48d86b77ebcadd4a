use miette::Diagnostic;
use thiserror::Error;

/// Failures that stop libclang from producing a translation unit.
#[derive(Error, Diagnostic, Debug)]
pub enum ClangError {
    #[error("could not load libclang: {reason}")]
    #[diagnostic(
        code(veneer::clang::load),
        help("install libclang or point `extract.libclang_path` at the directory that contains it")
    )]
    LibraryNotFound { reason: String },

    #[error("failed to create clang index")]
    #[diagnostic(code(veneer::clang::index))]
    IndexCreation,

    #[error("argument contains an interior NUL byte: {0:?}")]
    #[diagnostic(code(veneer::clang::argument))]
    InvalidArgument(String),

    #[error("libclang could not parse `{path}`")]
    #[diagnostic(code(veneer::clang::parse))]
    ParseFailed { path: String },
}

pub type Result<T> = std::result::Result<T, ClangError>;
