//! Error types for veneer-driver.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a run.
#[derive(Error, Diagnostic, Debug)]
pub enum DriverError {
    /// An input header or directory could not be read.
    #[error("cannot read `{}`", .path.display())]
    #[diagnostic(code(veneer::driver::unreadable_input))]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory or a generated file could not be written.
    #[error("cannot write `{}`", .path.display())]
    #[diagnostic(code(veneer::driver::unwritable_output))]
    UnwritableOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("invalid configuration in `{}`", .path.display())]
    #[diagnostic(
        code(veneer::driver::config),
        help("see the `[output]` and `[extract]` tables in veneer.toml")
    )]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The configured extraction strategy could not be set up.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] veneer_clang::ClangError),
}

/// Result type for veneer-driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;
