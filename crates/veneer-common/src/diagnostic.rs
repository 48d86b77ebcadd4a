//! Warnings collected while extracting declarations.
//!
//! Contained failures (a malformed member, an unparsable class header) do not
//! abort a run. Each one is logged and also recorded as a [`Diagnostic`] so
//! callers can count and inspect them afterwards.

use miette::Diagnostic as MietteDiagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("{}{message}", location_prefix(.path, .line))]
pub struct Diagnostic {
    pub message: String,
    pub path: Option<PathBuf>,
    /// 1-based line number.
    pub line: Option<u32>,
    #[help]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            line: None,
            help: None,
        }
    }

    pub fn at(mut self, path: impl AsRef<Path>, line: u32) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self.line = Some(line);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

fn location_prefix(path: &Option<PathBuf>, line: &Option<u32>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!("{}:{}: ", path.display(), line),
        (Some(path), None) => format!("{}: ", path.display()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let diag = Diagnostic::warning("skipped method").at("NSView.h", 12);
        assert_eq!(diag.to_string(), "NSView.h:12: skipped method");
    }

    #[test]
    fn help_is_not_part_of_the_message() {
        let diag = Diagnostic::warning("bad").with_help("check the header");
        assert_eq!(diag.to_string(), "bad");
        assert_eq!(diag.help.as_deref(), Some("check the header"));
    }
}
