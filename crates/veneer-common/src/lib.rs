//! Types shared by every stage of the binding generator.

mod diagnostic;
mod source;

pub use diagnostic::Diagnostic;
pub use source::SourceUnit;
