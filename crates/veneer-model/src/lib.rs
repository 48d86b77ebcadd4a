//! Intermediate model shared by the extractors and the code generator.
//!
//! Every extractor produces the same shape: a [`ClassSet`] of [`ClassModel`]s
//! whose members keep their header declaration order.

mod class;
mod doc;
mod extract;
mod method;
mod set;

pub use class::*;
pub use doc::*;
pub use extract::*;
pub use method::*;
pub use set::*;
