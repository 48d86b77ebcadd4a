//! libclang-backed declaration extraction.
//!
//! This crate provides:
//! - Objective-C header parsing via libclang
//! - An owned AST of the interface, category, method and property cursors
//! - [`AstExtractor`], the `clang` extraction strategy
//!
//! # Architecture
//!
//! ```text
//! Header → libclang → ObjcAst → ClassSet
//! ```
//!
//! libclang is loaded at runtime, so the crate builds on machines without it.

mod ast;
mod error;
mod extract;
mod parse;

pub use ast::{
    MethodDecl, Nullability, ObjcAst, ObjcNode, ObjcNodeKind, PropertyAttributes, PropertyDecl,
    SourceLocation, TypeRef,
};
pub use error::ClangError;
pub use extract::{extract_ast, AstExtractor};
pub use parse::ClangParser;
