//! Stylesheet modules, declarations, match patterns, and the node capability.
//!
//! This crate provides:
//! - [`ModuleTree`] - Arena of stylesheet modules linked by import and include
//! - [`Declaration`] - Closed set of top-level declaration kinds
//! - [`MatchPattern`] / [`Matcher`] - Match patterns and the matcher seam
//! - [`PathPattern`] - Built-in matcher for the XSLT 1.0 pattern subset
//! - [`NodeTree`] / [`NodeRef`] - The node capability patterns match against
//! - [`Document`] - An arena-backed in-memory tree implementing [`NodeTree`]
//!
//! The flow is: parsed stylesheet → `ModuleTree` → `templar_compose::recompose`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod declaration;
pub mod document;
pub mod module;
pub mod node;
pub mod pattern;

pub use declaration::{
    AttributeSetDecl, Declaration, DecimalFormatDecl, DecimalSymbols, KeyDecl, NameTest,
    NamespaceAliasDecl, OutputDecl, OutputMethod, OutputProperties, TemplateBody, TemplateRule,
    VariableDecl, VariableKind, WhitespaceDecl, WhitespaceMode,
};
pub use document::Document;
pub use module::{IncludeSite, Linkage, Module, ModuleTree};
pub use node::{NodeId, NodeKind, NodeRef, NodeTree};
pub use pattern::{MatchPattern, Matcher, PathPattern, StepPattern, TargetKey};
