//! Recomposition and template dispatch for Templar.
//!
//! This crate provides:
//! - [`GlobalImportList`] - Module tree flattened into import precedence order
//! - [`recompose`] - Merges every module into one [`ComposedView`]
//! - [`PatternIndex`] - Bucketed, rank-sorted dispatch chains
//! - [`ComposedView::resolve`] - Selects the rule governing a node
//!
//! The flow is: `ModuleTree` → `GlobalImportList` → recomposition →
//! `PatternIndex` → dispatch.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod composed;
pub mod config;
pub mod dispatch;
pub mod index;
pub mod precedence;
pub mod recompose;
pub mod rule;
pub mod tables;

pub use composed::ComposedView;
pub use config::{ConflictPolicy, RecomposeConfig};
pub use dispatch::{BuiltInRule, Resolution};
pub use index::{Association, Chain, IndexBuilder, PatternIndex, RankKey};
pub use precedence::{GlobalImportList, ImportSlot};
pub use recompose::{recompose, recompose_with};
pub use rule::CompiledRule;
pub use tables::{
    AttributeSet, AttributeSets, DecimalFormats, GlobalVariables, KeyTable, NamespaceAliases,
    OutputTable, WhitespaceRules,
};
