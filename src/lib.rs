//! Templar - XSLT rule composition and template dispatch
//!
//! This crate re-exports all layers of the Templar system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: templar_compose    - Import precedence, recomposition, pattern index, dispatch
//! Layer 1: templar_stylesheet - Modules, declarations, match patterns, node capability
//! Layer 0: templar_foundation - Core types (QName, Precedence, Priority, Error)
//! ```

pub use templar_compose as compose;
pub use templar_foundation as foundation;
pub use templar_stylesheet as stylesheet;
