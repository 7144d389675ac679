//! Core names, ranks, locators, and errors for Templar.
//!
//! This crate provides:
//! - [`QName`] - Expanded names for templates, modes, and declarations
//! - [`ModuleId`] / [`RuleId`] - Arena indices for modules and compiled rules
//! - [`Precedence`], [`Priority`], [`Score`] - The keys rule dispatch sorts by
//! - [`Locator`] - Source positions for declarations
//! - [`Error`] - Compile errors with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod locator;
pub mod qname;
pub mod rank;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use id::{ModuleId, RuleId};
pub use locator::Locator;
pub use qname::QName;
pub use rank::{InvalidPriority, Precedence, Priority, Score};
