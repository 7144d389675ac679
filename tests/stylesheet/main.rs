//! Integration tests for Layer 1: Stylesheet
//!
//! Tests for the in-memory document, match patterns, and module trees.

mod documents;
mod patterns;
