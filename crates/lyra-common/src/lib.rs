//! Common types and utilities for the lyra compiler front-end.
//!
//! This crate provides foundational types used across all lyra crates:
//! - String interning (`Atom`, `Interner`)
//! - The diagnostics data model (`Diagnostic`, `DiagnosticHandler`)
//! - Centralized limits and thresholds
//! - Tracing bootstrap (`trace::init_from_env`)

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Diagnostics data model
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticHandler};

// Centralized limits and thresholds
pub mod limits;

// Tracing subscriber bootstrap
pub mod trace;
