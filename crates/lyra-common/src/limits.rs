//! Centralized limits and thresholds for the lyra front-end.
//!
//! This module provides shared constants for allocation sizing and capacity
//! limits used throughout the codebase. Centralizing these values:
//! - Prevents duplicate definitions with inconsistent values
//! - Makes it easy to tune limits for different environments
//! - Documents the rationale for each limit

// =============================================================================
// Region allocator sizing
// =============================================================================

/// Default chunk size for the region (bump) allocator, in bytes.
///
/// Large enough that a typical compilation allocates a handful of chunks;
/// small enough that a short-lived constraint-solver arena does not pin
/// megabytes for a one-expression inference attempt.
pub const REGION_CHUNK_SIZE: usize = 64 * 1024;

/// Maximum alignment the region allocator accepts.
///
/// Requests above this indicate a corrupted size computation somewhere in a
/// caller, not a legitimate allocation, and abort the process.
pub const REGION_MAX_ALIGN: usize = 256;

// =============================================================================
// Interning table capacity hints
// =============================================================================

/// Initial capacity for the permanent arena's type table.
///
/// A small source file touches a few hundred distinct canonical types once
/// the standard-library preamble is in; pre-sizing avoids the first rounds
/// of rehashing.
pub const PERMANENT_TYPE_TABLE_CAPACITY: usize = 1024;

/// Initial capacity for a constraint-solver arena's type table.
///
/// Solver arenas are created and discarded per inference attempt and stay
/// small.
pub const SOLVER_TYPE_TABLE_CAPACITY: usize = 64;

// =============================================================================
// Structural limits
// =============================================================================

/// Maximum number of members in an existential composition.
///
/// Compositions beyond this are almost certainly generated pathologically;
/// the factory collapses them to the error type instead of hashing an
/// unbounded member list.
pub const MAX_EXISTENTIAL_MEMBERS: usize = 128;

/// Maximum nesting depth for the specialized-conformance collapse walk.
///
/// The collapse rule unwraps chains of specialized conformances to their
/// root; a chain deeper than this indicates the collapse rule itself has
/// been bypassed and the walk stops rather than looping.
pub const MAX_CONFORMANCE_UNWRAP_DEPTH: usize = 64;
