//! Centralized limits and thresholds for the floe type checker.
//!
//! This module provides shared constants for recursion depths, operation
//! counts, and capacity limits used throughout the codebase. Centralizing
//! these values:
//! - Prevents duplicate definitions with inconsistent values
//! - Makes it easy to tune limits in one place
//! - Documents the rationale for each limit

/// Maximum structural recursion depth for the resolvable-type walk.
///
/// The walker's visited accumulator makes cyclic type graphs safe (every
/// cycle passes through a type variable, and each variable is entered at
/// most once per walk), so this bound only covers the purely structural
/// spine between variable references: pathologically deep non-cyclic
/// nesting such as a 10,000-level tuple-in-tuple annotation. Exceeding it
/// stops the walk on that spine; in well-formed programs it is never hit.
pub const MAX_WALK_DEPTH: u32 = 1_000;

/// Maximum rounds for one full-resolution request.
///
/// Each round hands binding jobs to the solver and re-walks newly resolved
/// terms. Every round either discovers at least one fresh type variable or
/// terminates the loop, so the round count is bounded by the number of
/// reachable variables; this fuel is a backstop against a misbehaving
/// solver that keeps materializing fresh unresolved structure. Exhaustion
/// is reported on the outcome, never panicked on.
pub const MAX_RESOLUTION_ROUNDS: u32 = 100;

/// Inline capacity for type lists (union members, tuple elements, call
/// arguments).
///
/// Lists backed by `SmallVec<[TypeId; 8]>` hold up to 8 elements without
/// heap allocation. Most unions and argument lists in real code are
/// shorter than 8.
pub const TYPE_LIST_INLINE: usize = 8;

/// Pre-allocation size for the per-walk job accumulator.
///
/// Most walks touch a handful of variables; 16 slots avoids rehashing in
/// the common case without wasting memory on the fast path where a
/// fully-resolved root contributes nothing.
pub const JOB_MAP_PREALLOC: usize = 16;
