//! Common types and utilities for the floe type checker.
//!
//! This crate provides foundational types used across all floe crates:
//! - String interning (`Atom`, `Interner`, `ShardedInterner`)
//! - Source spans (`Span`)
//! - Centralized limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;
