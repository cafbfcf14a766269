//! Source location tracking (byte offsets).

use serde::{Deserialize, Serialize};

/// A byte range in a source file.
///
/// floe spans are half-open `[start, end)` byte offsets. Reasons attach a
/// span so diagnostics can point at the syntax that introduced a type
/// variable; the resolution subsystem itself never interprets offsets.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Span for synthesized constructs with no source location.
    pub const DUMMY: Self = Self { start: 0, end: 0 };

    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}
