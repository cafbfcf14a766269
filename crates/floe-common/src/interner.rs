//! String interning for identifier deduplication.
//!
//! Identifiers, property names, and reason descriptions repeat constantly
//! across a type-checking task. Interning replaces each string with a small
//! `Atom` id so that comparisons are integer comparisons and storage is
//! shared.
//!
//! Two interners are provided:
//! - [`Interner`]: single-threaded, for per-task use.
//! - [`ShardedInterner`]: `DashMap`-backed, for sharing across worker
//!   threads (each checking task is single-threaded, but tasks may run in
//!   parallel and share one interner for library-wide names).

use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

/// An interned string id.
///
/// `Atom` equality is string equality for atoms produced by the same
/// interner. The inner index is public so tests and serialized data can
/// construct atoms directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel atom for "no name".
    pub const EMPTY: Self = Self(0);
}

/// Single-threaded string interner.
///
/// Index 0 is reserved for the empty string so that [`Atom::EMPTY`] always
/// resolves.
#[derive(Debug)]
pub struct Interner {
    strings: Vec<String>,
    ids: FxHashMap<String, Atom>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::new(),
            ids: FxHashMap::default(),
        };
        interner.intern_string("");
        interner
    }

    /// Intern a string, returning its `Atom`.
    pub fn intern_string(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.ids.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.ids.insert(s.to_string(), atom);
        atom
    }

    /// Resolve an `Atom` back to its string.
    ///
    /// Returns the empty string for atoms this interner did not issue.
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map_or("", String::as_str)
    }

    /// Number of interned strings (including the reserved empty string).
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Thread-safe string interner for cross-task sharing.
///
/// Lookup by string goes through a `DashMap`; resolution by atom goes
/// through an append-only table behind an `RwLock` (reads vastly dominate).
pub struct ShardedInterner {
    ids: DashMap<String, Atom>,
    strings: RwLock<Vec<String>>,
    next: AtomicU32,
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedInterner {
    pub fn new() -> Self {
        let interner = Self {
            ids: DashMap::new(),
            strings: RwLock::new(Vec::new()),
            next: AtomicU32::new(0),
        };
        interner.intern_string("");
        interner
    }

    /// Intern a string, returning its `Atom`.
    pub fn intern_string(&self, s: &str) -> Atom {
        if let Some(atom) = self.ids.get(s) {
            return *atom;
        }
        // Hold the table lock across id allocation so atom indices and
        // table positions stay in sync under concurrent interning.
        let mut strings = self.strings.write().unwrap_or_else(|e| e.into_inner());
        if let Some(atom) = self.ids.get(s) {
            return *atom;
        }
        let atom = Atom(self.next.fetch_add(1, Ordering::SeqCst));
        strings.push(s.to_string());
        self.ids.insert(s.to_string(), atom);
        atom
    }

    /// Resolve an `Atom` back to an owned string.
    pub fn resolve(&self, atom: Atom) -> String {
        self.strings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.strings.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
