//! Reference resolution
//!
//! Resolves `$ref` pointers against the document's schema table. Tracks an
//! in-progress set per top-level resolution call so that direct or
//! indirect pointer cycles surface as `Resolution::Cycle` instead of
//! unbounded recursion. Callers treat the cycle marker as "use whatever
//! partial value is already computed".

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ModelError, Result};
use crate::schema::{Schema, SchemaTable};

/// Outcome of resolving one pointer
#[derive(Debug)]
pub enum Resolution<'a> {
    Resolved(&'a Schema),
    /// Pointer has no target in the table
    NotFound,
    /// Pointer is already being resolved higher up the current traversal
    Cycle,
}

impl<'a> Resolution<'a> {
    pub fn schema(&self) -> Option<&'a Schema> {
        match self {
            Resolution::Resolved(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Extract the simple name from a pointer: the final `/` segment.
/// Accepts `#/components/schemas/Name`, `#/definitions/Name` and `#/Name`.
pub fn simple_ref(pointer: &str) -> &str {
    pointer.rsplit('/').next().unwrap_or(pointer)
}

/// Cycle-safe `$ref` lookup over one schema table.
///
/// The in-progress set belongs to one top-level resolution call; create a
/// fresh resolver (or call [`RefResolver::reset`]) per traversal.
pub struct RefResolver<'a> {
    table: &'a SchemaTable,
    in_progress: HashSet<String>,
}

impl<'a> RefResolver<'a> {
    pub fn new(table: &'a SchemaTable) -> Self {
        Self {
            table,
            in_progress: HashSet::new(),
        }
    }

    /// Pure lookup without cycle tracking
    pub fn lookup(&self, pointer: &str) -> Option<&'a Schema> {
        self.table.get(simple_ref(pointer))
    }

    /// Strict lookup for callers that cannot accept a degraded subtree
    pub fn require(&self, pointer: &str) -> Result<&'a Schema> {
        self.lookup(pointer)
            .ok_or_else(|| ModelError::UnresolvableReference {
                pointer: pointer.to_string(),
            })
    }

    /// Resolve a pointer, marking it in-progress for the current traversal.
    /// Pair with [`RefResolver::finish`] once the subtree is done.
    pub fn resolve(&mut self, pointer: &str) -> Resolution<'a> {
        let name = simple_ref(pointer);
        if self.in_progress.contains(name) {
            debug!(pointer, "reference cycle detected");
            return Resolution::Cycle;
        }
        match self.table.get(name) {
            Some(schema) => {
                self.in_progress.insert(name.to_string());
                Resolution::Resolved(schema)
            }
            None => Resolution::NotFound,
        }
    }

    /// Mark a pointer's subtree as fully resolved
    pub fn finish(&mut self, pointer: &str) {
        self.in_progress.remove(simple_ref(pointer));
    }

    /// Whether a pointer is currently being resolved
    pub fn is_in_progress(&self, pointer: &str) -> bool {
        self.in_progress.contains(simple_ref(pointer))
    }

    /// Clear the in-progress set for a new top-level call
    pub fn reset(&mut self) {
        self.in_progress.clear();
    }

    pub fn table(&self) -> &'a SchemaTable {
        self.table
    }
}
