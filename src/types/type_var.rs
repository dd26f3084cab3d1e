//! Unification variables and the per-analysis fresh-variable supply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type variable with a unique identifier within one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVar {
    /// Identifier, unique per analysis
    pub id: u64,
}

/// Effect row variable with a unique identifier within one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectVar {
    /// Identifier, unique per analysis
    pub id: u64,
}

impl TypeVar {
    /// Creates a type variable with a specific id (for tests).
    pub fn with_id(id: u64) -> Self {
        Self { id }
    }
}

impl EffectVar {
    /// Creates an effect variable with a specific id (for tests).
    pub fn with_id(id: u64) -> Self {
        Self { id }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.id)
    }
}

impl fmt::Display for EffectVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.id)
    }
}

/// Monotonic fresh-variable source owned by one analysis.
///
/// Type and effect variables draw from the same counter, so an id is never
/// reused across the two sorts within an analysis.
#[derive(Debug, Clone, Default)]
pub struct VarSupply {
    next: u64,
}

impl VarSupply {
    /// Creates a supply starting at zero.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a fresh type variable.
    pub fn fresh_type(&mut self) -> TypeVar {
        let id = self.next;
        self.next += 1;
        TypeVar { id }
    }

    /// Returns a fresh effect variable.
    pub fn fresh_effect(&mut self) -> EffectVar {
        let id = self.next;
        self.next += 1;
        EffectVar { id }
    }

    /// Number of variables handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
