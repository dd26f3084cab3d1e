//! Per-function summaries produced by the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::Visibility;
use crate::effects::{CompactEffect, Mfa};
use crate::types::TypeScheme;

/// Everything the engine records about one analyzed function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSummary {
    /// The function's identity
    pub mfa: Mfa,
    /// Compact effect category
    pub effect: CompactEffect,
    /// Generalized type, for higher-order callers
    pub scheme: TypeScheme,
    /// Observed call targets, in evaluation order
    pub calls: Vec<Mfa>,
    /// Clause visibility
    pub visibility: Visibility,
}

impl fmt::Display for FunctionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} ! {}", self.mfa, self.scheme, self.effect)
    }
}
