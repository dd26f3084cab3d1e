//! Rescue clause node for try expressions.

use crate::diagnostics::Spanned;
use serde::{Deserialize, Serialize};

use super::Expr;

/// A rescue clause of a try expression.
///
/// Each named exception module removes one matching exception label from
/// the try body's effect row. A clause with no named exceptions catches
/// any exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueClause {
    /// Variable bound to the caught exception value, if any
    pub binding: Option<String>,
    /// Exception module names this clause catches; empty catches all
    pub exceptions: Vec<String>,
    /// Clause body
    pub body: Spanned<Expr>,
}
