//! Clause node for case expressions.

use crate::diagnostics::Spanned;
use serde::{Deserialize, Serialize};

use super::{Expr, Pattern};

/// A clause in a case expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    /// Pattern matched against the scrutinee
    pub pattern: Pattern,
    /// Optional guard expression
    pub guard: Option<Spanned<Expr>>,
    /// Clause body
    pub body: Spanned<Expr>,
}
