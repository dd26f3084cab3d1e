//! Clause node for anonymous functions.

use crate::diagnostics::Spanned;
use serde::{Deserialize, Serialize};

use super::{Expr, Pattern};

/// A clause of an anonymous function.
///
/// All clauses of one lambda share an arity; the walker unifies their
/// parameter and result types like case branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaClause {
    /// Parameter patterns
    pub params: Vec<Pattern>,
    /// Optional guard expression
    pub guard: Option<Spanned<Expr>>,
    /// Clause body
    pub body: Spanned<Expr>,
}

impl LambdaClause {
    /// The arity of this clause.
    pub fn arity(&self) -> u8 {
        self.params.len() as u8
    }
}
