//! Module and function-definition AST nodes.

use crate::diagnostics::{Span, Spanned};
use serde::{Deserialize, Serialize};

use super::{Expr, Pattern};

/// Visibility of a function definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Externally callable (`def`)
    Public,
    /// Module-internal (`defp`)
    Private,
}

/// A single function clause.
///
/// Several definitions sharing a name and arity form the clauses of one
/// function; the driver groups them before analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Def {
    /// Clause visibility
    pub visibility: Visibility,
    /// Function name
    pub name: String,
    /// Parameter patterns; the length is the function's arity
    pub params: Vec<Pattern>,
    /// Optional guard expression
    pub guard: Option<Spanned<Expr>>,
    /// Clause body
    pub body: Spanned<Expr>,
    /// Location of the clause head
    pub span: Span,
}

impl Def {
    /// The arity of this clause.
    pub fn arity(&self) -> u8 {
        self.params.len() as u8
    }
}

/// A module: a name plus its function definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Fully qualified module name
    pub name: String,
    /// Function clauses in source order
    pub defs: Vec<Def>,
    /// Location of the module definition
    pub span: Span,
}

impl Module {
    /// Creates a module with the given name and definitions.
    pub fn new(name: impl Into<String>, defs: Vec<Def>) -> Self {
        Self {
            name: name.into(),
            defs,
            span: Span::default(),
        }
    }

    /// Groups clauses by `(name, arity)` preserving source order.
    pub fn functions(&self) -> Vec<((String, u8), Vec<&Def>)> {
        let mut order: Vec<(String, u8)> = Vec::new();
        let mut grouped: std::collections::HashMap<(String, u8), Vec<&Def>> =
            std::collections::HashMap::new();
        for def in &self.defs {
            let key = (def.name.clone(), def.arity());
            if !grouped.contains_key(&key) {
                order.push(key.clone());
            }
            grouped.entry(key).or_default().push(def);
        }
        order
            .into_iter()
            .map(|key| {
                let defs = grouped.remove(&key).unwrap_or_default();
                (key, defs)
            })
            .collect()
    }
}
