//! Patterns appearing in bindings, clause heads, and rescue clauses.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Literal;

/// A pattern in a binding position.
///
/// Underscore and literal patterns introduce no variables; structural
/// patterns carry shape information the walker turns into a type skeleton
/// for the scrutinee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    /// The wildcard pattern `_`
    Wildcard,

    /// A variable binding
    Var(String),

    /// A literal match
    Literal(Literal),

    /// A tuple pattern `{p1, ..., pn}`
    Tuple(Vec<Pattern>),

    /// A list pattern `[p1, ..., pn]`, optionally with a rest pattern
    /// after `|`
    List {
        elements: Vec<Pattern>,
        rest: Option<Box<Pattern>>,
    },

    /// A map pattern `%{key => p, ...}` with literal keys
    Map(Vec<(Literal, Pattern)>),

    /// A struct pattern `%Module{field: p, ...}`
    Struct {
        module: String,
        fields: Vec<(String, Pattern)>,
    },
}

impl Pattern {
    /// Creates a variable pattern.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// Collects the variables this pattern introduces, left to right.
    pub fn variables(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Self::Wildcard | Self::Literal(_) => {}
            Self::Var(name) => out.push(name.clone()),
            Self::Tuple(elements) => {
                for p in elements {
                    p.collect_variables(out);
                }
            }
            Self::List { elements, rest } => {
                for p in elements {
                    p.collect_variables(out);
                }
                if let Some(rest) = rest {
                    rest.collect_variables(out);
                }
            }
            Self::Map(entries) => {
                for (_, p) in entries {
                    p.collect_variables(out);
                }
            }
            Self::Struct { fields, .. } => {
                for (_, p) in fields {
                    p.collect_variables(out);
                }
            }
        }
    }

    /// Returns true if this pattern binds nothing.
    pub fn is_irrefutable_blank(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => write!(f, "_"),
            Self::Var(name) => write!(f, "{name}"),
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Tuple(elements) => {
                write!(f, "{{")?;
                for (i, p) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, "}}")
            }
            Self::List { elements, rest } => {
                write!(f, "[")?;
                for (i, p) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                if let Some(rest) = rest {
                    write!(f, " | {rest}")?;
                }
                write!(f, "]")
            }
            Self::Map(entries) => {
                write!(f, "%{{")?;
                for (i, (k, p)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k} => {p}")?;
                }
                write!(f, "}}")
            }
            Self::Struct { module, fields } => {
                write!(f, "%{module}{{")?;
                for (i, (name, p)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {p}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
