//! Literal value nodes of the analyzed language.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal values in analyzed source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer literals
    Integer(i64),

    /// Floating-point literals
    Float(f64),

    /// Atom literals (`:ok`, `:error`, module atoms)
    Atom(String),

    /// String / binary literals
    String(String),

    /// Boolean values
    Boolean(bool),

    /// The nil value
    Nil,
}

impl Literal {
    /// Creates an atom literal.
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Creates a string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Returns true if this literal is an atom.
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Atom(a) => write!(f, ":{a}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Nil => write!(f, "nil"),
        }
    }
}
