//! Pattern typing: variable bindings and structural skeletons.
//!
//! A pattern yields a partial type skeleton used to constrain the
//! scrutinee, plus the variables it introduces. Constraints that need the
//! unifier (list element agreement, rest patterns) are returned as pairs
//! for the walker to discharge.

use crate::ast::{Literal, Pattern};
use crate::types::{Type, VarSupply};

/// Bindings and deferred constraints produced while typing a pattern.
#[derive(Debug, Default)]
pub struct PatternBindings {
    /// Variables introduced by the pattern, with their types
    pub bindings: Vec<(String, Type)>,
    /// Type pairs the walker must unify
    pub constraints: Vec<(Type, Type)>,
}

impl PatternBindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }
}

/// The primitive type of a literal.
pub fn literal_type(literal: &Literal) -> Type {
    match literal {
        Literal::Integer(_) => Type::Integer,
        Literal::Float(_) => Type::Float,
        Literal::Atom(_) => Type::Atom,
        Literal::String(_) => Type::Binary,
        Literal::Boolean(_) => Type::Boolean,
        Literal::Nil => Type::Atom,
    }
}

/// Builds the type skeleton of a pattern.
///
/// Underscore and literal patterns bind nothing; variable patterns bind a
/// fresh variable; structural patterns recurse. A struct pattern pins the
/// scrutinee to its concrete module, which is what lets protocol dispatch
/// on the bound value resolve.
pub fn pattern_skeleton(
    pattern: &Pattern,
    supply: &mut VarSupply,
    out: &mut PatternBindings,
) -> Type {
    match pattern {
        Pattern::Wildcard => Type::Var(supply.fresh_type()),
        Pattern::Var(name) => {
            let var = Type::Var(supply.fresh_type());
            out.bindings.push((name.clone(), var.clone()));
            var
        }
        Pattern::Literal(literal) => literal_type(literal),
        Pattern::Tuple(elements) => Type::Tuple(
            elements
                .iter()
                .map(|p| pattern_skeleton(p, supply, out))
                .collect(),
        ),
        Pattern::List { elements, rest } => {
            let element = Type::Var(supply.fresh_type());
            for p in elements {
                let sub = pattern_skeleton(p, supply, out);
                out.constraints.push((sub, element.clone()));
            }
            let list = Type::list(element);
            if let Some(rest) = rest {
                let sub = pattern_skeleton(rest, supply, out);
                out.constraints.push((sub, list.clone()));
            }
            list
        }
        Pattern::Map(entries) => {
            for (_, p) in entries {
                pattern_skeleton(p, supply, out);
            }
            Type::map_of(Type::Any, Type::Any)
        }
        Pattern::Struct { module, fields } => Type::Struct {
            module: module.clone(),
            fields: fields
                .iter()
                .map(|(name, p)| (name.clone(), pattern_skeleton(p, supply, out)))
                .collect(),
        },
    }
}
