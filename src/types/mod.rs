//! Term model for the effect-inference engine.
//!
//! Types are immutable values; effect rows embedded in function and
//! closure types come from [`crate::effects::row`]. Polymorphism is
//! expressed with `forall` schemes quantifying both type and effect
//! variables.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub mod substitution;
pub mod type_env;
pub mod type_scheme;
pub mod type_var;
pub mod unification;

pub use substitution::*;
pub use type_env::*;
pub use type_scheme::*;
pub use type_var::*;
pub use unification::*;

use crate::effects::EffectRow;

/// A type in the analyzed language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    // ============= PRIMITIVES =============
    /// Integer type
    Integer,
    /// Float type
    Float,
    /// Boolean type
    Boolean,
    /// Atom type
    Atom,
    /// String / binary type
    Binary,
    /// Process identifier type
    Pid,
    /// Unique reference type
    Reference,
    /// The dynamic top type; unifies with anything
    Any,

    // ============= COMPOUND TYPES =============
    /// Homogeneous list
    List(Box<Type>),
    /// Fixed-shape tuple
    Tuple(Vec<Type>),
    /// Map from keys to values
    Map(Box<Type>, Box<Type>),
    /// Untagged union; unified only structurally
    Union(Vec<Type>),
    /// A struct of a concrete module, the protocol-carrying type
    Struct {
        /// Defining module
        module: String,
        /// Known field types
        fields: Vec<(String, Type)>,
    },

    // ============= FUNCTION TYPES =============
    /// A function with latent effects that fire on application
    Function {
        /// Parameter types
        params: Vec<Type>,
        /// Latent body effects
        effects: EffectRow,
        /// Return type
        ret: Box<Type>,
    },
    /// A function value created in an effectful context.
    ///
    /// Captured effects already fired at creation; body effects fire on
    /// application. Applications must not re-fire captured effects.
    Closure {
        /// Return type of an application
        ret: Box<Type>,
        /// Effects that fired when the closure was created
        captured: EffectRow,
        /// Latent body effects
        body: EffectRow,
    },

    // ============= VARIABLES AND SCHEMES =============
    /// Unification variable
    Var(TypeVar),
    /// Polymorphic scheme over type and effect variables
    Forall {
        /// Bound type variables
        type_vars: Vec<TypeVar>,
        /// Bound effect variables
        effect_vars: Vec<EffectVar>,
        /// Scheme body
        body: Box<Type>,
    },
}

/// Free variables of a term, split by sort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeVars {
    /// Free type variables
    pub types: HashSet<TypeVar>,
    /// Free effect variables
    pub effects: HashSet<EffectVar>,
}

impl FreeVars {
    /// An empty set of free variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unions another set into this one.
    pub fn extend(&mut self, other: FreeVars) {
        self.types.extend(other.types);
        self.effects.extend(other.effects);
    }

    /// Returns true if both sorts are empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.effects.is_empty()
    }
}

impl Type {
    /// Creates a list type.
    pub fn list(element: Type) -> Self {
        Self::List(Box::new(element))
    }

    /// Creates a tuple type.
    pub fn tuple(elements: Vec<Type>) -> Self {
        Self::Tuple(elements)
    }

    /// Creates a map type.
    pub fn map_of(key: Type, value: Type) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Creates a function type.
    pub fn function(params: Vec<Type>, effects: EffectRow, ret: Type) -> Self {
        Self::Function {
            params,
            effects,
            ret: Box::new(ret),
        }
    }

    /// Creates a closure type.
    pub fn closure(ret: Type, captured: EffectRow, body: EffectRow) -> Self {
        Self::Closure {
            ret: Box::new(ret),
            captured,
            body,
        }
    }

    /// Creates a struct type with no known fields.
    pub fn struct_of(module: impl Into<String>) -> Self {
        Self::Struct {
            module: module.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a forall scheme type; returns the body unchanged when
    /// nothing is quantified.
    pub fn forall(type_vars: Vec<TypeVar>, effect_vars: Vec<EffectVar>, body: Type) -> Self {
        if type_vars.is_empty() && effect_vars.is_empty() {
            body
        } else {
            Self::Forall {
                type_vars,
                effect_vars,
                body: Box::new(body),
            }
        }
    }

    /// Returns true for function and closure types.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function { .. } | Self::Closure { .. })
    }

    /// Collects the free variables of this type, both sorts.
    pub fn free_vars(&self) -> FreeVars {
        let mut out = FreeVars::new();
        self.collect_free_vars(&mut out);
        out
    }

    fn collect_free_vars(&self, out: &mut FreeVars) {
        match self {
            Self::Integer
            | Self::Float
            | Self::Boolean
            | Self::Atom
            | Self::Binary
            | Self::Pid
            | Self::Reference
            | Self::Any => {}
            Self::List(t) => t.collect_free_vars(out),
            Self::Tuple(elements) | Self::Union(elements) => {
                for t in elements {
                    t.collect_free_vars(out);
                }
            }
            Self::Map(k, v) => {
                k.collect_free_vars(out);
                v.collect_free_vars(out);
            }
            Self::Struct { fields, .. } => {
                for (_, t) in fields {
                    t.collect_free_vars(out);
                }
            }
            Self::Function {
                params,
                effects,
                ret,
            } => {
                for t in params {
                    t.collect_free_vars(out);
                }
                out.effects.extend(effects.parts().1);
                ret.collect_free_vars(out);
            }
            Self::Closure {
                ret,
                captured,
                body,
            } => {
                ret.collect_free_vars(out);
                out.effects.extend(captured.parts().1);
                out.effects.extend(body.parts().1);
            }
            Self::Var(var) => {
                out.types.insert(*var);
            }
            Self::Forall {
                type_vars,
                effect_vars,
                body,
            } => {
                let mut inner = FreeVars::new();
                body.collect_free_vars(&mut inner);
                for var in type_vars {
                    inner.types.remove(var);
                }
                for var in effect_vars {
                    inner.effects.remove(var);
                }
                out.extend(inner);
            }
        }
    }

    /// Returns true if the given type variable occurs in this type,
    /// walking every constructor including row tails and forall bodies.
    pub fn contains_type_var(&self, var: TypeVar) -> bool {
        self.free_vars().types.contains(&var)
    }

    /// Returns true if the given effect variable occurs in this type.
    pub fn contains_effect_var(&self, var: EffectVar) -> bool {
        self.free_vars().effects.contains(&var)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "bool"),
            Self::Atom => write!(f, "atom"),
            Self::Binary => write!(f, "binary"),
            Self::Pid => write!(f, "pid"),
            Self::Reference => write!(f, "reference"),
            Self::Any => write!(f, "any"),
            Self::List(t) => write!(f, "list<{t}>"),
            Self::Tuple(elements) => {
                write!(f, "tuple<")?;
                for (i, t) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ">")
            }
            Self::Map(k, v) => write!(f, "map<{k}, {v}>"),
            Self::Union(elements) => {
                write!(f, "union<")?;
                for (i, t) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ">")
            }
            Self::Struct { module, .. } => write!(f, "%{module}{{}}"),
            Self::Function {
                params,
                effects,
                ret,
            } => {
                write!(f, "(")?;
                for (i, t) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ") -{effects}-> {ret}")
            }
            Self::Closure {
                ret,
                captured,
                body,
            } => write!(f, "closure<{ret}, captured {captured}, body {body}>"),
            Self::Var(var) => write!(f, "{var}"),
            Self::Forall {
                type_vars,
                effect_vars,
                body,
            } => {
                write!(f, "forall ")?;
                for (i, var) in type_vars.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{var}")?;
                }
                for var in effect_vars {
                    write!(f, " {var}")?;
                }
                write!(f, ". {body}")
            }
        }
    }
}
