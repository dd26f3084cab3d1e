//! Variable substitution for type and effect inference.
//!
//! A substitution maps type variables to types and effect variables to
//! rows. Substitutions are composed during unification; composition is
//! associative but not commutative, and composed substitutions are kept
//! idempotent.

use super::{EffectVar, Type, TypeScheme, TypeVar};
use crate::effects::EffectRow;
use std::collections::HashMap;
use std::fmt;

/// A substitution over both variable sorts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    /// Mapping from type variables to types
    types: HashMap<TypeVar, Type>,
    /// Mapping from effect variables to rows
    effects: HashMap<EffectVar, EffectRow>,
}

impl Substitution {
    /// Creates an empty substitution (identity).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a substitution with a single type-variable mapping.
    pub fn single_type(var: TypeVar, type_: Type) -> Self {
        let mut subst = Self::empty();
        subst.types.insert(var, type_);
        subst
    }

    /// Creates a substitution with a single effect-variable mapping.
    pub fn single_effect(var: EffectVar, row: EffectRow) -> Self {
        let mut subst = Self::empty();
        subst.effects.insert(var, row);
        subst
    }

    /// Returns true if this is the identity substitution.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.effects.is_empty()
    }

    /// Gets the mapping for a type variable, if any.
    pub fn get_type(&self, var: TypeVar) -> Option<&Type> {
        self.types.get(&var)
    }

    /// Gets the mapping for an effect variable, if any.
    pub fn get_effect(&self, var: EffectVar) -> Option<&EffectRow> {
        self.effects.get(&var)
    }

    /// Applies this substitution to a type, following chains to a fixed
    /// point.
    pub fn apply_to_type(&self, type_: &Type) -> Type {
        match type_ {
            Type::Var(var) => match self.types.get(var) {
                Some(image) => self.apply_to_type(image),
                None => type_.clone(),
            },
            Type::List(t) => Type::list(self.apply_to_type(t)),
            Type::Tuple(elements) => {
                Type::Tuple(elements.iter().map(|t| self.apply_to_type(t)).collect())
            }
            Type::Map(k, v) => Type::map_of(self.apply_to_type(k), self.apply_to_type(v)),
            Type::Union(elements) => {
                Type::Union(elements.iter().map(|t| self.apply_to_type(t)).collect())
            }
            Type::Struct { module, fields } => Type::Struct {
                module: module.clone(),
                fields: fields
                    .iter()
                    .map(|(name, t)| (name.clone(), self.apply_to_type(t)))
                    .collect(),
            },
            Type::Function {
                params,
                effects,
                ret,
            } => Type::Function {
                params: params.iter().map(|t| self.apply_to_type(t)).collect(),
                effects: self.apply_to_row(effects),
                ret: Box::new(self.apply_to_type(ret)),
            },
            Type::Closure {
                ret,
                captured,
                body,
            } => Type::Closure {
                ret: Box::new(self.apply_to_type(ret)),
                captured: self.apply_to_row(captured),
                body: self.apply_to_row(body),
            },
            Type::Forall {
                type_vars,
                effect_vars,
                body,
            } => {
                // Bound variables shadow the substitution
                let filtered = self.remove_vars(type_vars, effect_vars);
                Type::Forall {
                    type_vars: type_vars.clone(),
                    effect_vars: effect_vars.clone(),
                    body: Box::new(filtered.apply_to_type(body)),
                }
            }
            _ => type_.clone(),
        }
    }

    /// Applies this substitution to an effect row.
    ///
    /// Variables with an image are spliced in, recursively; duplicate
    /// non-exception labels introduced by splicing are collapsed.
    pub fn apply_to_row(&self, row: &EffectRow) -> EffectRow {
        let (labels, vars) = row.parts();
        let mut result = EffectRow::from_parts(labels, vec![]);
        for var in vars {
            match self.effects.get(&var) {
                Some(image) => {
                    let expanded = self.apply_to_row(image);
                    result = result.combine(&expanded);
                }
                None => {
                    result = result.combine(&EffectRow::var(var));
                }
            }
        }
        result
    }

    /// Applies this substitution to a type scheme, respecting its bound
    /// variables.
    pub fn apply_to_scheme(&self, scheme: &TypeScheme) -> TypeScheme {
        let filtered = self.remove_vars(&scheme.type_vars, &scheme.effect_vars);
        TypeScheme {
            type_vars: scheme.type_vars.clone(),
            effect_vars: scheme.effect_vars.clone(),
            body: filtered.apply_to_type(&scheme.body),
        }
    }

    /// Composes this substitution with another (`self ∘ other`).
    ///
    /// The result applies `other` first, then `self`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut types = HashMap::new();
        for (var, type_) in &other.types {
            types.insert(*var, self.apply_to_type(type_));
        }
        for (var, type_) in &self.types {
            if !other.types.contains_key(var) {
                types.insert(*var, type_.clone());
            }
        }

        let mut effects = HashMap::new();
        for (var, row) in &other.effects {
            effects.insert(*var, self.apply_to_row(row));
        }
        for (var, row) in &self.effects {
            if !other.effects.contains_key(var) {
                effects.insert(*var, row.clone());
            }
        }

        Substitution { types, effects }
    }

    /// Removes bound variables from the substitution domain.
    pub fn remove_vars(&self, type_vars: &[TypeVar], effect_vars: &[EffectVar]) -> Substitution {
        let mut out = self.clone();
        for var in type_vars {
            out.types.remove(var);
        }
        for var in effect_vars {
            out.effects.remove(var);
        }
        out
    }

    /// Domain of the type-variable mapping.
    pub fn type_domain(&self) -> Vec<TypeVar> {
        self.types.keys().copied().collect()
    }

    /// Domain of the effect-variable mapping.
    pub fn effect_domain(&self) -> Vec<EffectVar> {
        self.effects.keys().copied().collect()
    }

    /// Applies the substitution to its own range until a fixed point.
    pub fn normalize(&self) -> Substitution {
        let mut current = self.clone();
        loop {
            let mut changed = false;
            let mut types = HashMap::new();
            for (var, type_) in &current.types {
                let image = current.apply_to_type(type_);
                if &image != type_ {
                    changed = true;
                }
                types.insert(*var, image);
            }
            let mut effects = HashMap::new();
            for (var, row) in &current.effects {
                let image = current.apply_to_row(row);
                if &image != row {
                    changed = true;
                }
                effects.insert(*var, image);
            }
            current = Substitution { types, effects };
            if !changed {
                return current;
            }
        }
    }

    /// Returns true if applying the substitution twice equals applying it
    /// once.
    pub fn is_idempotent(&self) -> bool {
        self.types
            .values()
            .all(|t| self.apply_to_type(t) == *t)
            && self
                .effects
                .values()
                .all(|r| self.apply_to_row(r) == *r)
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "[")?;
        let mut first = true;
        for (var, type_) in &self.types {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{var} ↦ {type_}")?;
            first = false;
        }
        for (var, row) in &self.effects {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{var} ↦ {row}")?;
            first = false;
        }
        write!(f, "]")
    }
}

/// Extension trait for applying substitutions to various values.
pub trait Substitutable {
    /// Applies a substitution to this value.
    fn apply_substitution(&self, subst: &Substitution) -> Self;
}

impl Substitutable for Type {
    fn apply_substitution(&self, subst: &Substitution) -> Self {
        subst.apply_to_type(self)
    }
}

impl Substitutable for EffectRow {
    fn apply_substitution(&self, subst: &Substitution) -> Self {
        subst.apply_to_row(self)
    }
}

impl Substitutable for TypeScheme {
    fn apply_substitution(&self, subst: &Substitution) -> Self {
        subst.apply_to_scheme(self)
    }
}

impl<T: Substitutable> Substitutable for Vec<T> {
    fn apply_substitution(&self, subst: &Substitution) -> Self {
        self.iter().map(|x| x.apply_substitution(subst)).collect()
    }
}

impl<T: Substitutable> Substitutable for Option<T> {
    fn apply_substitution(&self, subst: &Substitution) -> Self {
        self.as_ref().map(|x| x.apply_substitution(subst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_substitution_is_identity() {
        let subst = Substitution::empty();
        assert!(subst.is_empty());
        assert!(subst.is_idempotent());
        assert_eq!(subst.apply_to_type(&Type::Integer), Type::Integer);
    }

    #[test]
    fn test_chain_application() {
        let v1 = TypeVar::with_id(1);
        let v2 = TypeVar::with_id(2);
        let s1 = Substitution::single_type(v1, Type::Var(v2));
        let s2 = Substitution::single_type(v2, Type::Integer);
        let composed = s2.compose(&s1);
        assert_eq!(composed.apply_to_type(&Type::Var(v1)), Type::Integer);
        assert_eq!(composed.apply_to_type(&Type::Var(v2)), Type::Integer);
        assert!(composed.normalize().is_idempotent());
    }

    #[test]
    fn test_application_is_idempotent() {
        let v1 = TypeVar::with_id(1);
        let subst = Substitution::single_type(v1, Type::list(Type::Integer));
        let ty = Type::tuple(vec![Type::Var(v1), Type::Atom]);
        let once = subst.apply_to_type(&ty);
        let twice = subst.apply_to_type(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_forall_shadows_bound_vars() {
        let v1 = TypeVar::with_id(1);
        let v2 = TypeVar::with_id(2);
        let subst = Substitution::single_type(v1, Type::Integer);
        let scheme_type = Type::forall(vec![v1], vec![], Type::Var(v1));
        assert_eq!(subst.apply_to_type(&scheme_type), scheme_type);

        let free_in_body = Type::forall(vec![v1], vec![], Type::Var(v2));
        let subst2 = Substitution::single_type(v2, Type::Binary);
        assert_eq!(
            subst2.apply_to_type(&free_in_body),
            Type::forall(vec![v1], vec![], Type::Binary)
        );
    }

    #[test]
    fn test_effect_var_splicing() {
        use crate::effects::{EffectLabel, Mfa};
        let evar = EffectVar::with_id(5);
        let label = EffectLabel::io(Mfa::new("IO", "puts", 1));
        let subst = Substitution::single_effect(evar, EffectRow::single(label.clone()));
        let row = EffectRow::from_parts(vec![], vec![evar]);
        let applied = subst.apply_to_row(&row);
        assert!(applied.has_label(&label));
        assert!(applied.parts().1.is_empty());
    }
}
