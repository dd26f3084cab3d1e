//! Polymorphic type schemes: generalization and instantiation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EffectVar, FreeVars, Substitution, Type, TypeVar, VarSupply};
use crate::effects::EffectRow;

/// A type paired with its universally quantified variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeScheme {
    /// Quantified type variables
    pub type_vars: Vec<TypeVar>,
    /// Quantified effect variables
    pub effect_vars: Vec<EffectVar>,
    /// The scheme body
    pub body: Type,
}

impl TypeScheme {
    /// Creates a monomorphic scheme.
    pub fn monomorphic(body: Type) -> Self {
        Self {
            type_vars: Vec::new(),
            effect_vars: Vec::new(),
            body,
        }
    }

    /// Creates a polymorphic scheme.
    pub fn polymorphic(type_vars: Vec<TypeVar>, effect_vars: Vec<EffectVar>, body: Type) -> Self {
        Self {
            type_vars,
            effect_vars,
            body,
        }
    }

    /// Generalizes a type over everything not free in the environment.
    pub fn generalize(env_free: &FreeVars, body: Type) -> Self {
        let free = body.free_vars();
        let mut type_vars: Vec<TypeVar> = free
            .types
            .into_iter()
            .filter(|v| !env_free.types.contains(v))
            .collect();
        let mut effect_vars: Vec<EffectVar> = free
            .effects
            .into_iter()
            .filter(|v| !env_free.effects.contains(v))
            .collect();
        type_vars.sort();
        effect_vars.sort();
        Self {
            type_vars,
            effect_vars,
            body,
        }
    }

    /// Instantiates the scheme, α-renaming every bound variable to a
    /// fresh one.
    pub fn instantiate(&self, supply: &mut VarSupply) -> Type {
        if self.type_vars.is_empty() && self.effect_vars.is_empty() {
            return self.body.clone();
        }
        let mut subst = Substitution::empty();
        for var in &self.type_vars {
            subst = subst.compose(&Substitution::single_type(
                *var,
                Type::Var(supply.fresh_type()),
            ));
        }
        for var in &self.effect_vars {
            subst = subst.compose(&Substitution::single_effect(
                *var,
                EffectRow::var(supply.fresh_effect()),
            ));
        }
        subst.apply_to_type(&self.body)
    }

    /// Free variables of the scheme: free variables of the body minus the
    /// quantified ones.
    pub fn free_vars(&self) -> FreeVars {
        let mut free = self.body.free_vars();
        for var in &self.type_vars {
            free.types.remove(var);
        }
        for var in &self.effect_vars {
            free.effects.remove(var);
        }
        free
    }

    /// Returns true if the scheme quantifies nothing.
    pub fn is_monomorphic(&self) -> bool {
        self.type_vars.is_empty() && self.effect_vars.is_empty()
    }
}

impl fmt::Display for TypeScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_monomorphic() {
            return write!(f, "{}", self.body);
        }
        write!(f, "forall")?;
        for var in &self.type_vars {
            write!(f, " {var}")?;
        }
        for var in &self.effect_vars {
            write!(f, " {var}")?;
        }
        write!(f, ". {}", self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_renames_bound_vars() {
        let var = TypeVar::with_id(0);
        let scheme = TypeScheme::polymorphic(
            vec![var],
            vec![],
            Type::function(
                vec![Type::Var(var)],
                EffectRow::Empty,
                Type::Var(var),
            ),
        );
        let mut supply = VarSupply::new();
        supply.fresh_type(); // keep ids distinct from the scheme's own
        let instance = scheme.instantiate(&mut supply);
        match instance {
            Type::Function { params, ret, .. } => {
                assert_eq!(params[0], *ret);
                assert_ne!(params[0], Type::Var(var));
            }
            other => panic!("expected function type, got {other}"),
        }
    }

    #[test]
    fn test_generalize_skips_env_vars() {
        let keep = TypeVar::with_id(1);
        let quantify = TypeVar::with_id(2);
        let mut env_free = FreeVars::new();
        env_free.types.insert(keep);
        let scheme = TypeScheme::generalize(
            &env_free,
            Type::tuple(vec![Type::Var(keep), Type::Var(quantify)]),
        );
        assert_eq!(scheme.type_vars, vec![quantify]);
        assert!(scheme.free_vars().types.contains(&keep));
    }

    #[test]
    fn test_two_instantiations_are_independent() {
        let var = TypeVar::with_id(0);
        let scheme = TypeScheme::polymorphic(vec![var], vec![], Type::Var(var));
        let mut supply = VarSupply::new();
        supply.fresh_type();
        let a = scheme.instantiate(&mut supply);
        let b = scheme.instantiate(&mut supply);
        assert_ne!(a, b);
    }
}
