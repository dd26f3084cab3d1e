//! Post-processing of inferred rows into compact categories.

use crate::effects::{CompactEffect, EffectRow, to_compact};
use crate::types::{Substitution, Type};

/// Classifies the inferred effect row of a function clause.
///
/// The substitution is applied first, so effect variables that were bound
/// during inference contribute their labels. A row left holding only
/// variables is lambda-dependent only when at least one parameter was
/// inferred to a function or closure type; free variables with no callable
/// parameter to feed them instantiate to the empty row, so such a function
/// is pure. Everything else collapses under the severity rule.
pub fn classify(row: &EffectRow, subst: &Substitution, params: &[Type]) -> CompactEffect {
    let resolved = subst.apply_to_row(row);
    if resolved.is_vars_only() {
        return if has_callable_param(subst, params) {
            CompactEffect::Lambda
        } else {
            CompactEffect::Pure
        };
    }
    to_compact(&resolved)
}

fn has_callable_param(subst: &Substitution, params: &[Type]) -> bool {
    params.iter().any(|p| subst.apply_to_type(p).is_callable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectLabel, Mfa};
    use crate::types::{EffectVar, TypeVar, VarSupply};

    #[test]
    fn test_pure_row_classifies_pure() {
        let compact = classify(&EffectRow::Empty, &Substitution::empty(), &[]);
        assert_eq!(compact, CompactEffect::Pure);
    }

    #[test]
    fn test_var_only_row_with_function_param_is_lambda() {
        let mut supply = VarSupply::new();
        let evar = supply.fresh_effect();
        let row = EffectRow::var(evar);
        let param = Type::function(
            vec![Type::Var(TypeVar::with_id(9))],
            EffectRow::var(evar),
            Type::Var(TypeVar::with_id(10)),
        );
        let compact = classify(&row, &Substitution::empty(), &[param]);
        assert_eq!(compact, CompactEffect::Lambda);
    }

    #[test]
    fn test_var_only_row_without_callable_param_is_pure() {
        // a free effect variable untied to any function-typed parameter
        // instantiates to the empty row
        let row = EffectRow::var(EffectVar::with_id(1));
        let compact = classify(&row, &Substitution::empty(), &[Type::Integer]);
        assert_eq!(compact, CompactEffect::Pure);
    }

    #[test]
    fn test_unresolved_var_param_does_not_count_as_callable() {
        let row = EffectRow::var(EffectVar::with_id(1));
        let param = Type::Var(TypeVar::with_id(2));
        let compact = classify(&row, &Substitution::empty(), &[param]);
        assert_eq!(compact, CompactEffect::Pure);
    }

    #[test]
    fn test_closure_param_counts_as_callable() {
        let row = EffectRow::var(EffectVar::with_id(1));
        let param = Type::closure(
            Type::Var(TypeVar::with_id(2)),
            EffectRow::Empty,
            EffectRow::var(EffectVar::with_id(1)),
        );
        let compact = classify(&row, &Substitution::empty(), &[param]);
        assert_eq!(compact, CompactEffect::Lambda);
    }

    #[test]
    fn test_bound_effect_var_contributes_labels() {
        let evar = EffectVar::with_id(1);
        let label = EffectLabel::io(Mfa::new("IO", "puts", 1));
        let subst = Substitution::single_effect(evar, EffectRow::single(label));
        let compact = classify(&EffectRow::var(evar), &subst, &[]);
        assert_eq!(
            compact,
            CompactEffect::Side(vec![Mfa::new("IO", "puts", 1)])
        );
    }
}
