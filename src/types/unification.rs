//! Structural type unification and effect-row unification.
//!
//! The unifier accumulates a substitution; every variable binding passes
//! an occurs-check, so infinite types are impossible by construction. Row
//! unification removes exactly one occurrence of a matched label and may
//! extend a trailing row variable when a label is missing.

use log::trace;

use super::{EffectVar, Substitution, Type, TypeVar, VarSupply};
use crate::diagnostics::{Error, Result, Span};
use crate::effects::EffectRow;

/// The unification engine.
///
/// Holds the substitution accumulated so far plus the analysis variable
/// supply, which row extension draws fresh variables from.
#[derive(Debug)]
pub struct Unifier<'s> {
    substitution: Substitution,
    supply: &'s mut VarSupply,
}

impl<'s> Unifier<'s> {
    /// Creates a unifier with the identity substitution.
    pub fn new(supply: &'s mut VarSupply) -> Self {
        Self {
            substitution: Substitution::empty(),
            supply,
        }
    }

    /// Creates a unifier seeded with an existing substitution.
    pub fn with_substitution(substitution: Substitution, supply: &'s mut VarSupply) -> Self {
        Self {
            substitution,
            supply,
        }
    }

    /// The substitution accumulated so far.
    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    /// Extracts the final substitution, normalized to idempotence.
    pub fn into_substitution(self) -> Substitution {
        self.substitution.normalize()
    }

    /// Unifies two types under the current substitution.
    pub fn unify(&mut self, type1: &Type, type2: &Type, span: Option<Span>) -> Result<()> {
        let t1 = self.substitution.apply_to_type(type1);
        let t2 = self.substitution.apply_to_type(type2);
        trace!("unify {t1} ∼ {t2}");
        self.unify_types(&t1, &t2, span)
    }

    fn unify_types(&mut self, type1: &Type, type2: &Type, span: Option<Span>) -> Result<()> {
        match (type1, type2) {
            // Equal terms unify trivially
            (t1, t2) if t1 == t2 => Ok(()),

            // The dynamic top type unifies with anything
            (Type::Any, _) | (_, Type::Any) => Ok(()),

            // Variable binding with occurs-check
            (Type::Var(var), other) | (other, Type::Var(var)) => {
                self.unify_type_variable(*var, other, span)
            }

            (Type::List(t1), Type::List(t2)) => self.unify(t1, t2, span),

            (Type::Tuple(e1), Type::Tuple(e2)) => {
                if e1.len() != e2.len() {
                    return Err(Box::new(Error::cannot_unify(type1, type2, span)));
                }
                for (t1, t2) in e1.iter().zip(e2.iter()) {
                    self.unify(t1, t2, span)?;
                }
                Ok(())
            }

            (Type::Map(k1, v1), Type::Map(k2, v2)) => {
                self.unify(k1, k2, span)?;
                self.unify(v1, v2, span)
            }

            // Unions are structural: same shape, memberwise unification
            (Type::Union(u1), Type::Union(u2)) => {
                if u1.len() != u2.len() {
                    return Err(Box::new(Error::cannot_unify_unions(type1, type2, span)));
                }
                for (t1, t2) in u1.iter().zip(u2.iter()) {
                    self.unify(t1, t2, span)
                        .map_err(|_| Box::new(Error::cannot_unify_unions(type1, type2, span)))?;
                }
                Ok(())
            }

            (
                Type::Struct {
                    module: m1,
                    fields: f1,
                },
                Type::Struct {
                    module: m2,
                    fields: f2,
                },
            ) => {
                if m1 != m2 {
                    return Err(Box::new(Error::cannot_unify(type1, type2, span)));
                }
                for (name, t1) in f1 {
                    if let Some((_, t2)) = f2.iter().find(|(n, _)| n == name) {
                        self.unify(t1, t2, span)?;
                    }
                }
                Ok(())
            }

            (
                Type::Function {
                    params: p1,
                    effects: e1,
                    ret: r1,
                },
                Type::Function {
                    params: p2,
                    effects: e2,
                    ret: r2,
                },
            ) => {
                if p1.len() != p2.len() {
                    return Err(Box::new(Error::cannot_unify(type1, type2, span)));
                }
                for (t1, t2) in p1.iter().zip(p2.iter()) {
                    self.unify(t1, t2, span)?;
                }
                self.unify_effects(e1, e2, span)?;
                self.unify(r1, r2, span)
            }

            (
                Type::Closure {
                    ret: r1,
                    captured: c1,
                    body: b1,
                },
                Type::Closure {
                    ret: r2,
                    captured: c2,
                    body: b2,
                },
            ) => {
                self.unify(r1, r2, span)?;
                self.unify_effects(c1, c2, span)?;
                self.unify_effects(b1, b2, span)
            }

            // A closure applied where a function is expected: match the
            // return types and latent rows
            (
                Type::Closure { ret: r1, body: b1, .. },
                Type::Function {
                    effects: e2,
                    ret: r2,
                    ..
                },
            )
            | (
                Type::Function {
                    effects: e2,
                    ret: r2,
                    ..
                },
                Type::Closure { ret: r1, body: b1, .. },
            ) => {
                self.unify(r1, r2, span)?;
                self.unify_effects(b1, e2, span)
            }

            (
                Type::Forall {
                    type_vars: tv1,
                    effect_vars: ev1,
                    body: b1,
                },
                Type::Forall {
                    type_vars: tv2,
                    effect_vars: ev2,
                    body: b2,
                },
            ) => {
                if tv1.len() != tv2.len() || ev1.len() != ev2.len() {
                    return Err(Box::new(Error::cannot_unify(type1, type2, span)));
                }
                // α-rename the right side's bound variables to the left's
                let mut rename = Substitution::empty();
                for (v1, v2) in tv1.iter().zip(tv2.iter()) {
                    rename = rename.compose(&Substitution::single_type(*v2, Type::Var(*v1)));
                }
                for (v1, v2) in ev1.iter().zip(ev2.iter()) {
                    rename =
                        rename.compose(&Substitution::single_effect(*v2, EffectRow::var(*v1)));
                }
                let renamed = rename.apply_to_type(b2);
                self.unify(b1, &renamed, span)
            }

            _ => Err(Box::new(Error::cannot_unify(type1, type2, span))),
        }
    }

    fn unify_type_variable(&mut self, var: TypeVar, type_: &Type, span: Option<Span>) -> Result<()> {
        if let Some(bound) = self.substitution.get_type(var).cloned() {
            return self.unify_types(&bound, type_, span);
        }
        if let Type::Var(other) = type_ {
            if *other == var {
                return Ok(());
            }
        }
        if type_.contains_type_var(var) {
            return Err(Box::new(Error::occurs_check_failed(
                TypeVar::with_id(var.id),
                type_,
                span,
            )));
        }
        let binding = Substitution::single_type(var, type_.clone());
        self.substitution = binding.compose(&self.substitution);
        Ok(())
    }

    /// Unifies two effect rows under the current substitution.
    pub fn unify_effects(&mut self, row1: &EffectRow, row2: &EffectRow, span: Option<Span>) -> Result<()> {
        let r1 = self.substitution.apply_to_row(row1);
        let r2 = self.substitution.apply_to_row(row2);
        trace!("unify rows {r1} ∼ {r2}");
        self.unify_rows(&r1, &r2, span)
    }

    fn unify_rows(&mut self, row1: &EffectRow, row2: &EffectRow, span: Option<Span>) -> Result<()> {
        // Unknown is the top of the lattice: information is already lost,
        // nothing to refine
        if row1.has_unknown() || row2.has_unknown() {
            return Ok(());
        }

        let (labels1, vars1) = row1.parts();
        let (labels2, vars2) = row2.parts();

        if labels1.is_empty() && vars1.is_empty() && labels2.is_empty() && vars2.is_empty() {
            return Ok(());
        }

        // A bare variable on either side binds to the whole other row
        if labels1.is_empty() && !vars1.is_empty() {
            return self.bind_row_vars(&vars1, row2, span);
        }
        if labels2.is_empty() && !vars2.is_empty() {
            return self.bind_row_vars(&vars2, row1, span);
        }

        // Closed-empty against labels cannot unify
        if labels1.is_empty() && vars1.is_empty() {
            return Err(Box::new(Error::non_empty_with_empty(row2, span)));
        }

        let (head, tail1) = row1
            .split_first_label()
            .expect("row with labels has a first label");

        // Scan the other row for the head label, removing one occurrence
        if let Some(rest2) = row2.remove_one(&head) {
            return self.unify_rows(&tail1, &rest2, span);
        }

        // Not present but extensible: grow the trailing variable
        if let Some(var) = vars2.first() {
            let fresh = self.supply.fresh_effect();
            self.bind_effect_variable(
                *var,
                &EffectRow::extend(head.clone(), EffectRow::var(fresh)),
                span,
            )?;
            let r1 = self.substitution.apply_to_row(row1);
            let r2 = self.substitution.apply_to_row(row2);
            return self.unify_rows(&r1, &r2, span);
        }

        // Closed row without the label
        if labels2.is_empty() {
            return Err(Box::new(Error::non_empty_with_empty(row1, span)));
        }
        Err(Box::new(Error::incompatible_effect_rows(row1, row2, span)))
    }

    fn bind_row_vars(
        &mut self,
        vars: &[EffectVar],
        target: &EffectRow,
        span: Option<Span>,
    ) -> Result<()> {
        // The first variable absorbs the target row; companions collapse
        // to empty
        let mut iter = vars.iter();
        if let Some(first) = iter.next() {
            self.bind_effect_variable(*first, target, span)?;
        }
        for var in iter {
            self.bind_effect_variable(*var, &EffectRow::Empty, span)?;
        }
        Ok(())
    }

    fn bind_effect_variable(
        &mut self,
        var: EffectVar,
        row: &EffectRow,
        span: Option<Span>,
    ) -> Result<()> {
        if let Some(bound) = self.substitution.get_effect(var).cloned() {
            return self.unify_rows(&bound, row, span);
        }
        if let EffectRow::Var(other) = row {
            if *other == var {
                return Ok(());
            }
        }
        if row.contains_var(var) {
            return Err(Box::new(Error::occurs_check_failed(var, row, span)));
        }
        let binding = Substitution::single_effect(var, row.clone());
        self.substitution = binding.compose(&self.substitution);
        Ok(())
    }
}

/// Convenience function unifying two types from scratch.
pub fn unify(
    type1: &Type,
    type2: &Type,
    supply: &mut VarSupply,
    span: Option<Span>,
) -> Result<Substitution> {
    let mut unifier = Unifier::new(supply);
    unifier.unify(type1, type2, span)?;
    Ok(unifier.into_substitution())
}

/// Convenience function unifying two effect rows from scratch.
pub fn unify_effect(
    row1: &EffectRow,
    row2: &EffectRow,
    supply: &mut VarSupply,
    span: Option<Span>,
) -> Result<Substitution> {
    let mut unifier = Unifier::new(supply);
    unifier.unify_effects(row1, row2, span)?;
    Ok(unifier.into_substitution())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectLabel, Mfa};

    fn io_label() -> EffectLabel {
        EffectLabel::io(Mfa::new("IO", "puts", 1))
    }

    #[test]
    fn test_unify_identical_primitives() {
        let mut supply = VarSupply::new();
        let subst = unify(&Type::Integer, &Type::Integer, &mut supply, None).unwrap();
        assert!(subst.is_empty());
    }

    #[test]
    fn test_unify_variable_binds() {
        let mut supply = VarSupply::new();
        let var = supply.fresh_type();
        let subst = unify(&Type::Var(var), &Type::Binary, &mut supply, None).unwrap();
        assert_eq!(subst.apply_to_type(&Type::Var(var)), Type::Binary);
    }

    #[test]
    fn test_occurs_check_fails() {
        let mut supply = VarSupply::new();
        let var = supply.fresh_type();
        let recursive = Type::list(Type::Var(var));
        let result = unify(&Type::Var(var), &recursive, &mut supply, None);
        assert!(matches!(
            result.unwrap_err().as_ref(),
            Error::OccursCheckFailed { .. }
        ));
    }

    #[test]
    fn test_function_unification_propagates() {
        let mut supply = VarSupply::new();
        let a = supply.fresh_type();
        let b = supply.fresh_type();
        let f1 = Type::function(vec![Type::Var(a)], EffectRow::Empty, Type::Var(b));
        let f2 = Type::function(vec![Type::Integer], EffectRow::Empty, Type::Boolean);
        let subst = unify(&f1, &f2, &mut supply, None).unwrap();
        assert_eq!(subst.apply_to_type(&Type::Var(a)), Type::Integer);
        assert_eq!(subst.apply_to_type(&Type::Var(b)), Type::Boolean);
    }

    #[test]
    fn test_mismatched_primitives_fail() {
        let mut supply = VarSupply::new();
        assert!(unify(&Type::Integer, &Type::Binary, &mut supply, None).is_err());
    }

    #[test]
    fn test_any_unifies_with_everything() {
        let mut supply = VarSupply::new();
        assert!(unify(&Type::Any, &Type::Pid, &mut supply, None).is_ok());
        assert!(unify(&Type::list(Type::Integer), &Type::Any, &mut supply, None).is_ok());
    }

    #[test]
    fn test_union_shape_mismatch() {
        let mut supply = VarSupply::new();
        let u1 = Type::Union(vec![Type::Integer, Type::Atom]);
        let u2 = Type::Union(vec![Type::Integer]);
        let result = unify(&u1, &u2, &mut supply, None);
        assert!(matches!(
            result.unwrap_err().as_ref(),
            Error::CannotUnifyUnions { .. }
        ));
    }

    #[test]
    fn test_forall_alpha_renaming() {
        let mut supply = VarSupply::new();
        let v1 = supply.fresh_type();
        let v2 = supply.fresh_type();
        let s1 = Type::forall(vec![v1], vec![], Type::list(Type::Var(v1)));
        let s2 = Type::forall(vec![v2], vec![], Type::list(Type::Var(v2)));
        assert!(unify(&s1, &s2, &mut supply, None).is_ok());
    }

    #[test]
    fn test_forall_arity_mismatch() {
        let mut supply = VarSupply::new();
        let v1 = supply.fresh_type();
        let v2 = supply.fresh_type();
        let v3 = supply.fresh_type();
        let s1 = Type::forall(vec![v1], vec![], Type::Var(v1));
        let s2 = Type::forall(
            vec![v2, v3],
            vec![],
            Type::tuple(vec![Type::Var(v2), Type::Var(v3)]),
        );
        assert!(unify(&s1, &s2, &mut supply, None).is_err());
    }

    #[test]
    fn test_row_unification_extends_variable() {
        let mut supply = VarSupply::new();
        let mu = supply.fresh_effect();
        let open = EffectRow::var(mu);
        let concrete = EffectRow::single(io_label());
        let subst = unify_effect(&concrete, &open, &mut supply, None).unwrap();
        let expanded = subst.apply_to_row(&EffectRow::var(mu));
        assert!(expanded.has_label(&io_label()));
    }

    #[test]
    fn test_row_closed_missing_label_fails() {
        let mut supply = VarSupply::new();
        let r1 = EffectRow::single(io_label());
        let r2 = EffectRow::single(EffectLabel::exception("KeyError"));
        assert!(unify_effect(&r1, &r2, &mut supply, None).is_err());
    }

    #[test]
    fn test_row_empty_vs_labeled_fails() {
        let mut supply = VarSupply::new();
        let result = unify_effect(
            &EffectRow::Empty,
            &EffectRow::single(io_label()),
            &mut supply,
            None,
        );
        assert!(matches!(
            result.unwrap_err().as_ref(),
            Error::CannotUnifyNonEmptyWithEmpty { .. }
        ));
    }

    #[test]
    fn test_duplicate_labels_need_duplicates_on_both_sides() {
        let mut supply = VarSupply::new();
        let exn = EffectLabel::exception("Exn");
        let twice = EffectRow::single(exn.clone()).combine(&EffectRow::single(exn.clone()));
        let once = EffectRow::single(exn);
        // Removing one occurrence leaves one unmatched label
        assert!(unify_effect(&twice, &once, &mut supply, None).is_err());
        assert!(unify_effect(&twice, &twice, &mut supply, None).is_ok());
    }

    #[test]
    fn test_unknown_row_unifies_with_anything() {
        let mut supply = VarSupply::new();
        let unknown = EffectRow::single(EffectLabel::Unknown);
        let io = EffectRow::single(io_label());
        assert!(unify_effect(&unknown, &io, &mut supply, None).is_ok());
        assert!(unify_effect(&io, &unknown, &mut supply, None).is_ok());
    }

    #[test]
    fn test_effect_var_occurs_check() {
        let mut supply = VarSupply::new();
        let mu = supply.fresh_effect();
        let row = EffectRow::extend(io_label(), EffectRow::var(mu));
        let result = unify_effect(&EffectRow::var(mu), &row, &mut supply, None);
        assert!(matches!(
            result.unwrap_err().as_ref(),
            Error::OccursCheckFailed { .. }
        ));
    }
}
