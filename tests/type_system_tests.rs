//! Type system tests for Limpid
//!
//! This module tests the term model and its algebra:
//! - Substitution application, composition, and idempotence
//! - Occurs-check enforcement on both variable sorts
//! - Structural and row unification, including row-variable extension
//! - Scheme generalization and instantiation

use pretty_assertions::assert_eq;

use limpid::effects::{EffectLabel, EffectRow, Mfa};
use limpid::types::{
    EffectVar, FreeVars, Substitution, Type, TypeScheme, TypeVar, VarSupply, unify, unify_effect,
};

#[test]
fn test_substitution_application_is_idempotent() {
    let v1 = TypeVar::with_id(1);
    let v2 = TypeVar::with_id(2);
    let subst = Substitution::single_type(v1, Type::list(Type::Var(v2)))
        .compose(&Substitution::single_type(v2, Type::Integer));
    let normalized = subst.normalize();
    assert!(normalized.is_idempotent());

    let ty = Type::tuple(vec![Type::Var(v1), Type::Var(v2), Type::Atom]);
    let once = normalized.apply_to_type(&ty);
    let twice = normalized.apply_to_type(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_composition_is_associative_not_commutative() {
    let v1 = TypeVar::with_id(1);
    let v2 = TypeVar::with_id(2);
    let s1 = Substitution::single_type(v1, Type::Var(v2));
    let s2 = Substitution::single_type(v2, Type::Integer);

    let left = s2.compose(&s1);
    let right = s1.compose(&s2);
    // both orders resolve the chain through application
    assert_eq!(left.apply_to_type(&Type::Var(v1)), Type::Integer);
    assert_eq!(right.apply_to_type(&Type::Var(v1)), Type::Integer);

    let a = Substitution::single_type(v1, Type::Atom);
    let b = Substitution::single_type(v1, Type::Binary);
    assert_ne!(
        a.compose(&b).apply_to_type(&Type::Var(v1)),
        b.compose(&a).apply_to_type(&Type::Var(v1))
    );
}

#[test]
fn test_occurs_check_rejects_infinite_types() {
    let mut supply = VarSupply::new();
    let var = supply.fresh_type();

    for constructor in [
        Type::list(Type::Var(var)),
        Type::tuple(vec![Type::Integer, Type::Var(var)]),
        Type::map_of(Type::Atom, Type::Var(var)),
        Type::function(vec![Type::Var(var)], EffectRow::Empty, Type::Integer),
        Type::Union(vec![Type::Atom, Type::Var(var)]),
    ] {
        let result = unify(&Type::Var(var), &constructor, &mut supply, None);
        assert!(result.is_err(), "expected occurs failure for {constructor}");
    }
}

#[test]
fn test_effect_var_occurs_check_through_row_tail() {
    let mut supply = VarSupply::new();
    let mu = supply.fresh_effect();
    let label = EffectLabel::io(Mfa::new("IO", "puts", 1));
    let row = EffectRow::extend(label, EffectRow::var(mu));
    assert!(unify_effect(&EffectRow::var(mu), &row, &mut supply, None).is_err());
}

#[test]
fn test_unification_propagates_left_to_right() {
    let mut supply = VarSupply::new();
    let a = supply.fresh_type();
    let b = supply.fresh_type();
    // unifying tuple<a, a> with tuple<int, b> must drive b to int
    let t1 = Type::tuple(vec![Type::Var(a), Type::Var(a)]);
    let t2 = Type::tuple(vec![Type::Integer, Type::Var(b)]);
    let subst = unify(&t1, &t2, &mut supply, None).unwrap();
    assert_eq!(subst.apply_to_type(&Type::Var(b)), Type::Integer);
}

#[test]
fn test_function_types_unify_componentwise() {
    let mut supply = VarSupply::new();
    let a = supply.fresh_type();
    let mu = supply.fresh_effect();
    let f1 = Type::function(vec![Type::Var(a)], EffectRow::var(mu), Type::Var(a));
    let f2 = Type::function(
        vec![Type::Binary],
        EffectRow::single(EffectLabel::exception("ArgumentError")),
        Type::Binary,
    );
    let subst = unify(&f1, &f2, &mut supply, None).unwrap();
    assert_eq!(subst.apply_to_type(&Type::Var(a)), Type::Binary);
    let row = subst.apply_to_row(&EffectRow::var(mu));
    assert!(row.has_label(&EffectLabel::exception("ArgumentError")));
}

#[test]
fn test_row_extension_grows_open_rows() {
    let mut supply = VarSupply::new();
    let mu = supply.fresh_effect();
    let io = EffectLabel::io(Mfa::new("IO", "puts", 1));
    let fs = EffectLabel::fs(Mfa::new("File", "write", 3));

    let open = EffectRow::extend(io.clone(), EffectRow::var(mu));
    let concrete = EffectRow::extend(io.clone(), EffectRow::single(fs.clone()));
    let subst = unify_effect(&concrete, &open, &mut supply, None).unwrap();

    let grown = subst.apply_to_row(&EffectRow::var(mu));
    assert!(grown.has_label(&fs));
    assert!(!grown.has_label(&io));
}

#[test]
fn test_row_label_removal_strips_exactly_one() {
    let exn = EffectLabel::exception("Exn");
    let row = EffectRow::single(exn.clone())
        .combine(&EffectRow::single(exn.clone()))
        .combine(&EffectRow::single(EffectLabel::exception("Other")));
    assert_eq!(row.exception_count(), 3);

    let (after, removed) = row.remove_one_exception(Some("Exn"));
    assert!(removed);
    assert_eq!(after.exception_count(), 2);
    assert!(after.has_label(&exn));
    assert!(after.has_label(&EffectLabel::exception("Other")));
}

#[test]
fn test_scheme_instantiation_is_fresh_each_time() {
    let mut supply = VarSupply::new();
    let var = supply.fresh_type();
    let evar = supply.fresh_effect();
    let scheme = TypeScheme::polymorphic(
        vec![var],
        vec![evar],
        Type::function(vec![Type::Var(var)], EffectRow::var(evar), Type::Var(var)),
    );
    let a = scheme.instantiate(&mut supply);
    let b = scheme.instantiate(&mut supply);
    assert_ne!(a, b);
    // neither instance mentions the quantified variables
    assert!(!a.contains_type_var(var));
    assert!(!a.contains_effect_var(evar));
}

#[test]
fn test_generalization_respects_environment() {
    let keep = TypeVar::with_id(10);
    let mut env_free = FreeVars::new();
    env_free.types.insert(keep);

    let body = Type::function(
        vec![Type::Var(keep)],
        EffectRow::var(EffectVar::with_id(11)),
        Type::Var(TypeVar::with_id(12)),
    );
    let scheme = TypeScheme::generalize(&env_free, body);
    assert_eq!(scheme.type_vars, vec![TypeVar::with_id(12)]);
    assert_eq!(scheme.effect_vars, vec![EffectVar::with_id(11)]);
}

#[test]
fn test_stored_scheme_vars_are_bound_or_substituted() {
    // every variable in a generalized scheme is either quantified or free
    // in the environment
    let body = Type::tuple(vec![
        Type::Var(TypeVar::with_id(1)),
        Type::Var(TypeVar::with_id(2)),
    ]);
    let scheme = TypeScheme::generalize(&FreeVars::new(), body);
    assert!(scheme.free_vars().is_empty());
}
