//! Effect system tests for Limpid
//!
//! This module tests the effect vocabulary around the walker:
//! - Severity lattice and compact/row conversions
//! - Registry seeding, merging, overrides, and resolution chains
//! - Protocol dispatch resolution over narrowed types

use pretty_assertions::assert_eq;

use limpid::effects::{
    CompactEffect, EffectLabel, EffectRegistry, EffectRow, ExceptionType, Mfa, Protocol,
    ProtocolResolver, RegistryEntry, Resolution, Severity, from_compact, to_compact,
};
use limpid::types::{EffectVar, VarSupply};
use limpid::types::Type;

fn mfa(s: &str) -> Mfa {
    s.parse().unwrap()
}

#[test]
fn test_severity_total_order() {
    let ascending = [
        Severity::Pure,
        Severity::Lambda,
        Severity::Exception,
        Severity::Dependent,
        Severity::Side,
        Severity::Nif,
        Severity::Unknown,
    ];
    for pair in ascending.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn test_compact_round_trip_preserves_severity_and_payloads() {
    let mut supply = VarSupply::new();
    let cases = [
        CompactEffect::Pure,
        CompactEffect::Lambda,
        CompactEffect::Exception(vec![
            ExceptionType::named("ArgumentError"),
            ExceptionType::Dynamic,
        ]),
        CompactEffect::Dependent(vec![mfa("System.get_env/1")]),
        CompactEffect::Side(vec![mfa("File.write/3"), mfa("IO.puts/1")]),
        CompactEffect::Nif(vec![mfa(":crypto.hash/2")]),
        CompactEffect::Unknown,
    ];
    for compact in cases {
        let row = from_compact(&compact, &mut supply);
        let back = to_compact(&row);
        assert_eq!(back.severity(), compact.severity(), "severity of {compact}");
        assert_eq!(back, compact, "payload of {compact}");
    }
}

#[test]
fn test_to_compact_collapses_to_most_severe() {
    let row = EffectRow::from_parts(
        vec![
            EffectLabel::exception("KeyError"),
            EffectLabel::Dependent(mfa("System.get_env/1")),
            EffectLabel::io(mfa("IO.puts/1")),
        ],
        vec![EffectVar::with_id(1)],
    );
    assert_eq!(to_compact(&row), CompactEffect::Side(vec![mfa("IO.puts/1")]));
}

#[test]
fn test_payloads_are_sorted_and_deduplicated() {
    let row = EffectRow::from_parts(
        vec![
            EffectLabel::io(mfa("IO.puts/1")),
            EffectLabel::fs(mfa("File.write/3")),
            EffectLabel::io(mfa("IO.puts/1")),
        ],
        vec![],
    );
    assert_eq!(
        to_compact(&row),
        CompactEffect::Side(vec![mfa("File.write/3"), mfa("IO.puts/1")])
    );
}

#[test]
fn test_builtin_registry_surface() {
    let registry = EffectRegistry::with_builtins();
    assert!(registry.len() > 400);
    assert_eq!(
        registry.effect_of(&mfa("IO.puts/1")),
        Some(CompactEffect::Side(vec![mfa("IO.puts/1")]))
    );
    assert_eq!(registry.effect_of(&mfa("Map.get/2")), Some(CompactEffect::Pure));
    assert_eq!(
        registry.effect_of(&mfa("Enum.map/2")),
        Some(CompactEffect::Lambda)
    );
    assert_eq!(
        registry.effect_of(&mfa("DateTime.utc_now/0")),
        Some(CompactEffect::Dependent(vec![mfa("DateTime.utc_now/0")]))
    );
    assert_eq!(
        registry.effect_of(&mfa("Kernel.apply/3")),
        Some(CompactEffect::Unknown)
    );
    assert_eq!(
        registry.effect_of(&mfa(":crypto.hash/2")),
        Some(CompactEffect::Nif(vec![mfa(":crypto.hash/2")]))
    );
    assert_eq!(
        registry.effect_of(&mfa("Map.fetch!/2")),
        Some(CompactEffect::Exception(vec![ExceptionType::named(
            "KeyError"
        )]))
    );
}

#[test]
fn test_override_document_merges_over_builtins() {
    let registry = EffectRegistry::with_builtins();
    let overrides = r#"{
        "IO.puts/1": "p",
        "MyApp.Repo.insert/1": {"s": ["MyApp.Repo.insert/1"]},
        "MyApp.Cache.get/1": "d"
    }"#;
    assert_eq!(registry.load_overrides(overrides).unwrap(), 3);

    // the override wins the category
    assert_eq!(
        registry.effect_of(&mfa("IO.puts/1")),
        Some(CompactEffect::Pure)
    );
    assert_eq!(
        registry.effect_of(&mfa("MyApp.Repo.insert/1")),
        Some(CompactEffect::Side(vec![mfa("MyApp.Repo.insert/1")]))
    );
}

#[test]
fn test_same_category_override_unions_payloads() {
    let registry = EffectRegistry::new();
    registry.merge(
        mfa("M.f/1"),
        RegistryEntry::new(CompactEffect::Side(vec![mfa("IO.puts/1")])),
    );
    registry.apply_override(
        mfa("M.f/1"),
        RegistryEntry::new(CompactEffect::Side(vec![mfa("File.write/3")])),
    );
    assert_eq!(
        registry.effect_of(&mfa("M.f/1")),
        Some(CompactEffect::Side(vec![
            mfa("File.write/3"),
            mfa("IO.puts/1")
        ]))
    );
}

#[test]
fn test_resolution_chains_reach_bottommost_leaves() {
    let registry = EffectRegistry::with_builtins();
    assert_eq!(
        registry.resolve_to_leaves(&mfa("File.read!/1")),
        vec![mfa("File.read/1")]
    );
    // an entry without a chain is its own leaf
    assert_eq!(
        registry.resolve_to_leaves(&mfa("IO.puts/1")),
        vec![mfa("IO.puts/1")]
    );
}

#[test]
fn test_registry_document_round_trip() {
    let registry = EffectRegistry::new();
    registry.load_overrides(r#"{
        "A.pure/0": "p",
        "A.hof/1": "l",
        "A.env/0": "d",
        "A.native/1": "n",
        "A.magic/2": "u",
        "A.save/1": {"s": ["File.write/3"], "resolve": ["File.write/3"]},
        "A.pick/1": {"e": ["KeyError"]}
    }"#).unwrap();

    let document = registry.to_document();
    let reloaded = EffectRegistry::new();
    reloaded.load_overrides(&document).unwrap();

    for key in [
        "A.pure/0", "A.hof/1", "A.env/0", "A.native/1", "A.magic/2", "A.save/1", "A.pick/1",
    ] {
        assert_eq!(
            reloaded.entry(&mfa(key)),
            registry.entry(&mfa(key)),
            "round trip of {key}"
        );
    }
}

#[test]
fn test_protocol_resolution_by_narrowed_type() {
    let resolver = ProtocolResolver::new();

    assert_eq!(
        resolver.resolve(Protocol::Enumerable, &Type::list(Type::Integer)),
        Resolution::Impl(mfa("Enumerable.List.reduce/3"))
    );
    assert_eq!(
        resolver.resolve(Protocol::Enumerable, &Type::map_of(Type::Atom, Type::Any)),
        Resolution::Impl(mfa("Enumerable.Map.reduce/3"))
    );
    assert_eq!(
        resolver.resolve(Protocol::StringChars, &Type::Integer),
        Resolution::Impl(mfa("String.Chars.Integer.to_string/1"))
    );
    assert_eq!(
        resolver.resolve(Protocol::Inspect, &Type::struct_of("MapSet")),
        Resolution::Impl(mfa("Inspect.MapSet.inspect/2"))
    );
}

#[test]
fn test_resolved_impls_exist_in_builtin_registry() {
    // a dispatch site with a concretely typed receiver must find its
    // implementation's effect in the registry
    let registry = EffectRegistry::with_builtins();
    let resolver = ProtocolResolver::new();
    for receiver in [
        Type::list(Type::Any),
        Type::map_of(Type::Any, Type::Any),
        Type::struct_of("MapSet"),
        Type::struct_of("Range"),
    ] {
        match resolver.resolve(Protocol::Enumerable, &receiver) {
            Resolution::Impl(impl_mfa) => {
                assert!(
                    registry.contains(&impl_mfa),
                    "missing registry entry for {impl_mfa}"
                );
            }
            Resolution::Unknown => panic!("expected resolution for {receiver}"),
        }
    }
}

#[test]
fn test_unnarrowed_receiver_stays_unknown() {
    let resolver = ProtocolResolver::new();
    use limpid::types::TypeVar;
    assert_eq!(
        resolver.resolve(Protocol::Enumerable, &Type::Var(TypeVar::with_id(0))),
        Resolution::Unknown
    );
    assert_eq!(
        resolver.resolve(Protocol::Enumerable, &Type::Any),
        Resolution::Unknown
    );
}
