//! The effect registry: canonical effects for every known callable.
//!
//! Seeded at startup from the built-in table and optional user override
//! documents, then extended at analysis time with summaries of just-typed
//! functions. Reads take a short-lived shared lock and copy small values
//! out; writes are serialized through the single writer side, so every
//! lookup sees a consistent snapshot.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::RwLock;

use super::{CompactEffect, ExceptionType, Mfa};
use crate::diagnostics::{Error, Result};

/// A registry entry: the canonical effect plus an optional resolution
/// chain naming the operations a convenience wrapper delegates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Canonical compact effect
    pub effect: CompactEffect,
    /// Declared children of this entry, used to walk to leaf operations
    pub resolve: Vec<Mfa>,
}

impl RegistryEntry {
    /// Creates an entry without a resolution chain.
    pub fn new(effect: CompactEffect) -> Self {
        Self {
            effect,
            resolve: Vec::new(),
        }
    }

    /// Creates an entry with a resolution chain.
    pub fn with_resolve(effect: CompactEffect, resolve: Vec<Mfa>) -> Self {
        Self { effect, resolve }
    }
}

/// The effect registry.
///
/// Effects stored here are always closed terms; free variables never
/// reach the registry.
#[derive(Debug, Default)]
pub struct EffectRegistry {
    entries: RwLock<IndexMap<Mfa, RegistryEntry>>,
}

impl EffectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the built-in table.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        {
            let mut entries = registry.entries.write().expect("registry lock poisoned");
            for (mfa, entry) in super::builtins::builtin_entries() {
                entries.insert(mfa, entry);
            }
        }
        registry
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("registry lock poisoned").len()
    }

    /// Returns true if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the compact effect of an MFA.
    pub fn effect_of(&self, mfa: &Mfa) -> Option<CompactEffect> {
        self.entries
            .read()
            .expect("registry lock poisoned")
            .get(mfa)
            .map(|entry| entry.effect.clone())
    }

    /// Looks up the full entry of an MFA.
    pub fn entry(&self, mfa: &Mfa) -> Option<RegistryEntry> {
        self.entries
            .read()
            .expect("registry lock poisoned")
            .get(mfa)
            .cloned()
    }

    /// Returns true if the MFA is known.
    pub fn contains(&self, mfa: &Mfa) -> bool {
        self.entries
            .read()
            .expect("registry lock poisoned")
            .contains_key(mfa)
    }

    /// Commits a freshly inferred summary, replacing any previous value.
    pub fn commit(&self, mfa: Mfa, effect: CompactEffect) {
        debug!("registry commit {mfa} = {effect}");
        self.entries
            .write()
            .expect("registry lock poisoned")
            .insert(mfa, RegistryEntry::new(effect));
    }

    /// Merges an entry with whatever is already present.
    ///
    /// Categories combine by the severity rule; same-category payloads are
    /// unioned. Resolution chains are concatenated and deduplicated.
    pub fn merge(&self, mfa: Mfa, entry: RegistryEntry) {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        match entries.get_mut(&mfa) {
            Some(existing) => {
                existing.effect = existing.effect.combine(&entry.effect);
                for child in entry.resolve {
                    if !existing.resolve.contains(&child) {
                        existing.resolve.push(child);
                    }
                }
            }
            None => {
                entries.insert(mfa, entry);
            }
        }
    }

    /// Applies a user override entry.
    ///
    /// The override always wins the category; when both sides agree on the
    /// category their payloads are unioned.
    pub fn apply_override(&self, mfa: Mfa, entry: RegistryEntry) {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        match entries.get_mut(&mfa) {
            Some(existing) => {
                if existing.effect.severity() != entry.effect.severity() {
                    warn!(
                        "override changes {mfa} from {} to {}",
                        existing.effect, entry.effect
                    );
                    existing.effect = entry.effect;
                } else {
                    existing.effect = existing.effect.combine(&entry.effect);
                }
                for child in entry.resolve {
                    if !existing.resolve.contains(&child) {
                        existing.resolve.push(child);
                    }
                }
            }
            None => {
                entries.insert(mfa, entry);
            }
        }
    }

    /// Walks the declared resolution chains from an MFA to their leaves.
    ///
    /// An entry without a chain is its own leaf. Chains are walked with a
    /// visited set so a malformed cyclic document terminates.
    pub fn resolve_to_leaves(&self, mfa: &Mfa) -> Vec<Mfa> {
        let entries = self.entries.read().expect("registry lock poisoned");
        let mut leaves = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![mfa.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            match entries.get(&current) {
                Some(entry) if !entry.resolve.is_empty() => {
                    for child in entry.resolve.iter().rev() {
                        stack.push(child.clone());
                    }
                }
                _ => {
                    if !leaves.contains(&current) {
                        leaves.push(current);
                    }
                }
            }
        }
        leaves
    }

    /// Loads a user override document in the tabular key/value format.
    ///
    /// Returns the number of entries applied.
    pub fn load_overrides(&self, document: &str) -> Result<usize> {
        let raw: IndexMap<String, RawDescriptor> = serde_json::from_str(document)
            .map_err(|e| Box::new(Error::registry_document(e.to_string())))?;
        let mut applied = 0;
        for (key, descriptor) in raw {
            let mfa: Mfa = key
                .parse()
                .map_err(|e: String| Box::new(Error::registry_document(e)))?;
            let entry = descriptor.into_entry()?;
            self.apply_override(mfa, entry);
            applied += 1;
        }
        debug!("loaded {applied} registry overrides");
        Ok(applied)
    }

    /// Serializes the registry back into the tabular document format.
    pub fn to_document(&self) -> String {
        let entries = self.entries.read().expect("registry lock poisoned");
        let raw: IndexMap<String, RawDescriptor> = entries
            .iter()
            .map(|(mfa, entry)| (mfa.to_string(), RawDescriptor::from_entry(entry)))
            .collect();
        serde_json::to_string_pretty(&raw).expect("registry serialization cannot fail")
    }

    /// A consistent snapshot of all entries, in insertion order.
    pub fn snapshot(&self) -> IndexMap<Mfa, RegistryEntry> {
        self.entries.read().expect("registry lock poisoned").clone()
    }
}

/// Wire form of one registry entry.
///
/// Either a short category literal (`"p" | "l" | "d" | "u" | "n"`) or an
/// object carrying a payload (`{"s": [...]}` etc.) plus an optional
/// `"resolve"` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDescriptor {
    /// Category literal without payload
    Short(String),
    /// Object form with payloads
    Object(RawObject),
}

/// Object form of a registry descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawObject {
    /// Side-effect payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<Vec<String>>,
    /// Dependent payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Vec<String>>,
    /// Exception type payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<Vec<String>>,
    /// Nif payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<Vec<String>>,
    /// Declared resolution chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<Vec<String>>,
}

fn parse_mfas(strings: &[String]) -> Result<Vec<Mfa>> {
    strings
        .iter()
        .map(|s| {
            s.parse()
                .map_err(|e: String| Box::new(Error::registry_document(e)))
        })
        .collect()
}

fn parse_exception(name: &str) -> ExceptionType {
    match name {
        ":dynamic" => ExceptionType::Dynamic,
        ":generic" => ExceptionType::Generic,
        other => ExceptionType::named(other),
    }
}

impl RawDescriptor {
    /// Converts the wire form into a registry entry.
    pub fn into_entry(self) -> Result<RegistryEntry> {
        match self {
            Self::Short(code) => {
                let effect = match code.as_str() {
                    "p" => CompactEffect::Pure,
                    "l" => CompactEffect::Lambda,
                    "d" => CompactEffect::Dependent(vec![]),
                    "u" => CompactEffect::Unknown,
                    "n" => CompactEffect::Nif(vec![]),
                    other => {
                        return Err(Box::new(Error::registry_document(format!(
                            "unknown effect code `{other}`"
                        ))));
                    }
                };
                Ok(RegistryEntry::new(effect))
            }
            Self::Object(object) => {
                let resolve = match &object.resolve {
                    Some(children) => parse_mfas(children)?,
                    None => Vec::new(),
                };
                let effect = if let Some(mfas) = &object.s {
                    CompactEffect::Side(parse_mfas(mfas)?)
                } else if let Some(mfas) = &object.d {
                    CompactEffect::Dependent(parse_mfas(mfas)?)
                } else if let Some(types) = &object.e {
                    CompactEffect::Exception(
                        types.iter().map(|t| parse_exception(t)).collect(),
                    )
                } else if let Some(mfas) = &object.n {
                    CompactEffect::Nif(parse_mfas(mfas)?)
                } else {
                    return Err(Box::new(Error::registry_document(
                        "object descriptor carries no effect key",
                    )));
                };
                Ok(RegistryEntry::with_resolve(effect, resolve))
            }
        }
    }

    /// Converts a registry entry into the wire form.
    pub fn from_entry(entry: &RegistryEntry) -> Self {
        let resolve = if entry.resolve.is_empty() {
            None
        } else {
            Some(entry.resolve.iter().map(Mfa::to_string).collect())
        };
        let object = |o: RawObject| Self::Object(o);
        match (&entry.effect, resolve) {
            (CompactEffect::Pure, _) => Self::Short("p".to_string()),
            (CompactEffect::Lambda, _) => Self::Short("l".to_string()),
            (CompactEffect::Unknown, _) => Self::Short("u".to_string()),
            (CompactEffect::Dependent(mfas), resolve) if mfas.is_empty() && resolve.is_none() => {
                Self::Short("d".to_string())
            }
            (CompactEffect::Nif(mfas), resolve) if mfas.is_empty() && resolve.is_none() => {
                Self::Short("n".to_string())
            }
            (CompactEffect::Side(mfas), resolve) => object(RawObject {
                s: Some(mfas.iter().map(Mfa::to_string).collect()),
                resolve,
                ..Default::default()
            }),
            (CompactEffect::Dependent(mfas), resolve) => object(RawObject {
                d: Some(mfas.iter().map(Mfa::to_string).collect()),
                resolve,
                ..Default::default()
            }),
            (CompactEffect::Exception(types), resolve) => object(RawObject {
                e: Some(types.iter().map(|t| t.to_string()).collect()),
                resolve,
                ..Default::default()
            }),
            (CompactEffect::Nif(mfas), resolve) => object(RawObject {
                n: Some(mfas.iter().map(Mfa::to_string).collect()),
                resolve,
                ..Default::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mfa(s: &str) -> Mfa {
        s.parse().unwrap()
    }

    #[test]
    fn test_commit_and_lookup() {
        let registry = EffectRegistry::new();
        registry.commit(mfa("Sample.run/0"), CompactEffect::Pure);
        assert_eq!(
            registry.effect_of(&mfa("Sample.run/0")),
            Some(CompactEffect::Pure)
        );
        assert!(registry.effect_of(&mfa("Sample.missing/0")).is_none());
    }

    #[test]
    fn test_merge_unions_same_category() {
        let registry = EffectRegistry::new();
        registry.merge(
            mfa("Sample.log/1"),
            RegistryEntry::new(CompactEffect::Side(vec![mfa("IO.puts/1")])),
        );
        registry.merge(
            mfa("Sample.log/1"),
            RegistryEntry::new(CompactEffect::Side(vec![mfa("File.write/3")])),
        );
        assert_eq!(
            registry.effect_of(&mfa("Sample.log/1")),
            Some(CompactEffect::Side(vec![
                mfa("File.write/3"),
                mfa("IO.puts/1")
            ]))
        );
    }

    #[test]
    fn test_override_wins_category() {
        let registry = EffectRegistry::new();
        registry.merge(
            mfa("Sample.f/0"),
            RegistryEntry::new(CompactEffect::Side(vec![mfa("IO.puts/1")])),
        );
        registry.apply_override(mfa("Sample.f/0"), RegistryEntry::new(CompactEffect::Pure));
        assert_eq!(
            registry.effect_of(&mfa("Sample.f/0")),
            Some(CompactEffect::Pure)
        );
    }

    #[test]
    fn test_load_overrides_document() {
        let registry = EffectRegistry::new();
        let document = r#"{
            "Sample.pure/0": "p",
            "Sample.hof/1": "l",
            "Sample.clock/0": "d",
            "Sample.write/1": {"s": ["File.write/3"], "resolve": ["Sample.do_write/1"]},
            "Sample.fetch/1": {"e": ["KeyError", ":dynamic"]}
        }"#;
        assert_eq!(registry.load_overrides(document).unwrap(), 5);
        assert_eq!(
            registry.effect_of(&mfa("Sample.hof/1")),
            Some(CompactEffect::Lambda)
        );
        assert_eq!(
            registry.effect_of(&mfa("Sample.fetch/1")),
            Some(CompactEffect::Exception(vec![
                ExceptionType::named("KeyError"),
                ExceptionType::Dynamic
            ]))
        );
        let entry = registry.entry(&mfa("Sample.write/1")).unwrap();
        assert_eq!(entry.resolve, vec![mfa("Sample.do_write/1")]);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let registry = EffectRegistry::new();
        assert!(registry.load_overrides("{").is_err());
        assert!(registry.load_overrides(r#"{"NotAnMfa": "p"}"#).is_err());
        assert!(registry.load_overrides(r#"{"A.f/1": "x"}"#).is_err());
    }

    #[test]
    fn test_document_round_trip() {
        let registry = EffectRegistry::new();
        registry.merge(
            mfa("Sample.write/1"),
            RegistryEntry::with_resolve(
                CompactEffect::Side(vec![mfa("File.write/3")]),
                vec![mfa("Sample.do_write/1")],
            ),
        );
        registry.merge(mfa("Sample.pure/0"), RegistryEntry::new(CompactEffect::Pure));
        let document = registry.to_document();

        let reloaded = EffectRegistry::new();
        reloaded.load_overrides(&document).unwrap();
        assert_eq!(
            reloaded.snapshot().get(&mfa("Sample.write/1")),
            registry.snapshot().get(&mfa("Sample.write/1"))
        );
    }

    #[test]
    fn test_resolve_to_leaves_follows_chains() {
        let registry = EffectRegistry::new();
        registry.merge(
            mfa("Wrapper.save!/1"),
            RegistryEntry::with_resolve(
                CompactEffect::Side(vec![mfa("File.write/3")]),
                vec![mfa("Wrapper.save/1")],
            ),
        );
        registry.merge(
            mfa("Wrapper.save/1"),
            RegistryEntry::with_resolve(
                CompactEffect::Side(vec![mfa("File.write/3")]),
                vec![mfa("File.write/3")],
            ),
        );
        registry.merge(
            mfa("File.write/3"),
            RegistryEntry::new(CompactEffect::Side(vec![mfa("File.write/3")])),
        );
        assert_eq!(
            registry.resolve_to_leaves(&mfa("Wrapper.save!/1")),
            vec![mfa("File.write/3")]
        );
    }

    #[test]
    fn test_resolve_to_leaves_survives_cycles() {
        let registry = EffectRegistry::new();
        registry.merge(
            mfa("A.f/0"),
            RegistryEntry::with_resolve(CompactEffect::Unknown, vec![mfa("B.g/0")]),
        );
        registry.merge(
            mfa("B.g/0"),
            RegistryEntry::with_resolve(CompactEffect::Unknown, vec![mfa("A.f/0")]),
        );
        let leaves = registry.resolve_to_leaves(&mfa("A.f/0"));
        assert!(leaves.is_empty());
    }
}
