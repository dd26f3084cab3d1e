//! Type-directed resolution of protocol dispatch sites.
//!
//! Polymorphic entry points (`Enum.map/2`, `Kernel.to_string/1`, ...) pick
//! a concrete implementation at runtime based on the receiver's type. When
//! the walker has narrowed that type, the resolver replicates the decision
//! statically and hands back the implementation MFA whose effect the
//! registry knows. Anything it cannot narrow becomes `unknown`.

use super::Mfa;
use crate::types::Type;

/// The protocols the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Enumeration (`Enum` entry points)
    Enumerable,
    /// Collection targets (`Enum.into/2` second argument)
    Collectable,
    /// String conversion (`Kernel.to_string/1`)
    StringChars,
    /// Inspection (`Kernel.inspect/1,2`)
    Inspect,
}

impl Protocol {
    /// Protocol module prefix of implementation MFAs.
    pub fn module_prefix(&self) -> &'static str {
        match self {
            Self::Enumerable => "Enumerable",
            Self::Collectable => "Collectable",
            Self::StringChars => "String.Chars",
            Self::Inspect => "Inspect",
        }
    }

    /// The protocol function and arity an implementation must provide.
    pub fn canonical_function(&self) -> (&'static str, u8) {
        match self {
            Self::Enumerable => ("reduce", 3),
            Self::Collectable => ("into", 1),
            Self::StringChars => ("to_string", 1),
            Self::Inspect => ("inspect", 2),
        }
    }
}

/// Result of a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The concrete implementation was found
    Impl(Mfa),
    /// The receiver type could not be narrowed
    Unknown,
}

/// The protocol dispatch resolver.
///
/// Purely static: decisions rest on narrowed types alone, never on
/// runtime observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolResolver;

impl ProtocolResolver {
    /// Creates a resolver.
    pub fn new() -> Self {
        Self
    }

    /// Recognizes a dispatch site.
    ///
    /// Returns the protocol and the index of the argument whose type
    /// selects the implementation.
    pub fn dispatch_site(&self, module: &str, function: &str, arity: u8) -> Option<(Protocol, usize)> {
        match (module, function, arity) {
            ("Enum", "into", 2) => Some((Protocol::Collectable, 1)),
            ("Enum", "into", 3) => Some((Protocol::Collectable, 1)),
            ("Enum", _, _) | ("Stream", _, _) => Some((Protocol::Enumerable, 0)),
            ("Kernel", "to_string", 1) => Some((Protocol::StringChars, 0)),
            ("Kernel", "inspect", 1 | 2) => Some((Protocol::Inspect, 0)),
            _ => None,
        }
    }

    /// Resolves a protocol against a receiver type.
    pub fn resolve(&self, protocol: Protocol, receiver: &Type) -> Resolution {
        match self.impl_module(receiver) {
            Some(impl_name) => {
                let (function, arity) = protocol.canonical_function();
                Resolution::Impl(Mfa::new(
                    format!("{}.{}", protocol.module_prefix(), impl_name),
                    function,
                    arity,
                ))
            }
            None => Resolution::Unknown,
        }
    }

    /// Maps a narrowed receiver type to an implementation module name.
    fn impl_module(&self, receiver: &Type) -> Option<String> {
        match receiver {
            Type::List(_) => Some("List".to_string()),
            Type::Map(_, _) => Some("Map".to_string()),
            Type::Binary => Some("BitString".to_string()),
            Type::Integer => Some("Integer".to_string()),
            Type::Float => Some("Float".to_string()),
            Type::Atom => Some("Atom".to_string()),
            Type::Struct { module, .. } => Some(module.clone()),
            _ => None,
        }
    }

    /// Narrows the result type of a known constructor call.
    ///
    /// Struct-returning constructors give dispatch sites downstream a
    /// concrete receiver.
    pub fn known_constructor(&self, module: &str, function: &str) -> Option<Type> {
        match (module, function) {
            ("MapSet", "new") => Some(Type::struct_of("MapSet")),
            ("Range", "new") => Some(Type::struct_of("Range")),
            ("Stream", "iterate" | "cycle" | "repeatedly" | "unfold" | "interval") => {
                Some(Type::struct_of("Stream"))
            }
            ("Map", "new") => Some(Type::map_of(Type::Any, Type::Any)),
            ("Keyword", "new") => Some(Type::list(Type::tuple(vec![Type::Atom, Type::Any]))),
            ("Date", "new") | ("Date", "utc_today") => Some(Type::struct_of("Date")),
            ("DateTime", "utc_now") => Some(Type::struct_of("DateTime")),
            ("URI", "parse") => Some(Type::struct_of("URI")),
            _ => None,
        }
    }

    /// Result type of an `Enum`-family call, preserving pipeline types.
    ///
    /// Operations whose protocol return matches the source keep the
    /// struct type flowing (`MapSet.filter` stays a `MapSet`); flattening
    /// operations narrow to `list<_>`.
    pub fn enum_result_type(&self, module: &str, function: &str, receiver: &Type) -> Type {
        if module == "MapSet" {
            return match function {
                "filter" | "reject" | "put" | "delete" | "new" | "union" | "difference"
                | "intersection" => Type::struct_of("MapSet"),
                "to_list" => Type::list(Type::Any),
                "member?" | "subset?" | "disjoint?" | "equal?" => Type::Boolean,
                "size" => Type::Integer,
                _ => Type::Any,
            };
        }
        if module == "Stream" {
            return Type::struct_of("Stream");
        }
        match function {
            "map" | "filter" | "reject" | "flat_map" | "sort" | "sort_by" | "reverse"
            | "uniq" | "uniq_by" | "take" | "drop" | "take_while" | "drop_while" | "to_list"
            | "with_index" | "zip" | "concat" | "shuffle" | "dedup" | "chunk_every" => {
                Type::list(Type::Any)
            }
            "count" | "sum" | "product" => Type::Integer,
            "member?" | "all?" | "any?" | "empty?" => Type::Boolean,
            "join" | "map_join" => Type::Binary,
            "each" => Type::Atom,
            "into" => receiver.clone(),
            _ => Type::Any,
        }
    }
}
