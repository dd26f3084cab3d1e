//! Effect labels: the atoms an effect row is built from.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Mfa;

/// The flavor of a side-effecting operation.
///
/// Kinds are carried for reporting; the classifier collapses all of them
/// into the `side` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideKind {
    /// Console and device I/O
    Io,
    /// Filesystem reads and writes
    Fs,
    /// Process operations (spawn, send, exit signals)
    Process,
    /// Mutable shared state (ets tables, application env writes)
    State,
    /// Anything else observable
    Other,
}

/// The type of a raised exception.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExceptionType {
    /// A named exception module, resolved at analysis time
    Named(String),
    /// Raised from a runtime value; the concrete type is unknowable
    Dynamic,
    /// `throw` / `exit`, which carry no exception type
    Generic,
}

impl ExceptionType {
    /// Creates a named exception type.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns true if the clause name catches this exception.
    ///
    /// A dynamic exception matches any named handler; the handler may or
    /// may not catch it at runtime, and keeping the label would
    /// over-report, so removal is allowed.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Named(own) => own == name,
            Self::Dynamic => true,
            Self::Generic => false,
        }
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Dynamic => write!(f, ":dynamic"),
            Self::Generic => write!(f, ":generic"),
        }
    }
}

/// A single labeled effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectLabel {
    /// An observable side-effecting call
    Side {
        /// Flavor of the effect
        kind: SideKind,
        /// The bottommost operation responsible
        mfa: Mfa,
    },
    /// A read of the ambient environment (time, env vars, process dict)
    Dependent(Mfa),
    /// A raised exception
    Exception(ExceptionType),
    /// A native-implemented operation
    Nif(Mfa),
    /// Effect information was lost
    Unknown,
}

impl EffectLabel {
    /// Creates a side label of the given kind.
    pub fn side(kind: SideKind, mfa: Mfa) -> Self {
        Self::Side { kind, mfa }
    }

    /// Creates an io-flavored side label.
    pub fn io(mfa: Mfa) -> Self {
        Self::Side {
            kind: SideKind::Io,
            mfa,
        }
    }

    /// Creates an fs-flavored side label.
    pub fn fs(mfa: Mfa) -> Self {
        Self::Side {
            kind: SideKind::Fs,
            mfa,
        }
    }

    /// Creates an exception label for a named module.
    pub fn exception(name: impl Into<String>) -> Self {
        Self::Exception(ExceptionType::Named(name.into()))
    }

    /// Returns true for exception labels.
    ///
    /// Exception labels are the one kind whose duplicates are
    /// significant: nested handlers remove one occurrence at a time.
    pub fn is_exception(&self) -> bool {
        matches!(self, Self::Exception(_))
    }

    /// Returns the MFA payload of this label, if it carries one.
    pub fn mfa(&self) -> Option<&Mfa> {
        match self {
            Self::Side { mfa, .. } | Self::Dependent(mfa) | Self::Nif(mfa) => Some(mfa),
            Self::Exception(_) | Self::Unknown => None,
        }
    }
}

impl fmt::Display for EffectLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Side { kind, mfa } => {
                let tag = match kind {
                    SideKind::Io => "io",
                    SideKind::Fs => "fs",
                    SideKind::Process => "proc",
                    SideKind::State => "state",
                    SideKind::Other => "side",
                };
                write!(f, "{tag}:{mfa}")
            }
            Self::Dependent(mfa) => write!(f, "dep:{mfa}"),
            Self::Exception(exn) => write!(f, "exn:{exn}"),
            Self::Nif(mfa) => write!(f, "nif:{mfa}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_matching() {
        let named = ExceptionType::named("ArgumentError");
        assert!(named.matches("ArgumentError"));
        assert!(!named.matches("KeyError"));
        assert!(ExceptionType::Dynamic.matches("ArgumentError"));
        assert!(!ExceptionType::Generic.matches("ArgumentError"));
    }

    #[test]
    fn test_label_display() {
        let label = EffectLabel::io(Mfa::new("IO", "puts", 1));
        assert_eq!(label.to_string(), "io:IO.puts/1");
        assert_eq!(EffectLabel::exception("KeyError").to_string(), "exn:KeyError");
    }
}
