//! Error handling and diagnostics for the effect-inference engine.
//!
//! Errors carry a structured kind plus the source span of the offending
//! syntax node. Unification failures are local: the walker records them and
//! keeps analyzing, so a single bad expression never aborts a whole module.

pub mod span;

pub use span::{Span, Spanned, spanned};

use std::fmt;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Error kinds produced by unification, lookup, and registry loading.
///
/// Term payloads are stored pre-rendered so the diagnostics layer stays at
/// the bottom of the module graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Structural type mismatch
    CannotUnify {
        expected: String,
        actual: String,
        span: Option<Span>,
    },

    /// Union types with different shapes
    CannotUnifyUnions {
        left: String,
        right: String,
        span: Option<Span>,
    },

    /// Infinite type averted: the variable occurs in its own binding
    OccursCheckFailed {
        var: String,
        term: String,
        span: Option<Span>,
    },

    /// A closed empty row met a row that still carries labels
    CannotUnifyNonEmptyWithEmpty {
        row: String,
        span: Option<Span>,
    },

    /// Two effect rows with no label bridge between them
    IncompatibleEffectRows {
        left: String,
        right: String,
        span: Option<Span>,
    },

    /// Lookup miss in the typing environment (recovered locally)
    UnknownIdentifier {
        name: String,
        span: Option<Span>,
    },

    /// The registry has no entry for a called MFA
    RegistryMiss {
        mfa: String,
    },

    /// The user override document could not be parsed
    RegistryDocument {
        message: String,
    },

    /// Internal engine errors (bugs)
    InternalError {
        message: String,
    },
}

impl Error {
    /// Creates a structural mismatch error.
    pub fn cannot_unify(
        expected: impl fmt::Display,
        actual: impl fmt::Display,
        span: Option<Span>,
    ) -> Self {
        Self::CannotUnify {
            expected: expected.to_string(),
            actual: actual.to_string(),
            span,
        }
    }

    /// Creates a union shape mismatch error.
    pub fn cannot_unify_unions(
        left: impl fmt::Display,
        right: impl fmt::Display,
        span: Option<Span>,
    ) -> Self {
        Self::CannotUnifyUnions {
            left: left.to_string(),
            right: right.to_string(),
            span,
        }
    }

    /// Creates an occurs-check failure.
    pub fn occurs_check_failed(
        var: impl fmt::Display,
        term: impl fmt::Display,
        span: Option<Span>,
    ) -> Self {
        Self::OccursCheckFailed {
            var: var.to_string(),
            term: term.to_string(),
            span,
        }
    }

    /// Creates a row closure conflict error.
    pub fn non_empty_with_empty(row: impl fmt::Display, span: Option<Span>) -> Self {
        Self::CannotUnifyNonEmptyWithEmpty {
            row: row.to_string(),
            span,
        }
    }

    /// Creates an effect row mismatch error.
    pub fn incompatible_effect_rows(
        left: impl fmt::Display,
        right: impl fmt::Display,
        span: Option<Span>,
    ) -> Self {
        Self::IncompatibleEffectRows {
            left: left.to_string(),
            right: right.to_string(),
            span,
        }
    }

    /// Creates an unknown identifier error.
    pub fn unknown_identifier(name: impl Into<String>, span: Option<Span>) -> Self {
        Self::UnknownIdentifier {
            name: name.into(),
            span,
        }
    }

    /// Creates a registry miss error.
    pub fn registry_miss(mfa: impl fmt::Display) -> Self {
        Self::RegistryMiss {
            mfa: mfa.to_string(),
        }
    }

    /// Creates a registry document error.
    pub fn registry_document(message: impl Into<String>) -> Self {
        Self::RegistryDocument {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Returns the span attached to this error, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::CannotUnify { span, .. }
            | Self::CannotUnifyUnions { span, .. }
            | Self::OccursCheckFailed { span, .. }
            | Self::CannotUnifyNonEmptyWithEmpty { span, .. }
            | Self::IncompatibleEffectRows { span, .. }
            | Self::UnknownIdentifier { span, .. } => *span,
            Self::RegistryMiss { .. }
            | Self::RegistryDocument { .. }
            | Self::InternalError { .. } => None,
        }
    }

    /// Returns true for failures the walker recovers from locally.
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            Self::RegistryDocument { .. } | Self::InternalError { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CannotUnify {
                expected, actual, ..
            } => {
                write!(f, "cannot unify: expected {expected}, got {actual}")
            }
            Self::CannotUnifyUnions { left, right, .. } => {
                write!(f, "cannot unify unions {left} and {right}")
            }
            Self::OccursCheckFailed { var, term, .. } => {
                write!(f, "occurs check failed: {var} occurs in {term}")
            }
            Self::CannotUnifyNonEmptyWithEmpty { row, .. } => {
                write!(f, "cannot unify non-empty row {row} with the empty row")
            }
            Self::IncompatibleEffectRows { left, right, .. } => {
                write!(f, "incompatible effect rows: {left} vs {right}")
            }
            Self::UnknownIdentifier { name, .. } => {
                write!(f, "unknown identifier `{name}`")
            }
            Self::RegistryMiss { mfa } => {
                write!(f, "no registry entry for {mfa}")
            }
            Self::RegistryDocument { message } => {
                write!(f, "registry document error: {message}")
            }
            Self::InternalError { message } => {
                write!(f, "internal error: {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
