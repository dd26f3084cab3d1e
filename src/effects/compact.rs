//! Compact effects: the seven-valued summary emitted for callers.
//!
//! Internally the engine carries full rows; the compact form collapses a
//! row to its most severe category plus a deduplicated payload, and is what
//! registry entries and per-function summaries store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EffectLabel, EffectRow, ExceptionType, Mfa, SideKind};
use crate::types::VarSupply;

/// Severity lattice used to collapse rows and order summaries.
///
/// Fix-point termination rests on this order being total and finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// No observable behavior
    Pure,
    /// Effects depend entirely on function-typed parameters
    Lambda,
    /// May raise
    Exception,
    /// Reads ambient environment
    Dependent,
    /// Observable side effects
    Side,
    /// Native code
    Nif,
    /// Analysis lost track
    Unknown,
}

/// A compact effect category with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompactEffect {
    /// Pure computation
    Pure,
    /// Lambda-dependent: effects are whatever the argument functions do
    Lambda,
    /// May raise the listed exception types
    Exception(Vec<ExceptionType>),
    /// Reads the ambient environment through the listed operations
    Dependent(Vec<Mfa>),
    /// Performs the listed side-effecting operations
    Side(Vec<Mfa>),
    /// Calls into native code through the listed operations
    Nif(Vec<Mfa>),
    /// Statically unknowable
    Unknown,
}

impl CompactEffect {
    /// The severity of this category.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Pure => Severity::Pure,
            Self::Lambda => Severity::Lambda,
            Self::Exception(_) => Severity::Exception,
            Self::Dependent(_) => Severity::Dependent,
            Self::Side(_) => Severity::Side,
            Self::Nif(_) => Severity::Nif,
            Self::Unknown => Severity::Unknown,
        }
    }

    /// Combines two compact effects: the more severe category wins; equal
    /// categories union their payloads.
    pub fn combine(&self, other: &CompactEffect) -> CompactEffect {
        use std::cmp::Ordering;
        match self.severity().cmp(&other.severity()) {
            Ordering::Greater => self.clone(),
            Ordering::Less => other.clone(),
            Ordering::Equal => match (self, other) {
                (Self::Exception(a), Self::Exception(b)) => {
                    Self::Exception(merge_sorted(a, b))
                }
                (Self::Dependent(a), Self::Dependent(b)) => Self::Dependent(merge_sorted(a, b)),
                (Self::Side(a), Self::Side(b)) => Self::Side(merge_sorted(a, b)),
                (Self::Nif(a), Self::Nif(b)) => Self::Nif(merge_sorted(a, b)),
                _ => self.clone(),
            },
        }
    }

    /// Returns true for the pure category.
    pub fn is_pure(&self) -> bool {
        matches!(self, Self::Pure)
    }
}

fn merge_sorted<T: Clone + Ord>(a: &[T], b: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = a.to_vec();
    merged.extend(b.iter().cloned());
    merged.sort();
    merged.dedup();
    merged
}

/// Collapses a row into the single most severe compact category.
///
/// Payloads of the winning category are deduplicated and sorted. A row
/// holding only variables collapses to `lambda`.
pub fn to_compact(row: &EffectRow) -> CompactEffect {
    let (labels, vars) = row.parts();
    if labels.is_empty() {
        return if vars.is_empty() {
            CompactEffect::Pure
        } else {
            CompactEffect::Lambda
        };
    }

    let top = labels
        .iter()
        .map(label_severity)
        .max()
        .expect("non-empty labels");

    match top {
        Severity::Unknown => CompactEffect::Unknown,
        Severity::Nif => {
            let mut mfas: Vec<Mfa> = labels
                .iter()
                .filter_map(|l| match l {
                    EffectLabel::Nif(mfa) => Some(mfa.clone()),
                    _ => None,
                })
                .collect();
            mfas.sort();
            mfas.dedup();
            CompactEffect::Nif(mfas)
        }
        Severity::Side => {
            let mut mfas: Vec<Mfa> = labels
                .iter()
                .filter_map(|l| match l {
                    EffectLabel::Side { mfa, .. } => Some(mfa.clone()),
                    _ => None,
                })
                .collect();
            mfas.sort();
            mfas.dedup();
            CompactEffect::Side(mfas)
        }
        Severity::Dependent => {
            let mut mfas: Vec<Mfa> = labels
                .iter()
                .filter_map(|l| match l {
                    EffectLabel::Dependent(mfa) => Some(mfa.clone()),
                    _ => None,
                })
                .collect();
            mfas.sort();
            mfas.dedup();
            CompactEffect::Dependent(mfas)
        }
        Severity::Exception => {
            let mut types: Vec<ExceptionType> = labels
                .iter()
                .filter_map(|l| match l {
                    EffectLabel::Exception(exn) => Some(exn.clone()),
                    _ => None,
                })
                .collect();
            types.sort();
            types.dedup();
            CompactEffect::Exception(types)
        }
        Severity::Pure | Severity::Lambda => CompactEffect::Pure,
    }
}

/// Expands a compact effect back into a row.
///
/// The round trip preserves severity and payload sets. The `lambda`
/// category needs a fresh row variable, hence the supply.
pub fn from_compact(compact: &CompactEffect, supply: &mut VarSupply) -> EffectRow {
    match compact {
        CompactEffect::Pure => EffectRow::Empty,
        CompactEffect::Lambda => EffectRow::Var(supply.fresh_effect()),
        CompactEffect::Exception(types) => EffectRow::from_parts(
            types
                .iter()
                .map(|t| EffectLabel::Exception(t.clone()))
                .collect(),
            vec![],
        ),
        CompactEffect::Dependent(mfas) => EffectRow::from_parts(
            mfas.iter()
                .map(|mfa| EffectLabel::Dependent(mfa.clone()))
                .collect(),
            vec![],
        ),
        CompactEffect::Side(mfas) => EffectRow::from_parts(
            mfas.iter()
                .map(|mfa| EffectLabel::side(side_kind_for(mfa), mfa.clone()))
                .collect(),
            vec![],
        ),
        CompactEffect::Nif(mfas) => EffectRow::from_parts(
            mfas.iter()
                .map(|mfa| EffectLabel::Nif(mfa.clone()))
                .collect(),
            vec![],
        ),
        CompactEffect::Unknown => EffectRow::single(EffectLabel::Unknown),
    }
}

/// The severity a single label contributes to a row.
pub fn label_severity(label: &EffectLabel) -> Severity {
    match label {
        EffectLabel::Side { .. } => Severity::Side,
        EffectLabel::Dependent(_) => Severity::Dependent,
        EffectLabel::Exception(_) => Severity::Exception,
        EffectLabel::Nif(_) => Severity::Nif,
        EffectLabel::Unknown => Severity::Unknown,
    }
}

/// Guesses the side-effect flavor of an MFA from its module.
///
/// Only used when re-expanding compact payloads, where the original kind
/// is no longer recorded.
pub fn side_kind_for(mfa: &Mfa) -> SideKind {
    match mfa.module.as_str() {
        "IO" => SideKind::Io,
        "File" | "Path" => SideKind::Fs,
        "Process" | "Task" | "Agent" | "GenServer" => SideKind::Process,
        ":ets" | ":persistent_term" | "Application" => SideKind::State,
        _ => SideKind::Other,
    }
}

impl fmt::Display for CompactEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            write!(f, "]")
        }
        match self {
            Self::Pure => write!(f, "pure"),
            Self::Lambda => write!(f, "lambda"),
            Self::Exception(types) => {
                write!(f, "exception(")?;
                list(f, types)?;
                write!(f, ")")
            }
            Self::Dependent(mfas) => {
                write!(f, "dependent(")?;
                list(f, mfas)?;
                write!(f, ")")
            }
            Self::Side(mfas) => {
                write!(f, "side(")?;
                list(f, mfas)?;
                write!(f, ")")
            }
            Self::Nif(mfas) => {
                write!(f, "nif(")?;
                list(f, mfas)?;
                write!(f, ")")
            }
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EffectVar;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Pure < Severity::Lambda);
        assert!(Severity::Lambda < Severity::Exception);
        assert!(Severity::Exception < Severity::Dependent);
        assert!(Severity::Dependent < Severity::Side);
        assert!(Severity::Side < Severity::Nif);
        assert!(Severity::Nif < Severity::Unknown);
    }

    #[test]
    fn test_to_compact_picks_most_severe() {
        let row = EffectRow::from_parts(
            vec![
                EffectLabel::exception("ArgumentError"),
                EffectLabel::io(Mfa::new("IO", "puts", 1)),
            ],
            vec![],
        );
        let compact = to_compact(&row);
        assert_eq!(compact, CompactEffect::Side(vec![Mfa::new("IO", "puts", 1)]));
    }

    #[test]
    fn test_vars_only_row_is_lambda() {
        let row = EffectRow::from_parts(vec![], vec![EffectVar::with_id(3)]);
        assert_eq!(to_compact(&row), CompactEffect::Lambda);
    }

    #[test]
    fn test_round_trip_preserves_severity_and_payload() {
        let mut supply = VarSupply::new();
        let cases = vec![
            CompactEffect::Pure,
            CompactEffect::Lambda,
            CompactEffect::Side(vec![Mfa::new("File", "write", 3), Mfa::new("IO", "puts", 1)]),
            CompactEffect::Exception(vec![ExceptionType::named("KeyError")]),
            CompactEffect::Dependent(vec![Mfa::new("System", "get_env", 1)]),
            CompactEffect::Nif(vec![Mfa::new(":crypto", "hash", 2)]),
            CompactEffect::Unknown,
        ];
        for compact in cases {
            let row = from_compact(&compact, &mut supply);
            let back = to_compact(&row);
            assert_eq!(back.severity(), compact.severity());
            match (compact, back) {
                (CompactEffect::Side(a), CompactEffect::Side(b)) => {
                    let mut a = a;
                    a.sort();
                    assert_eq!(a, b);
                }
                (CompactEffect::Exception(a), CompactEffect::Exception(b)) => assert_eq!(a, b),
                _ => {}
            }
        }
    }

    #[test]
    fn test_combine_same_category_unions_payloads() {
        let a = CompactEffect::Side(vec![Mfa::new("IO", "puts", 1)]);
        let b = CompactEffect::Side(vec![Mfa::new("File", "write", 3)]);
        let combined = a.combine(&b);
        assert_eq!(
            combined,
            CompactEffect::Side(vec![Mfa::new("File", "write", 3), Mfa::new("IO", "puts", 1)])
        );
    }

    #[test]
    fn test_combine_severity_wins() {
        let side = CompactEffect::Side(vec![Mfa::new("IO", "puts", 1)]);
        assert_eq!(side.combine(&CompactEffect::Unknown), CompactEffect::Unknown);
        assert_eq!(CompactEffect::Pure.combine(&side), side);
    }
}
