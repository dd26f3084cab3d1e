//! Effect rows: ordered, possibly variable-tailed sequences of labels.
//!
//! A row is a cons spine of labeled effects over a tail that is either the
//! empty row or a row variable. Label order is semantically irrelevant but
//! preserved for deterministic output. Duplicate exception labels are
//! significant: each enclosing handler removes exactly one occurrence.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{EffectLabel, ExceptionType};
use crate::types::EffectVar;

/// An effect row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectRow {
    /// The pure row
    Empty,
    /// A single labeled effect
    Label(EffectLabel),
    /// A labeled effect (or, transiently, a variable) consed onto a row
    Extend {
        /// First element of the spine
        head: Box<EffectRow>,
        /// Remainder of the spine
        tail: Box<EffectRow>,
    },
    /// A row variable, instantiable to any row including the empty one
    Var(EffectVar),
}

impl EffectRow {
    /// The empty (pure) row.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// A row holding a single label.
    pub fn single(label: EffectLabel) -> Self {
        Self::Label(label)
    }

    /// A row holding a single variable.
    pub fn var(var: EffectVar) -> Self {
        Self::Var(var)
    }

    /// Conses a label onto a row.
    pub fn extend(label: EffectLabel, tail: EffectRow) -> Self {
        match tail {
            Self::Empty => Self::Label(label),
            tail => Self::Extend {
                head: Box::new(Self::Label(label)),
                tail: Box::new(tail),
            },
        }
    }

    /// Builds a normal row: all labels first, variables chained at the
    /// tail.
    pub fn from_parts(labels: Vec<EffectLabel>, vars: Vec<EffectVar>) -> Self {
        let mut row = match vars.len() {
            0 => Self::Empty,
            _ => {
                let mut iter = vars.into_iter().rev();
                let mut tail = Self::Var(iter.next().expect("non-empty"));
                for var in iter {
                    tail = Self::Extend {
                        head: Box::new(Self::Var(var)),
                        tail: Box::new(tail),
                    };
                }
                tail
            }
        };
        for label in labels.into_iter().rev() {
            row = Self::extend(label, row);
        }
        row
    }

    /// Flattens the spine into its labels and variables, in order.
    pub fn parts(&self) -> (Vec<EffectLabel>, Vec<EffectVar>) {
        let mut labels = Vec::new();
        let mut vars = Vec::new();
        self.collect_parts(&mut labels, &mut vars);
        (labels, vars)
    }

    fn collect_parts(&self, labels: &mut Vec<EffectLabel>, vars: &mut Vec<EffectVar>) {
        match self {
            Self::Empty => {}
            Self::Label(label) => labels.push(label.clone()),
            Self::Var(var) => {
                if !vars.contains(var) {
                    vars.push(*var);
                }
            }
            Self::Extend { head, tail } => {
                head.collect_parts(labels, vars);
                tail.collect_parts(labels, vars);
            }
        }
    }

    /// Rebuilds the row in normal form.
    pub fn normalize(&self) -> Self {
        let (labels, vars) = self.parts();
        Self::from_parts(labels, vars)
    }

    /// Returns true if the row is pure: no labels and no variables.
    pub fn is_pure(&self) -> bool {
        let (labels, vars) = self.parts();
        labels.is_empty() && vars.is_empty()
    }

    /// Returns true if the row holds at least one variable and nothing
    /// else.
    pub fn is_vars_only(&self) -> bool {
        let (labels, vars) = self.parts();
        labels.is_empty() && !vars.is_empty()
    }

    /// Returns true if the row contains the given label.
    pub fn has_label(&self, label: &EffectLabel) -> bool {
        self.parts().0.iter().any(|l| l == label)
    }

    /// Returns true if the row contains an `unknown` label.
    pub fn has_unknown(&self) -> bool {
        self.parts().0.iter().any(|l| *l == EffectLabel::Unknown)
    }

    /// Returns true if the row mentions the given variable.
    pub fn contains_var(&self, var: EffectVar) -> bool {
        self.parts().1.contains(&var)
    }

    /// Splits off the first label of the spine, if any.
    pub fn split_first_label(&self) -> Option<(EffectLabel, EffectRow)> {
        let (labels, vars) = self.parts();
        let mut iter = labels.into_iter();
        let first = iter.next()?;
        Some((first, Self::from_parts(iter.collect(), vars)))
    }

    /// Combines two rows into one.
    ///
    /// Non-exception labels are unioned by equality; exception labels keep
    /// their duplicates so nested handlers can strip them one at a time.
    /// Variables are unioned.
    pub fn combine(&self, other: &EffectRow) -> EffectRow {
        let (mut labels, mut vars) = self.parts();
        let (other_labels, other_vars) = other.parts();
        for label in other_labels {
            if label.is_exception() || !labels.contains(&label) {
                labels.push(label);
            }
        }
        for var in other_vars {
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        Self::from_parts(labels, vars)
    }

    /// Removes exactly one occurrence of the given label.
    ///
    /// Returns `None` if the row does not contain it.
    pub fn remove_one(&self, label: &EffectLabel) -> Option<EffectRow> {
        let (labels, vars) = self.parts();
        let index = labels.iter().position(|l| l == label)?;
        let mut labels = labels;
        labels.remove(index);
        Some(Self::from_parts(labels, vars))
    }

    /// Removes one exception label matched by a rescue clause.
    ///
    /// `name` is the caught exception module; `None` catches any raised
    /// exception. Generic labels from `throw`/`exit` are not caught by
    /// rescue clauses. Returns the residual row and whether a label was
    /// removed.
    pub fn remove_one_exception(&self, name: Option<&str>) -> (EffectRow, bool) {
        let (labels, vars) = self.parts();
        let index = labels.iter().position(|l| match l {
            EffectLabel::Exception(exn) => match name {
                Some(name) => exn.matches(name),
                None => !matches!(exn, ExceptionType::Generic),
            },
            _ => false,
        });
        match index {
            Some(index) => {
                let mut labels = labels;
                labels.remove(index);
                (Self::from_parts(labels, vars), true)
            }
            None => (self.clone(), false),
        }
    }

    /// Number of exception labels in the row.
    pub fn exception_count(&self) -> usize {
        self.parts().0.iter().filter(|l| l.is_exception()).count()
    }
}

impl Default for EffectRow {
    fn default() -> Self {
        Self::Empty
    }
}

impl fmt::Display for EffectRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (labels, vars) = self.parts();
        if labels.is_empty() && vars.is_empty() {
            return write!(f, "∅");
        }
        write!(f, "⟨")?;
        let mut first = true;
        for label in &labels {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
            first = false;
        }
        if !vars.is_empty() {
            if !labels.is_empty() {
                write!(f, " | ")?;
            }
            for (i, var) in vars.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{var}")?;
            }
        }
        write!(f, "⟩")
    }
}
