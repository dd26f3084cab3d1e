//! Syntax tree consumed by the effect-inference engine.
//!
//! The engine does not parse source; a parser hands it this tree. Every
//! node carries a span that is opaque to the analysis and only forwarded
//! into errors and summaries.

pub use crate::diagnostics::Spanned;
use serde::{Deserialize, Serialize};

pub mod case_clause;
pub mod lambda_clause;
pub mod literal;
pub mod pattern;
pub mod program;
pub mod rescue_clause;

pub use case_clause::*;
pub use lambda_clause::*;
pub use literal::*;
pub use pattern::*;
pub use program::*;
pub use rescue_clause::*;

/// Target of a call expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallTarget {
    /// Call to a function in the enclosing module
    Local(String),
    /// Call to `Module.function`
    Remote {
        /// Target module
        module: String,
        /// Target function
        function: String,
    },
}

/// Target of a raise expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaiseTarget {
    /// A resolved module alias, known at analysis time
    Alias(String),
    /// A runtime value; the raised exception type is dynamic
    Dynamic(Box<Spanned<Expr>>),
}

/// The expression type of the analyzed language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal values
    Literal(Literal),

    /// Variable references
    Var(String),

    /// Pattern binding: `pattern = expr`
    Binding {
        /// Pattern on the left of `=`
        pattern: Pattern,
        /// Bound expression
        value: Box<Spanned<Expr>>,
    },

    /// A sequence of expressions; evaluates to the last one
    Block(Vec<Spanned<Expr>>),

    /// Conditional with optional else branch
    If {
        /// Condition expression
        condition: Box<Spanned<Expr>>,
        /// Branch taken on truth
        then_branch: Box<Spanned<Expr>>,
        /// Branch taken otherwise
        else_branch: Option<Box<Spanned<Expr>>>,
    },

    /// Case analysis over a scrutinee
    Case {
        /// Matched expression
        scrutinee: Box<Spanned<Expr>>,
        /// Match clauses in source order
        clauses: Vec<CaseClause>,
    },

    /// Function application with a local or remote target
    Call {
        /// Called function
        target: CallTarget,
        /// Argument expressions
        args: Vec<Spanned<Expr>>,
    },

    /// Application of a first-class function value: `f.(args)`
    Apply {
        /// The applied function value
        fun: Box<Spanned<Expr>>,
        /// Argument expressions
        args: Vec<Spanned<Expr>>,
    },

    /// Anonymous function
    Lambda(Vec<LambdaClause>),

    /// Capture reference `&Module.function/arity`
    CaptureRef {
        /// Captured module
        module: String,
        /// Captured function
        function: String,
        /// Captured arity
        arity: u8,
    },

    /// Raise an exception
    Raise {
        /// Exception module or runtime value
        exception: RaiseTarget,
        /// Optional message or field expression
        message: Option<Box<Spanned<Expr>>>,
    },

    /// Try with rescue and after clauses
    Try {
        /// Protected body
        body: Box<Spanned<Expr>>,
        /// Rescue clauses in source order
        rescues: Vec<RescueClause>,
        /// Optional after block
        after: Option<Box<Spanned<Expr>>>,
    },

    /// Throw a value up to an enclosing catch
    Throw(Box<Spanned<Expr>>),

    /// Exit the current process
    Exit(Box<Spanned<Expr>>),

    /// Pipeline sugar; each stage is a call receiving the previous value
    /// as its first argument
    Pipeline {
        /// First value fed into the pipeline
        head: Box<Spanned<Expr>>,
        /// Call stages in order
        stages: Vec<Spanned<Expr>>,
    },

    /// List literal
    ListLit(Vec<Spanned<Expr>>),

    /// Tuple literal
    TupleLit(Vec<Spanned<Expr>>),

    /// Map literal with evaluated keys and values
    MapLit(Vec<(Spanned<Expr>, Spanned<Expr>)>),

    /// Struct literal `%Module{field: value}`
    StructLiteral {
        /// Struct module
        module: String,
        /// Field initializers
        fields: Vec<(String, Spanned<Expr>)>,
    },

    /// Comprehension over one or more generators
    Comprehension {
        /// Generator patterns and their sources
        generators: Vec<(Pattern, Spanned<Expr>)>,
        /// Element expression
        body: Box<Spanned<Expr>>,
    },

    /// A compile-time module alias, treated as an atom
    Aliases(Vec<String>),
}

impl Expr {
    /// Creates a local call expression.
    pub fn local_call(name: impl Into<String>, args: Vec<Spanned<Expr>>) -> Self {
        Self::Call {
            target: CallTarget::Local(name.into()),
            args,
        }
    }

    /// Creates a remote call expression.
    pub fn remote_call(
        module: impl Into<String>,
        function: impl Into<String>,
        args: Vec<Spanned<Expr>>,
    ) -> Self {
        Self::Call {
            target: CallTarget::Remote {
                module: module.into(),
                function: function.into(),
            },
            args,
        }
    }

    /// Creates a single-clause lambda.
    pub fn lambda(params: Vec<Pattern>, body: Spanned<Expr>) -> Self {
        Self::Lambda(vec![LambdaClause {
            params,
            guard: None,
            body,
        }])
    }

    /// Returns the joined name of an alias node (`Foo.Bar` from
    /// `["Foo", "Bar"]`).
    pub fn alias_name(parts: &[String]) -> String {
        parts.join(".")
    }
}
