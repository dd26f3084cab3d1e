//! # Limpid
//!
//! Limpid is a static effect-inference engine for dynamically-typed
//! functional programs with first-class functions, pattern matching,
//! protocol-style dispatch, and exceptions.
//!
//! For every function definition it produces a compact effect category
//! plus a full row of the externally observable behaviors evaluation may
//! perform: I/O, filesystem and process operations, exceptions of
//! specific types, ambient environment reads, native code. The analysis
//! is sound-first (it never under-reports) and precise enough to
//! distinguish pure code, lambda-dependent higher-order code,
//! branch-dependent context reads, and concrete side effects.
//!
//! ## Architecture
//!
//! The engine is built from three subsystems:
//! 1. **Type & effect algebra**: polymorphic types with row-polymorphic
//!    effects, unification, substitution, generalization.
//! 2. **Bidirectional walker**: synthesize/check over the syntax tree,
//!    accumulating an effect row and a substitution.
//! 3. **Effect registry & protocol resolver**: canonical effects for
//!    every external operation, with static resolution of polymorphic
//!    dispatch sites.
//!
//! ## Example
//!
//! ```
//! use limpid::ast::{Def, Expr, Module, Pattern, Visibility};
//! use limpid::diagnostics::{Span, spanned};
//! use limpid::effects::{CompactEffect, EffectRegistry};
//! use limpid::inference::FixpointDriver;
//!
//! let module = Module::new(
//!     "Math",
//!     vec![Def {
//!         visibility: Visibility::Public,
//!         name: "double".to_string(),
//!         params: vec![Pattern::var("x")],
//!         guard: None,
//!         body: spanned(
//!             Expr::remote_call(
//!                 "Kernel",
//!                 "*",
//!                 vec![
//!                     spanned(Expr::Var("x".to_string()), Span::default()),
//!                     spanned(Expr::Literal(limpid::ast::Literal::Integer(2)), Span::default()),
//!                 ],
//!             ),
//!             Span::default(),
//!         ),
//!         span: Span::default(),
//!     }],
//! );
//!
//! let registry = EffectRegistry::with_builtins();
//! let analysis = FixpointDriver::new(&registry).analyze_module(&module);
//! assert_eq!(analysis.summaries[0].effect, CompactEffect::Pure);
//! ```

#![warn(missing_docs, rust_2018_idioms)]

/// Syntax tree consumed by the engine.
pub mod ast;
/// Error handling, spans, and structured analysis errors.
pub mod diagnostics;
/// Effect labels, rows, compact categories, registry, and protocol
/// resolution.
pub mod effects;
/// The bidirectional walker, classifier, and fix-point driver.
pub mod inference;
/// Types, substitutions, schemes, environments, and unification.
pub mod types;

// Re-exports for convenience
pub use ast::{Def, Expr, Module, Pattern, Visibility};
pub use diagnostics::{Error, Result, Span, Spanned};
pub use effects::{CompactEffect, EffectRegistry, EffectRow, Mfa, Severity};
pub use inference::{FixpointDriver, FunctionSummary, ModuleAnalysis, Walker};
pub use types::{Substitution, Type, TypeEnv, TypeScheme};
