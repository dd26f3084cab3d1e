//! The inference layer: walker, classifier, and fix-point driver.
//!
//! A [`walker::Walker`] analyzes one function at a time; the
//! [`fixpoint::FixpointDriver`] schedules walkers over a module's call
//! graph and commits stabilized summaries into the registry.

pub mod classify;
pub mod fixpoint;
pub mod pattern;
pub mod summary;
pub mod walker;

pub use classify::*;
pub use fixpoint::*;
pub use pattern::*;
pub use summary::*;
pub use walker::*;
