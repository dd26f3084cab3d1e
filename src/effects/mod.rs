//! Effect model for the inference engine.
//!
//! This module provides the full effect vocabulary:
//!
//! - Effect labels and rows with row variables ([`label`], [`row`])
//! - The compact seven-category summary form and severity lattice
//!   ([`compact`])
//! - The effect registry, canonical source of truth for every externally
//!   callable operation ([`registry`], [`builtins`])
//! - The protocol dispatch resolver ([`protocol`])
//!
//! Internally the engine always carries rows; compact effects exist at the
//! registry boundary and in emitted summaries.

pub mod builtins;
pub mod compact;
pub mod label;
pub mod mfa;
pub mod protocol;
pub mod registry;
pub mod row;

pub use builtins::*;
pub use compact::*;
pub use label::*;
pub use mfa::*;
pub use protocol::*;
pub use registry::*;
pub use row::*;
