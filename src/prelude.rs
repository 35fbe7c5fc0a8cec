//! # symcircuit Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the symcircuit library. Import it to get the backend trait with its operation
//! methods, both backends and the value kinds.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all symcircuit operations
pub use crate::Error;

/// The result type used throughout symcircuit
pub use crate::Result;

// ================================================================================================
// Backends
// ================================================================================================

/// The dual-mode contract and its handle trait
pub use crate::backend::{Backend, Handle};

/// Detached execution
pub use crate::Concrete;

/// The symbolic backend and its handles
pub use crate::symbolic::{Sym, SymbolicSession, TermId};

/// Diagnostics side channel
pub use crate::diagnostics::{Diagnostics, Exploration};

// ================================================================================================
// Values and Arguments
// ================================================================================================

/// Value kinds and literals
pub use crate::kind::{Bool, ConcreteValue, Kind, KindTag, I32, I64, I8};

/// Evaluation and export arguments
pub use crate::backend::{Assignment, InputOrdering, OutputSpec, SymArray};

// ================================================================================================
// Configuration
// ================================================================================================

/// Session and export configuration
pub use crate::config::{AigerFormat, ExportConfig, ExportFlags, SessionConfig};
