// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # symcircuit
//!
//! Dual-mode symbolic value injection and circuit export.
//!
//! A host program is written once against the [`Backend`] trait and runs in one of two
//! modes:
//!
//! - **Detached** ([`Concrete`]) - fresh values are the caller's defaults and every
//!   operation computes directly on native integers. Evaluation is unsupported, exports and
//!   diagnostics do nothing.
//! - **Symbolic** ([`SymbolicSession`]) - fresh values are unconstrained inputs of a term
//!   graph and operations record derived terms. Outputs can be evaluated under concrete
//!   assignments or exported as AIGER circuits and DIMACS CNF formulas.
//!
//! ## Features
//!
//! - **Four value kinds** - booleans and 8, 32 and 64 bit two's-complement integers
//! - **One semantics** - wrapping arithmetic, masked shifts and total division, identical
//!   in both modes and in the generated circuits
//! - **Shared term graph** - lock-free appends, constant folding, structural sharing
//! - **Circuit export** - AIGER 1.9 (`aag` / `aig`) and Tseitin-encoded DIMACS CNF
//! - **Diagnostics** - traces, state dumps, verbosity control and path abort
//!
//! ## Quick Start
//!
//! ```rust
//! use symcircuit::prelude::*;
//!
//! fn checksum<B: Backend>(backend: &B) -> B::Value<I32> {
//!     let a = backend.fresh_i32(0);
//!     let b = backend.fresh_i32(0);
//!     backend.xor(backend.add(a, b), backend.lit::<I32>(0x5A5A))
//! }
//!
//! // Detached execution just computes
//! assert_eq!(checksum(&Concrete), 0x5A5A);
//!
//! // Symbolic execution records a circuit
//! let session = SymbolicSession::new();
//! let out = checksum(&session);
//! let dir = tempfile::tempdir()?;
//! session.write_aiger_outputs(dir.path().join("checksum.aag"), &[out], &InputOrdering::Inferred)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`backend`] - The [`Backend`] contract and its argument types
//! - [`kind`] and [`ops`] - Value kinds and the reference operation semantics
//! - [`concrete`] - The detached backend
//! - [`symbolic`] - The symbolic backend and its term graph
//! - [`circuit`] - AIG construction, bit-blasting, AIGER and DIMACS writers
//! - [`diagnostics`] - Tracing, dumps and abort
//! - [`config`] - Session and export configuration
//! - [`Error`] and [`Result`] - Error handling

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use symcircuit::prelude::*;
///
/// let session = SymbolicSession::new();
/// let x = session.fresh_i8(0);
/// assert!(session.is_symbolic());
/// # let _ = x;
/// ```
pub mod prelude;

pub mod backend;
pub mod circuit;
pub mod concrete;
pub mod config;
pub mod diagnostics;
pub(crate) mod export;
pub mod kind;
pub mod ops;
pub mod symbolic;

/// `symcircuit` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `symcircuit` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use backend::{Assignment, Backend, Handle, InputOrdering, NativeOf, OutputSpec, SymArray};
pub use concrete::Concrete;
pub use config::{AigerFormat, ExportConfig, ExportFlags, SessionConfig};
pub use diagnostics::{AbortSignal, Diagnostics, Exploration};
pub use kind::{Bool, ConcreteValue, Kind, KindTag, I32, I64, I8};
pub use ops::{BinaryOp, CastOp, CompareOp, UnaryOp};
pub use symbolic::{Sym, SymbolicSession, TermId};
