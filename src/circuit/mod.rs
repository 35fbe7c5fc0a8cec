//! Circuit construction and serialization.
//!
//! This module turns term graphs into combinational circuits and writes them in standard
//! formats:
//!
//! - [`aig`] - And-Inverter Graphs with structural hashing and simulation
//! - [`blast`] - bit-level translation of terms into AIG literals
//! - [`aiger`] - AIGER writer (ASCII `aag` and binary `aig`)
//! - [`cnf`] - Tseitin encoding to DIMACS CNF
//!
//! Serializers write to any [`std::io::Write`]; the exporter renders into memory and
//! writes files in a single call.

pub mod aig;
pub mod aiger;
pub mod blast;
pub mod cnf;

pub use aig::{Aig, AigLit};
pub use blast::BitBlaster;
