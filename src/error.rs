use thiserror::Error;

use crate::symbolic::TermId;

macro_rules! invalid_argument {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvalidArgument {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvalidArgument {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure is surfaced synchronously to the immediate caller. Nothing is retried: a
/// failed export must be treated as having left the target file in an undefined state, even
/// though the exporter validates everything before it touches the filesystem.
///
/// # Error Categories
///
/// ## Mode Errors
/// - [`Error::UnsupportedOutsideBackend`] - Circuit evaluation requested in detached mode
///
/// ## Contract Violations
/// - [`Error::IncompleteAssignment`] - A reachable input has no concrete value
/// - [`Error::DependencyNotCovered`] - An explicit input list misses a reachable input
/// - [`Error::InvalidArgument`] - Negative lengths, wrong CNF arity or kind, kind mismatches
/// - [`Error::UnknownTerm`] - A handle that does not belong to the session
///
/// ## I/O and Consistency Errors
/// - [`Error::FileError`] - Writing an exported artifact failed
/// - [`Error::EvaluationMismatch`] - Term evaluation and circuit simulation disagree
///
/// # Examples
///
/// ```rust
/// use symcircuit::{prelude::*, Error};
///
/// let concrete = Concrete;
/// let x = concrete.fresh_i32(7);
///
/// match concrete.evaluate(x, &Assignment::new()) {
///     Err(Error::UnsupportedOutsideBackend) => println!("nothing to evaluate"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Circuit evaluation was requested without a symbolic backend.
    ///
    /// Detached (concrete) execution never builds a circuit, so there is nothing to
    /// evaluate. This is returned regardless of the assignment contents.
    #[error("Evaluation is not supported outside a symbolic backend")]
    UnsupportedOutsideBackend,

    /// Some input reachable from the evaluated outputs has no concrete value.
    ///
    /// # Fields
    ///
    /// * `missing` - The unbound input terms, in creation order
    #[error("Incomplete assignment - {} reachable input(s) unbound: {missing:?}", .missing.len())]
    IncompleteAssignment {
        /// The reachable inputs which were not bound
        missing: Vec<TermId>,
    },

    /// An explicit export input list does not cover every input the outputs depend on.
    ///
    /// # Fields
    ///
    /// * `uncovered` - The reachable inputs absent from the supplied list, in creation order
    #[error("Dependency not covered - outputs depend on {} unlisted input(s): {uncovered:?}", .uncovered.len())]
    DependencyNotCovered {
        /// The reachable inputs which were not listed
        uncovered: Vec<TermId>,
    },

    /// An argument violates the API contract.
    ///
    /// Raised for negative array lengths, CNF requests with more than one or a non-boolean
    /// output, assignment values whose kind differs from the bound input, bindings of
    /// derived terms, and duplicated handles. Records the source location where the
    /// violation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of the violation
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Invalid argument - {file}:{line}: {message}")]
    InvalidArgument {
        /// The message to be printed for the InvalidArgument error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A handle refers to a term which does not exist in this session's graph.
    ///
    /// Handles are plain indices, so a handle created by one session is meaningless in
    /// another.
    #[error("Unknown term - {0:?}")]
    UnknownTerm(TermId),

    /// File I/O error.
    ///
    /// Wraps the error returned while writing an AIGER or CNF artifact, such as missing
    /// permissions, a full disk or an invalid path.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Direct term evaluation and simulation of the bit-blasted circuit produced different
    /// values for the same output.
    ///
    /// Only reported when [`crate::SessionConfig::cross_check_evaluation`] is enabled.
    #[error("Evaluation mismatch on {term:?} - terms gave {term_value:#x}, circuit gave {circuit_value:#x}")]
    EvaluationMismatch {
        /// The output whose values differ
        term: TermId,
        /// Value computed by reducing the term graph
        term_value: u64,
        /// Value computed by simulating the AIG
        circuit_value: u64,
    },
}
