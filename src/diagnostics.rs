//! Diagnostics side channel.
//!
//! [`Diagnostics`] inspects and controls backend execution state: it traces values, dumps
//! the path and memory state, sets the diagnostic verbosity, and aborts exploration. With
//! no backend attached every operation is a no-op, so instrumented code behaves identically
//! whether or not diagnostics calls are present.
//!
//! In the symbolic backend, [`Diagnostics::abort`] unwinds out of the running host code
//! with an [`AbortSignal`]; [`crate::SymbolicSession::explore`] is the boundary that turns
//! the unwind into [`Exploration::Aborted`]. Abort ends execution paths by design and is
//! never reported as an error.

use crate::backend::{Backend, Handle};

/// Diagnostic operations available on every backend.
pub trait Diagnostics: Backend {
    /// Prints a value with the backend's own presentation, optionally labeled.
    ///
    /// A symbolic backend renders the symbolic expression, which need not reduce to a
    /// single number.
    fn trace_with(&self, label: Option<&str>, value: impl Handle<Self>);

    /// Aborts every execution path currently being explored.
    ///
    /// Unconditional and non-recoverable for the aborted paths.
    ///
    /// # Panics
    ///
    /// The symbolic backend never returns from this call: it unwinds with an
    /// [`AbortSignal`] payload. Inside [`crate::SymbolicSession::explore`] the unwind becomes
    /// [`Exploration::Aborted`]. Called anywhere else, the unwind propagates through the
    /// caller like any other panic. Detached execution returns normally.
    fn abort(&self);

    /// Prints the state of the path currently being explored.
    fn dump_path_state(&self);

    /// Prints the backend's memory state.
    fn dump_mem_state(&self);

    /// Sets the diagnostic verbosity for subsequent operations.
    ///
    /// Only the volume of diagnostic output changes; computed results never do.
    fn set_verbosity(&self, level: u32);

    /// Prints a value.
    fn trace(&self, value: impl Handle<Self>) {
        self.trace_with(None, value);
    }

    /// Prints a labeled value.
    fn trace_labeled(&self, label: &str, value: impl Handle<Self>) {
        self.trace_with(Some(label), value);
    }
}

/// Unwind payload raised by [`Diagnostics::abort`] in the symbolic backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortSignal;

/// Result of running host code under [`crate::SymbolicSession::explore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exploration<T> {
    /// The host code ran to completion.
    Completed(T),
    /// The host code, or an earlier exploration of the same session, called
    /// [`Diagnostics::abort`].
    Aborted,
}

impl<T> Exploration<T> {
    /// Returns the completed value, if any.
    #[must_use]
    pub fn completed(self) -> Option<T> {
        match self {
            Exploration::Completed(value) => Some(value),
            Exploration::Aborted => None,
        }
    }

    /// Returns `true` if exploration was aborted.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Exploration::Aborted)
    }
}
