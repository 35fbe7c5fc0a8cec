//! The symbolic backend.
//!
//! A [`SymbolicSession`] records every computation performed through its [`Backend`]
//! methods in an append-only [`graph::TermGraph`]. Fresh values become unconstrained input
//! terms, operations become derived terms, and the resulting handles ([`Sym`]) can be
//! evaluated under concrete assignments or exported as circuits.
//!
//! # Architecture
//!
//! - [`term`] - immutable terms and their ids
//! - [`graph`] - the lock-free arena with constant folding and structural sharing
//! - [`eval`] - assignment validation and bottom-up evaluation
//!
//! All methods take `&self`; a session can be shared between threads and terms are never
//! removed individually. Dropping the session drops the whole graph.
//!
//! # Example
//!
//! ```rust
//! use symcircuit::prelude::*;
//!
//! let session = SymbolicSession::new();
//! let x = session.fresh_named::<I32>("x", 0);
//! let y = session.mul(x, session.lit::<I32>(3));
//!
//! assert_eq!(session.render(y)?, "(x * 3)");
//! let assignment = Assignment::new().bind(x, 7i32);
//! assert_eq!(session.evaluate(y, &assignment)?, 21);
//! # Ok::<(), symcircuit::Error>(())
//! ```

use std::{
    fmt,
    io::{self, Write},
    marker::PhantomData,
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
        Mutex,
    },
};

use crate::{
    backend::{
        handle_kind, Assignment, Backend, Handle, InputOrdering, NativeOf, OutputSpec, SymArray,
    },
    config::SessionConfig,
    diagnostics::{AbortSignal, Diagnostics, Exploration},
    export,
    kind::{Bool, Kind, KindTag},
    ops::{BinaryOp, CastOp, CompareOp, UnaryOp},
    Result,
};

pub mod eval;
pub mod graph;
pub mod term;

pub use graph::TermGraph;
pub use term::{Term, TermId, TermNode};

/// A handle of kind `K` into a [`SymbolicSession`].
///
/// Handles are plain indices: cheap to copy, and only meaningful in the session that
/// created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sym<K: Kind> {
    id: TermId,
    kind: PhantomData<K>,
}

impl<K: Kind> Sym<K> {
    fn new(id: TermId) -> Self {
        Self {
            id,
            kind: PhantomData,
        }
    }

    /// Returns the id of the referenced term.
    #[must_use]
    pub const fn id(self) -> TermId {
        self.id
    }
}

impl<K: Kind> Handle<SymbolicSession> for Sym<K> {
    type Kind = K;

    fn into_input(self) -> TermId {
        self.id
    }

    fn from_input(input: TermId) -> Self {
        Self::new(input)
    }
}

impl<K: Kind> From<Sym<K>> for TermId {
    fn from(handle: Sym<K>) -> Self {
        handle.id
    }
}

impl<K: Kind> fmt::Display for Sym<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// An in-process symbolic backend.
///
/// Diagnostics are written to stdout unless another writer is installed with
/// [`SymbolicSession::with_writer`].
pub struct SymbolicSession {
    graph: TermGraph,
    config: SessionConfig,
    verbosity: AtomicU32,
    aborted: AtomicBool,
    arrays: AtomicUsize,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl SymbolicSession {
    /// Creates a session with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Creates a session with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Verbosity, input naming, cross-check and export settings.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            graph: TermGraph::new(config.input_prefix.clone()),
            verbosity: AtomicU32::new(config.verbosity),
            config,
            aborted: AtomicBool::new(false),
            arrays: AtomicUsize::new(0),
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Replaces the diagnostics writer.
    #[must_use]
    pub fn with_writer(self, writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            ..self
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the term graph.
    #[must_use]
    pub fn graph(&self) -> &TermGraph {
        &self.graph
    }

    /// Returns the current diagnostic verbosity.
    #[must_use]
    pub fn verbosity(&self) -> u32 {
        self.verbosity.load(Ordering::Relaxed)
    }

    /// Returns `true` once [`Diagnostics::abort`] has been called.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Returns the number of terms recorded so far.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.graph.len()
    }

    /// Returns the input terms, in creation order.
    #[must_use]
    pub fn inputs(&self) -> Vec<TermId> {
        self.graph.inputs()
    }

    /// Returns the kind of a handle's term.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownTerm`] for a handle of another session.
    pub fn kind_of(&self, value: impl Handle<Self>) -> Result<KindTag> {
        Ok(self.graph.get(value.into_input())?.kind())
    }

    /// Renders the symbolic expression of a value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownTerm`] for a handle of another session.
    pub fn render(&self, value: impl Handle<Self>) -> Result<String> {
        self.graph.render(value.into_input())
    }

    /// Runs host code, catching [`Diagnostics::abort`].
    ///
    /// Once a session has been aborted, every later exploration returns
    /// [`Exploration::Aborted`] without running `f`. Panics other than abort propagate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use symcircuit::prelude::*;
    ///
    /// let session = SymbolicSession::new().with_writer(std::io::sink());
    /// let outcome = session.explore(|| {
    ///     let x = session.fresh_i8(0);
    ///     session.abort();
    ///     x
    /// });
    /// assert!(outcome.is_aborted());
    /// ```
    pub fn explore<T>(&self, f: impl FnOnce() -> T) -> Exploration<T> {
        if self.is_aborted() {
            return Exploration::Aborted;
        }
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Exploration::Completed(value),
            Err(payload) if payload.is::<AbortSignal>() => Exploration::Aborted,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn new_input<K: Kind>(&self, name: Option<&str>, default: K::Native) -> Sym<K> {
        let id = self.graph.add_input(K::TAG, name, default.into());
        if self.verbosity() >= 2 {
            log::debug!("fresh {}", self.graph.describe(id));
        }
        Sym::new(id)
    }

    /// Returns an invalid term of `kind` if an operand's term does not have the kind its
    /// handle declares.
    fn mistyped(&self, kind: KindTag, operands: &[(TermId, KindTag)]) -> Option<TermId> {
        operands.iter().find_map(|&(id, declared)| {
            let actual = self.graph.term(id).kind();
            (actual != declared).then(|| {
                self.graph
                    .add_invalid(kind, format!("{id} holds {actual} but is used as {declared}"))
            })
        })
    }

    fn typed_output<V: Handle<Self>>(&self, output: V) -> Result<TermId> {
        let id = output.into_input();
        let actual = self.graph.get(id)?.kind();
        let declared = <V::Kind as Kind>::TAG;
        if actual != declared {
            return Err(invalid_argument!(
                "{} holds {} but its handle is {}",
                id,
                actual,
                declared
            ));
        }
        Ok(id)
    }

    fn derived(&self, id: TermId) -> TermId {
        if self.verbosity() >= 3 {
            log::trace!("derived {}", self.graph.describe(id));
        }
        id
    }

    fn evaluate_terms(&self, outputs: &[TermId], assignment: &Assignment<Self>) -> Result<Vec<u64>> {
        let inputs = eval::resolve(&self.graph, assignment.bindings())?;
        let values = eval::evaluate(&self.graph, outputs, &inputs)?;
        if self.config.cross_check_evaluation {
            eval::cross_check(&self.graph, outputs, &inputs, &values)?;
        }
        Ok(values)
    }

    fn emit(&self, text: &str) {
        let mut out = lock!(self.writer);
        if let Err(error) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            log::warn!("failed to write diagnostics: {error}");
        }
    }
}

impl Default for SymbolicSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SymbolicSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolicSession")
            .field("terms", &self.graph.len())
            .field("inputs", &self.graph.input_count())
            .field("verbosity", &self.verbosity())
            .field("aborted", &self.is_aborted())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Backend for SymbolicSession {
    type Input = TermId;
    type Value<K: Kind> = Sym<K>;

    fn is_symbolic(&self) -> bool {
        true
    }

    fn fresh<K: Kind>(&self, default: K::Native) -> Sym<K> {
        self.new_input(None, default)
    }

    fn fresh_named<K: Kind>(&self, name: &str, default: K::Native) -> Sym<K> {
        self.new_input(Some(name), default)
    }

    fn fresh_array<K: Kind>(&self, len: i64) -> Result<SymArray<Sym<K>>> {
        let len = usize::try_from(len)
            .map_err(|_| invalid_argument!("negative array length {}", len))?;

        let array = self.arrays.fetch_add(1, Ordering::Relaxed);
        let default = K::from_bits(0);
        let elements = (0..len)
            .map(|index| self.new_input::<K>(Some(&format!("arr{array}[{index}]")), default))
            .collect();
        Ok(SymArray::from_vec(elements))
    }

    fn lit<K: Kind>(&self, value: K::Native) -> Sym<K> {
        Sym::new(self.graph.add_const(K::TAG, K::to_bits(value)))
    }

    fn unary<V: Handle<Self>>(&self, op: UnaryOp, value: V) -> V {
        let kind = <V::Kind as Kind>::TAG;
        let operand = value.into_input();
        let id = self
            .mistyped(kind, &[(operand, kind)])
            .unwrap_or_else(|| self.graph.add_unary(op, operand));
        V::from_input(self.derived(id))
    }

    fn binary<V: Handle<Self>>(&self, op: BinaryOp, left: V, right: V) -> V {
        let kind = <V::Kind as Kind>::TAG;
        let (left, right) = (left.into_input(), right.into_input());
        let id = self
            .mistyped(kind, &[(left, kind), (right, kind)])
            .unwrap_or_else(|| self.graph.add_binary(op, left, right));
        V::from_input(self.derived(id))
    }

    fn compare<V: Handle<Self>>(&self, op: CompareOp, left: V, right: V) -> Sym<Bool> {
        let kind = <V::Kind as Kind>::TAG;
        let (left, right) = (left.into_input(), right.into_input());
        let id = self
            .mistyped(KindTag::Bool, &[(left, kind), (right, kind)])
            .unwrap_or_else(|| self.graph.add_compare(op, left, right));
        Sym::new(self.derived(id))
    }

    fn ite<V: Handle<Self>>(&self, cond: Sym<Bool>, then: V, otherwise: V) -> V {
        let kind = <V::Kind as Kind>::TAG;
        let (then, otherwise) = (then.into_input(), otherwise.into_input());
        let operands = [(cond.id, KindTag::Bool), (then, kind), (otherwise, kind)];
        let id = self
            .mistyped(kind, &operands)
            .unwrap_or_else(|| self.graph.add_ite(cond.id, then, otherwise));
        V::from_input(self.derived(id))
    }

    fn cast<T: Kind>(&self, op: CastOp, value: impl Handle<Self>) -> Sym<T> {
        let operand = value.into_input();
        let id = match self.mistyped(T::TAG, &[(operand, handle_kind::<Self, _>(&value))]) {
            Some(invalid) => invalid,
            None => self.graph.add_cast(op, T::TAG, operand),
        };
        Sym::new(self.derived(id))
    }

    fn check_kind<V: Handle<Self>>(&self, value: V) -> Result<()> {
        self.typed_output(value).map(|_| ())
    }

    fn evaluate<V: Handle<Self>>(
        &self,
        output: V,
        assignment: &Assignment<Self>,
    ) -> Result<NativeOf<Self, V>> {
        let values = self.evaluate_terms(&[self.typed_output(output)?], assignment)?;
        Ok(<V::Kind as Kind>::from_bits(values[0]))
    }

    fn evaluate_many<V: Handle<Self>>(
        &self,
        outputs: &[V],
        assignment: &Assignment<Self>,
    ) -> Result<Vec<NativeOf<Self, V>>> {
        let ids = outputs
            .iter()
            .map(|&output| self.typed_output(output))
            .collect::<Result<Vec<TermId>>>()?;
        let values = self.evaluate_terms(&ids, assignment)?;
        Ok(values
            .into_iter()
            .map(<V::Kind as Kind>::from_bits)
            .collect())
    }

    fn write_aiger<P: AsRef<Path>>(
        &self,
        path: P,
        outputs: &OutputSpec<Self>,
        inputs: &InputOrdering<Self>,
    ) -> Result<()> {
        let path = path.as_ref();
        let summary = export::write_aiger(
            &self.graph,
            &self.config.export,
            path,
            outputs.handles(),
            inputs.explicit_inputs(),
        )?;
        if self.verbosity() >= 2 {
            log::debug!(
                "wrote AIGER circuit to {} ({} input bits, {} gates, {} bytes)",
                path.display(),
                summary.inputs,
                summary.gates,
                summary.bytes
            );
        }
        Ok(())
    }

    fn write_cnf<P: AsRef<Path>>(&self, path: P, output: &OutputSpec<Self>) -> Result<()> {
        let output = match output {
            OutputSpec::Single(output) => *output,
            OutputSpec::Sequence(outputs) => {
                return Err(invalid_argument!(
                    "CNF export takes a single boolean output, got a sequence of {}",
                    outputs.len()
                ))
            }
        };

        let path = path.as_ref();
        let summary = export::write_cnf(&self.graph, &self.config.export, path, output)?;
        if self.verbosity() >= 2 {
            log::debug!(
                "wrote CNF for {output} to {} ({} variables, {} bytes)",
                path.display(),
                summary.inputs + summary.gates,
                summary.bytes
            );
        }
        Ok(())
    }
}

impl Diagnostics for SymbolicSession {
    fn trace_with(&self, label: Option<&str>, value: impl Handle<Self>) {
        if self.verbosity() == 0 {
            return;
        }
        let id = value.into_input();
        let rendered = self
            .graph
            .render(id)
            .unwrap_or_else(|_| format!("<unknown {id}>"));
        match label {
            Some(label) => self.emit(&format!("[trace] {label} = {rendered}\n")),
            None => self.emit(&format!("[trace] {rendered}\n")),
        }
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
        if self.verbosity() >= 2 {
            log::debug!("exploration aborted");
        }
        panic::resume_unwind(Box::new(AbortSignal));
    }

    fn dump_path_state(&self) {
        if self.verbosity() == 0 {
            return;
        }
        let inputs = self.graph.inputs();
        let mut text = format!(
            "[path] {} input(s), {} term(s), verbosity {}, aborted {}\n",
            inputs.len(),
            self.graph.len(),
            self.verbosity(),
            self.is_aborted()
        );
        for id in inputs {
            text.push_str("  ");
            text.push_str(&self.graph.describe(id));
            text.push('\n');
        }
        self.emit(&text);
    }

    fn dump_mem_state(&self) {
        if self.verbosity() == 0 {
            return;
        }
        let mut text = format!("[mem] {} term(s)\n", self.graph.len());
        for index in 0..self.graph.len() {
            text.push_str("  ");
            text.push_str(&self.graph.describe(TermId::new(index)));
            text.push('\n');
        }
        self.emit(&text);
    }

    fn set_verbosity(&self, level: u32) {
        self.verbosity.store(level, Ordering::Relaxed);
    }
}
