//! And-Inverter Graphs.
//!
//! An [`Aig`] is a combinational circuit of two-input AND gates and inverted edges. Variables
//! are numbered the way AIGER expects them: variable 0 is the constant, inputs occupy
//! variables `1..=I` and gate `k` defines variable `I + 1 + k`. Gates are created through
//! [`Aig::and`], which folds constants and trivial cases and shares structurally identical
//! gates, so no gate ever reads a constant and every gate reads only earlier variables.

use std::{collections::HashMap, fmt, ops::Not};

/// A possibly inverted reference to an AIG variable, encoded as `2 * var + inverted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AigLit(usize);

impl AigLit {
    /// The constant false literal.
    pub const FALSE: AigLit = AigLit(0);
    /// The constant true literal.
    pub const TRUE: AigLit = AigLit(1);

    /// Creates the positive literal of a variable.
    #[must_use]
    pub const fn var(var: usize) -> Self {
        AigLit(var << 1)
    }

    /// Returns the literal for a constant.
    #[must_use]
    pub const fn constant(value: bool) -> Self {
        if value {
            AigLit::TRUE
        } else {
            AigLit::FALSE
        }
    }

    /// Returns the encoded literal.
    #[must_use]
    pub const fn code(self) -> usize {
        self.0
    }

    /// Returns the referenced variable.
    #[must_use]
    pub const fn variable(self) -> usize {
        self.0 >> 1
    }

    /// Returns `true` if the edge is inverted.
    #[must_use]
    pub const fn is_inverted(self) -> bool {
        self.0 & 1 == 1
    }

    /// Returns `true` for the two constant literals.
    #[must_use]
    pub const fn is_constant(self) -> bool {
        self.0 < 2
    }
}

impl Not for AigLit {
    type Output = AigLit;

    fn not(self) -> AigLit {
        AigLit(self.0 ^ 1)
    }
}

impl fmt::Display for AigLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A combinational And-Inverter Graph with named inputs and outputs.
#[derive(Debug, Clone)]
pub struct Aig {
    num_inputs: usize,
    gates: Vec<(AigLit, AigLit)>,
    strash: HashMap<(AigLit, AigLit), AigLit>,
    outputs: Vec<AigLit>,
    input_names: Vec<Option<String>>,
    output_names: Vec<Option<String>>,
}

impl Aig {
    /// Creates a graph with `num_inputs` inputs and no gates.
    #[must_use]
    pub fn new(num_inputs: usize) -> Self {
        Self {
            num_inputs,
            gates: Vec::new(),
            strash: HashMap::new(),
            outputs: Vec::new(),
            input_names: vec![None; num_inputs],
            output_names: Vec::new(),
        }
    }

    /// Returns the literal of input `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the input count.
    #[must_use]
    pub fn input(&self, index: usize) -> AigLit {
        assert!(index < self.num_inputs, "input {index} out of range");
        AigLit::var(index + 1)
    }

    /// Returns the number of inputs.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Returns the number of AND gates.
    #[must_use]
    pub fn num_ands(&self) -> usize {
        self.gates.len()
    }

    /// Returns the number of outputs.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Returns the largest variable index.
    #[must_use]
    pub fn max_var(&self) -> usize {
        self.num_inputs + self.gates.len()
    }

    /// Returns the gates as `(rhs0, rhs1)` pairs with `rhs0 >= rhs1`, in definition order.
    #[must_use]
    pub fn gates(&self) -> &[(AigLit, AigLit)] {
        &self.gates
    }

    /// Returns the literal defined by gate `index`.
    #[must_use]
    pub fn gate_lhs(&self, index: usize) -> AigLit {
        AigLit::var(self.num_inputs + 1 + index)
    }

    /// Returns the gate defining `var`, if `var` is a gate variable.
    #[must_use]
    pub fn gate_of(&self, var: usize) -> Option<(AigLit, AigLit)> {
        var.checked_sub(self.num_inputs + 1)
            .and_then(|index| self.gates.get(index).copied())
    }

    /// Returns the output literals in order.
    #[must_use]
    pub fn outputs(&self) -> &[AigLit] {
        &self.outputs
    }

    /// Returns the input names; unnamed inputs are `None`.
    #[must_use]
    pub fn input_names(&self) -> &[Option<String>] {
        &self.input_names
    }

    /// Returns the output names; unnamed outputs are `None`.
    #[must_use]
    pub fn output_names(&self) -> &[Option<String>] {
        &self.output_names
    }

    /// Names input `index`.
    pub fn set_input_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(slot) = self.input_names.get_mut(index) {
            *slot = Some(name.into());
        }
    }

    /// Appends an output.
    pub fn add_output(&mut self, lit: AigLit, name: Option<String>) {
        self.outputs.push(lit);
        self.output_names.push(name);
    }

    /// Returns a literal for `a AND b`.
    pub fn and(&mut self, a: AigLit, b: AigLit) -> AigLit {
        if a == AigLit::FALSE || b == AigLit::FALSE || a == !b {
            return AigLit::FALSE;
        }
        if a == AigLit::TRUE || a == b {
            return b;
        }
        if b == AigLit::TRUE {
            return a;
        }

        let key = if a > b { (a, b) } else { (b, a) };
        if let Some(&lit) = self.strash.get(&key) {
            return lit;
        }

        let lit = self.gate_lhs(self.gates.len());
        self.gates.push(key);
        self.strash.insert(key, lit);
        lit
    }

    /// Returns a literal for `a OR b`.
    pub fn or(&mut self, a: AigLit, b: AigLit) -> AigLit {
        !self.and(!a, !b)
    }

    /// Returns a literal for `a XOR b`.
    pub fn xor(&mut self, a: AigLit, b: AigLit) -> AigLit {
        let both = self.and(a, b);
        let neither = self.and(!a, !b);
        self.and(!both, !neither)
    }

    /// Returns a literal for `a == b`.
    pub fn xnor(&mut self, a: AigLit, b: AigLit) -> AigLit {
        !self.xor(a, b)
    }

    /// Returns a literal selecting `then` when `sel` holds and `otherwise` when not.
    pub fn mux(&mut self, sel: AigLit, then: AigLit, otherwise: AigLit) -> AigLit {
        if then == otherwise {
            return then;
        }
        let on = self.and(sel, then);
        let off = self.and(!sel, otherwise);
        self.or(on, off)
    }

    /// Evaluates every output for one input vector.
    ///
    /// # Arguments
    ///
    /// * `inputs` - One value per input; missing inputs read as false.
    ///
    /// # Returns
    ///
    /// The output values, in output order.
    #[must_use]
    pub fn simulate(&self, inputs: &[bool]) -> Vec<bool> {
        let mut values = Vec::with_capacity(self.max_var() + 1);
        values.push(false);
        values.extend((0..self.num_inputs).map(|i| inputs.get(i).copied().unwrap_or(false)));

        let read = |values: &[bool], lit: AigLit| values[lit.variable()] ^ lit.is_inverted();
        for &(rhs0, rhs1) in &self.gates {
            let value = read(&values, rhs0) && read(&values, rhs1);
            values.push(value);
        }

        self.outputs.iter().map(|&lit| read(&values, lit)).collect()
    }
}
