//! Evaluation of terms under concrete assignments.
//!
//! Evaluation is a pure bottom-up reduction over the cone of the requested outputs, visited
//! in id order. The graph is never modified, so the same outputs can be evaluated again
//! under other assignments.

use std::collections::HashMap;

use crate::{
    circuit::BitBlaster,
    kind::ConcreteValue,
    ops,
    symbolic::{
        graph::TermGraph,
        term::{TermId, TermNode},
    },
    Error, Result,
};

/// Input values keyed by input term, as masked bit patterns.
pub type InputValues = HashMap<TermId, u64>;

/// Validates caller bindings and converts them into input values.
///
/// # Errors
///
/// - [`Error::UnknownTerm`] if a bound handle does not belong to `graph`.
/// - [`Error::InvalidArgument`] if a bound handle is not an input, the value kind differs
///   from the input kind, or an input is bound twice to different values.
pub fn resolve(graph: &TermGraph, bindings: &[(TermId, ConcreteValue)]) -> Result<InputValues> {
    let mut values = InputValues::with_capacity(bindings.len());
    for &(id, value) in bindings {
        let term = graph.get(id)?;
        if !term.is_input() {
            return Err(invalid_argument!(
                "{} is a derived term, only inputs can be assigned",
                id
            ));
        }
        if term.kind() != value.kind() {
            return Err(invalid_argument!(
                "{} has kind {} but was assigned {} of kind {}",
                id,
                term.kind(),
                value,
                value.kind()
            ));
        }

        let bits = value.to_bits();
        if let Some(previous) = values.insert(id, bits) {
            if previous != bits {
                return Err(invalid_argument!(
                    "{} is assigned twice with different values",
                    id
                ));
            }
        }
    }
    Ok(values)
}

/// Evaluates `outputs`, returning one bit pattern per output in request order.
///
/// # Errors
///
/// - [`Error::UnknownTerm`] if an output does not belong to `graph`.
/// - [`Error::InvalidArgument`] if a reachable term records a malformed operation.
/// - [`Error::IncompleteAssignment`] if a reachable input has no value.
pub fn evaluate(graph: &TermGraph, outputs: &[TermId], inputs: &InputValues) -> Result<Vec<u64>> {
    let cone = graph.cone(outputs)?;
    if let Some(&id) = cone.iter().find(|id| graph.term(**id).is_invalid()) {
        return Err(invalid_argument!("output depends on malformed term {}", id));
    }

    let missing: Vec<TermId> = cone
        .iter()
        .copied()
        .filter(|id| graph.is_input(*id) && !inputs.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(Error::IncompleteAssignment { missing });
    }

    let mut values: HashMap<TermId, u64> = HashMap::with_capacity(cone.len());
    for id in cone {
        let term = graph.term(id);
        let width = term.kind().width();
        let value = match *term.node() {
            TermNode::Input { .. } => inputs[&id],
            TermNode::Const(bits) => bits,
            TermNode::Unary { op, operand } => ops::apply_unary(op, width, values[&operand]),
            TermNode::Binary { op, left, right } => {
                ops::apply_binary(op, width, values[&left], values[&right])
            }
            TermNode::Compare { op, left, right } => {
                let operand_width = graph.term(left).kind().width();
                u64::from(ops::apply_compare(
                    op,
                    operand_width,
                    values[&left],
                    values[&right],
                ))
            }
            TermNode::Ite {
                cond,
                then,
                otherwise,
            } => {
                if values[&cond] & 1 == 1 {
                    values[&then]
                } else {
                    values[&otherwise]
                }
            }
            TermNode::Cast { op, operand } => {
                let from = graph.term(operand).kind().width();
                ops::apply_cast(op, from, width, values[&operand])
            }
            TermNode::Invalid { ref reason } => {
                return Err(invalid_argument!("{} is malformed: {}", id, reason));
            }
        };
        values.insert(id, value);
    }

    Ok(outputs.iter().map(|id| values[id]).collect())
}

/// Recomputes `outputs` by simulating their bit-blasted circuit and compares the results
/// with `expected`.
///
/// # Errors
///
/// Returns [`Error::EvaluationMismatch`] for the first output whose values differ.
pub fn cross_check(
    graph: &TermGraph,
    outputs: &[TermId],
    inputs: &InputValues,
    expected: &[u64],
) -> Result<()> {
    let closure = graph.input_closure(outputs)?;
    let mut blaster = BitBlaster::new(graph, &closure)?;
    for &output in outputs {
        blaster.add_output(output, None)?;
    }
    let aig = blaster.into_aig();

    let mut vector = Vec::with_capacity(aig.num_inputs());
    for input in &closure {
        let width = graph.term(*input).kind().width();
        let value = inputs.get(input).copied().unwrap_or(0);
        vector.extend((0..width).map(|bit| (value >> bit) & 1 == 1));
    }
    let simulated = aig.simulate(&vector);

    let mut offset = 0;
    for (&output, &term_value) in outputs.iter().zip(expected) {
        let width = graph.term(output).kind().width() as usize;
        let circuit_value = simulated[offset..offset + width]
            .iter()
            .enumerate()
            .fold(0u64, |acc, (bit, &set)| acc | (u64::from(set) << bit));
        offset += width;

        if circuit_value != term_value {
            log::warn!("{output}: term value {term_value:#x}, circuit value {circuit_value:#x}");
            return Err(Error::EvaluationMismatch {
                term: output,
                term_value,
                circuit_value,
            });
        }
    }
    Ok(())
}
