//! Circuit export pipeline.
//!
//! Every export runs in three phases:
//!
//! 1. **Plan** - check the output and input specifications and compute the input closure
//!    of the outputs. All contract violations are reported here.
//! 2. **Build** - bit-blast the outputs over the planned inputs.
//! 3. **Write** - serialize into memory, then write the file in one call, replacing any
//!    existing file.
//!
//! Nothing touches the filesystem before the plan is accepted, so a rejected export leaves
//! an existing file untouched.

use std::{collections::HashSet, path::Path};

use crate::{
    circuit::{aiger, cnf, BitBlaster},
    config::ExportConfig,
    kind::KindTag,
    symbolic::{graph::TermGraph, term::TermId},
    Error, Result,
};

/// Summary of a written artifact, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExportSummary {
    /// Circuit input bits.
    pub inputs: usize,
    /// AND gates.
    pub gates: usize,
    /// Bytes written.
    pub bytes: usize,
}

/// Computes the circuit inputs for `outputs`.
///
/// # Arguments
///
/// * `graph` - The term graph owning the outputs.
/// * `outputs` - The exported terms; must not be empty.
/// * `ordering` - Explicit circuit inputs in caller order, or `None` to use the closure.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] for empty outputs, for outputs depending on a malformed
///   operation, and for explicit entries that are not inputs or appear twice.
/// - [`Error::DependencyNotCovered`] if explicit inputs miss a reachable input.
/// - [`Error::UnknownTerm`] for handles of another session.
pub(crate) fn plan_inputs(
    graph: &TermGraph,
    outputs: &[TermId],
    ordering: Option<&[TermId]>,
) -> Result<Vec<TermId>> {
    if outputs.is_empty() {
        return Err(invalid_argument!("at least one output is required"));
    }
    graph.ensure_well_formed(outputs)?;
    let closure = graph.input_closure(outputs)?;

    let Some(explicit) = ordering else {
        return Ok(closure);
    };

    let mut listed = HashSet::with_capacity(explicit.len());
    for &id in explicit {
        if !graph.get(id)?.is_input() {
            return Err(invalid_argument!(
                "{} is a derived term and cannot be a circuit input",
                id
            ));
        }
        if !listed.insert(id) {
            return Err(invalid_argument!("{} is listed twice as a circuit input", id));
        }
    }

    let uncovered: Vec<TermId> = closure
        .into_iter()
        .filter(|id| !listed.contains(id))
        .collect();
    if !uncovered.is_empty() {
        return Err(Error::DependencyNotCovered { uncovered });
    }
    Ok(explicit.to_vec())
}

/// Writes `outputs` as an AIGER circuit.
///
/// Each output contributes its bits, least significant first, as outputs named `out<k>`;
/// each planned input contributes its bits as circuit inputs in order.
///
/// # Errors
///
/// See [`plan_inputs`]; I/O failures are [`Error::FileError`].
pub(crate) fn write_aiger(
    graph: &TermGraph,
    config: &ExportConfig,
    path: &Path,
    outputs: &[TermId],
    ordering: Option<&[TermId]>,
) -> Result<ExportSummary> {
    let inputs = plan_inputs(graph, outputs, ordering)?;

    let mut blaster = BitBlaster::new(graph, &inputs)?;
    let mut comment = vec!["symcircuit combinational export".to_string()];
    for (index, &output) in outputs.iter().enumerate() {
        let name = format!("out{index}");
        comment.push(format!("{name}: {} {output}", graph.term(output).kind()));
        blaster.add_output(output, Some(&name))?;
    }
    let aig = blaster.into_aig();

    let mut buffer = Vec::new();
    aiger::write_aiger(
        &mut buffer,
        &aig,
        config.aiger_format,
        config.flags,
        &comment,
    )?;
    std::fs::write(path, &buffer)?;

    Ok(ExportSummary {
        inputs: aig.num_inputs(),
        gates: aig.num_ands(),
        bytes: buffer.len(),
    })
}

/// Writes the DIMACS CNF asserting that `output` is false.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `output` is not boolean.
/// - [`Error::UnknownTerm`] for a handle of another session.
/// - [`Error::FileError`] if writing fails.
pub(crate) fn write_cnf(
    graph: &TermGraph,
    config: &ExportConfig,
    path: &Path,
    output: TermId,
) -> Result<ExportSummary> {
    let kind = graph.get(output)?.kind();
    if kind != KindTag::Bool {
        return Err(invalid_argument!(
            "CNF export takes a boolean output, got {}",
            kind
        ));
    }
    let inputs = plan_inputs(graph, &[output], None)?;

    let mut blaster = BitBlaster::new(graph, &inputs)?;
    let lit = blaster.blast(output)?[0];
    let aig = blaster.into_aig();

    let comment = vec![
        "symcircuit CNF export".to_string(),
        format!("satisfiable iff {output} can be false"),
    ];
    let mut buffer = Vec::new();
    cnf::write_cnf(&mut buffer, &aig, lit, config.flags, &comment)?;
    std::fs::write(path, &buffer)?;

    Ok(ExportSummary {
        inputs: aig.num_inputs(),
        gates: aig.num_ands(),
        bytes: buffer.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AigerFormat, ExportFlags},
        kind::ConcreteValue,
        ops::{BinaryOp, CompareOp},
    };

    fn sample() -> (TermGraph, TermId, TermId, TermId, TermId) {
        let graph = TermGraph::new("x");
        let x = graph.add_input(KindTag::I8, None, ConcreteValue::I8(0));
        let y = graph.add_input(KindTag::I8, None, ConcreteValue::I8(0));
        let z = graph.add_input(KindTag::Bool, None, ConcreteValue::Bool(false));
        let sum = graph.add_binary(BinaryOp::Add, x, y);
        (graph, x, y, z, sum)
    }

    #[test]
    fn test_plan_inferred() {
        let (graph, x, y, _, sum) = sample();
        assert_eq!(plan_inputs(&graph, &[sum], None).unwrap(), vec![x, y]);
        assert!(matches!(
            plan_inputs(&graph, &[], None),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_plan_explicit() {
        let (graph, x, y, z, sum) = sample();

        // extra inputs are kept as free inputs, in caller order
        assert_eq!(
            plan_inputs(&graph, &[sum], Some(&[z, y, x][..])).unwrap(),
            vec![z, y, x]
        );
        assert_eq!(plan_inputs(&graph, &[z], Some(&[z][..])).unwrap(), vec![z]);

        match plan_inputs(&graph, &[sum], Some(&[y][..])) {
            Err(Error::DependencyNotCovered { uncovered }) => assert_eq!(uncovered, vec![x]),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            plan_inputs(&graph, &[sum], Some(&[x, y, x][..])),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            plan_inputs(&graph, &[sum], Some(&[x, y, sum][..])),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_constant_output_with_empty_inputs() {
        let graph = TermGraph::new("x");
        let c = graph.add_const(KindTag::I8, 3);
        assert!(plan_inputs(&graph, &[c], Some(&[][..])).unwrap().is_empty());
    }

    #[test]
    fn test_write_aiger_file() {
        let (graph, x, y, _, sum) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sum.aag");

        let config = ExportConfig::default();
        let summary = write_aiger(&graph, &config, &path, &[sum], None).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert_eq!(summary.inputs, 16);
        assert_eq!(summary.bytes, text.len());
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            format!("aag {} 16 0 8 {}", 16 + summary.gates, summary.gates)
        );
        assert!(text.contains("i0 x0[0]"));
        assert!(text.contains("o7 out0[7]"));

        let binary = ExportConfig::minimal().with_aiger_format(AigerFormat::Binary);
        write_aiger(&graph, &binary, &path, &[sum], Some(&[y, x][..])).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"aig "));
    }

    #[test]
    fn test_write_cnf_file() {
        let (graph, x, y, _, _) = sample();
        let less = graph.add_compare(CompareOp::ULe, x, y);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("le.cnf");

        let config = ExportConfig::new().with_flags(ExportFlags::empty());
        write_cnf(&graph, &config, &path, less).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("p cnf "));

        assert!(matches!(
            write_cnf(&graph, &config, &path, x),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_rejected_export_keeps_file() {
        let (graph, _, y, _, sum) = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.aag");
        std::fs::write(&path, "previous").unwrap();

        let config = ExportConfig::default();
        assert!(write_aiger(&graph, &config, &path, &[sum], Some(&[y][..])).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }

    #[test]
    fn test_malformed_output_is_rejected() {
        let (graph, x, _, z, sum) = sample();
        let mixed = graph.add_compare(CompareOp::Eq, x, z);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.cnf");
        std::fs::write(&path, "previous").unwrap();

        assert!(matches!(
            plan_inputs(&graph, &[sum, mixed], None),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            write_cnf(&graph, &ExportConfig::default(), &path, mixed),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }
}
