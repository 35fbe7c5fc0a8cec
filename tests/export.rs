//! Integration tests for AIGER and DIMACS export.
//!
//! The written files are parsed back and checked for structural consistency. Small
//! artifacts are also checked semantically: AIGER files are simulated and compared against
//! term evaluation, CNF formulas are decided by exhaustive search.

use std::{fs, path::Path};

use symcircuit::{prelude::*, Result};

/// A parsed combinational ASCII AIGER file.
struct ParsedAiger {
    max_var: usize,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    gates: Vec<(usize, usize, usize)>,
    symbols: Vec<String>,
}

impl ParsedAiger {
    fn read(path: &Path) -> ParsedAiger {
        let text = fs::read_to_string(path).unwrap();
        let mut lines = text.lines();

        let header: Vec<&str> = lines.next().unwrap().split_whitespace().collect();
        assert_eq!(header[0], "aag");
        let numbers: Vec<usize> = header[1..].iter().map(|n| n.parse().unwrap()).collect();
        let [max_var, num_inputs, latches, num_outputs, num_ands] = numbers[..] else {
            panic!("malformed header {header:?}");
        };
        assert_eq!(latches, 0);
        assert_eq!(max_var, num_inputs + num_ands);

        let literal = |line: Option<&str>| -> usize { line.unwrap().parse().unwrap() };
        let inputs = (0..num_inputs).map(|_| literal(lines.next())).collect();
        let outputs = (0..num_outputs).map(|_| literal(lines.next())).collect();
        let gates = (0..num_ands)
            .map(|_| {
                let gate: Vec<usize> = lines
                    .next()
                    .unwrap()
                    .split_whitespace()
                    .map(|n| n.parse().unwrap())
                    .collect();
                (gate[0], gate[1], gate[2])
            })
            .collect();
        let symbols = lines.map(str::to_string).collect();

        ParsedAiger {
            max_var,
            inputs,
            outputs,
            gates,
            symbols,
        }
    }

    fn simulate(&self, input_bits: &[bool]) -> Vec<bool> {
        let mut values = vec![false; self.max_var + 1];
        for (&lit, &bit) in self.inputs.iter().zip(input_bits) {
            values[lit / 2] = bit;
        }
        let read = |values: &[bool], lit: usize| values[lit / 2] ^ (lit & 1 == 1);
        for &(lhs, rhs0, rhs1) in &self.gates {
            values[lhs / 2] = read(&values, rhs0) && read(&values, rhs1);
        }
        self.outputs.iter().map(|&lit| read(&values, lit)).collect()
    }
}

/// A parsed DIMACS CNF file.
struct ParsedCnf {
    variables: usize,
    clauses: Vec<Vec<i64>>,
    comments: Vec<String>,
}

impl ParsedCnf {
    fn read(path: &Path) -> ParsedCnf {
        let text = fs::read_to_string(path).unwrap();
        let mut comments = Vec::new();
        let mut header = None;
        let mut clauses = Vec::new();
        for line in text.lines() {
            if let Some(comment) = line.strip_prefix('c') {
                assert!(header.is_none(), "comment after header");
                comments.push(comment.trim().to_string());
            } else if let Some(counts) = line.strip_prefix("p cnf ") {
                let counts: Vec<usize> =
                    counts.split_whitespace().map(|n| n.parse().unwrap()).collect();
                header = Some((counts[0], counts[1]));
            } else {
                let clause: Vec<i64> = line.split_whitespace().map(|n| n.parse().unwrap()).collect();
                assert_eq!(clause.last(), Some(&0), "unterminated clause {line}");
                clauses.push(clause[..clause.len() - 1].to_vec());
            }
        }

        let (variables, count) = header.unwrap();
        assert_eq!(clauses.len(), count);
        for literal in clauses.iter().flatten() {
            assert!(literal.unsigned_abs() as usize <= variables);
        }
        ParsedCnf {
            variables,
            clauses,
            comments,
        }
    }

    fn satisfiable(&self) -> bool {
        assert!(self.variables <= 16);
        (0u32..1 << self.variables).any(|model| {
            self.clauses.iter().all(|clause| {
                clause.iter().any(|&literal| {
                    let value = model >> (literal.unsigned_abs() - 1) & 1 == 1;
                    value == (literal > 0)
                })
            })
        })
    }
}

fn bits_of(value: u64, width: u32) -> impl Iterator<Item = bool> {
    (0..width).map(move |bit| value >> bit & 1 == 1)
}

fn value_of(bits: &[bool]) -> u64 {
    bits.iter()
        .enumerate()
        .fold(0, |acc, (bit, &set)| acc | (u64::from(set) << bit))
}

#[test]
fn test_aiger_matches_term_evaluation() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mix.aag");

    let session = SymbolicSession::new();
    let a = session.fresh_named::<I8>("a", 0);
    let b = session.fresh_named::<I8>("b", 0);
    let product = session.mul(a, b);
    let shifted = session.ashr(a, session.lit::<I8>(1));
    let quotient = session.udiv(a, b);
    let out = session.xor(session.add(product, shifted), quotient);
    let less = session.slt(a, b);

    let spec = OutputSpec::single(out).with(less);
    session.write_aiger(&path, &spec, &InputOrdering::explicit([a, b]))?;

    let aiger = ParsedAiger::read(&path);
    assert_eq!(aiger.inputs.len(), 16);
    assert_eq!(aiger.outputs.len(), 9);
    assert!(aiger.symbols.contains(&"i0 a[0]".to_string()));
    assert!(aiger.symbols.contains(&"i15 b[7]".to_string()));
    assert!(aiger.symbols.contains(&"o8 out1".to_string()));

    for (x, y) in [(0i8, 0i8), (3, 5), (-7, 2), (127, -128), (-1, 0), (100, 9)] {
        let assignment = Assignment::new().bind(a, x).bind(b, y);
        let expected = session.evaluate(out, &assignment)?;
        let expected_less = session.evaluate(less, &assignment)?;

        let input_bits: Vec<bool> = bits_of(x as u8 as u64, 8)
            .chain(bits_of(y as u8 as u64, 8))
            .collect();
        let outputs = aiger.simulate(&input_bits);
        assert_eq!(value_of(&outputs[..8]) as u8 as i8, expected, "{x} {y}");
        assert_eq!(outputs[8], expected_less, "{x} {y}");
    }
    Ok(())
}

#[test]
fn test_gates_read_smaller_literals() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("order.aag");

    let session = SymbolicSession::new();
    let x = session.fresh_i32(0);
    let y = session.fresh_i32(0);
    let out = session.urem(session.mul(x, y), session.sub(y, x));
    session.write_aiger_outputs(&path, &[out], &InputOrdering::Inferred)?;

    let aiger = ParsedAiger::read(&path);
    assert_eq!(aiger.inputs, (1..=64).map(|var| 2 * var).collect::<Vec<_>>());
    for (index, &(lhs, rhs0, rhs1)) in aiger.gates.iter().enumerate() {
        assert_eq!(lhs, 2 * (65 + index));
        assert!(lhs > rhs0 && rhs0 >= rhs1);
    }
    Ok(())
}

#[test]
fn test_explicit_order_and_free_inputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("order.aag");

    let session = SymbolicSession::new();
    let p = session.fresh_named::<Bool>("p", false);
    let q = session.fresh_named::<Bool>("q", false);
    let unused = session.fresh_named::<Bool>("unused", false);
    let out = session.and(p, q);

    let ordering = InputOrdering::explicit([q, unused, p]);
    session.write_aiger_outputs(&path, &[out], &ordering)?;

    let aiger = ParsedAiger::read(&path);
    assert_eq!(aiger.inputs.len(), 3);
    assert_eq!(&aiger.symbols[..3], &["i0 q", "i1 unused", "i2 p"]);
    assert_eq!(aiger.simulate(&[true, false, true]), vec![true]);
    assert_eq!(aiger.simulate(&[true, true, false]), vec![false]);
    Ok(())
}

#[test]
fn test_constant_output_with_no_inputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("const.aag");

    let session = SymbolicSession::new();
    let five = session.lit::<I8>(5);
    session.write_aiger(&path, &OutputSpec::single(five), &InputOrdering::Explicit(Vec::new()))?;

    let text = fs::read_to_string(&path)?;
    assert!(text.starts_with("aag 0 0 0 8 0\n1\n0\n1\n0\n0\n"));
    Ok(())
}

#[test]
fn test_binary_and_minimal_formats() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let binary = dir.path().join("out.aig");
    let minimal = dir.path().join("out.aag");

    let export = ExportConfig::new().with_aiger_format(AigerFormat::Binary);
    let session = SymbolicSession::with_config(SessionConfig::new().with_export(export));
    let x = session.fresh_i8(0);
    let out = session.add(x, session.lit::<I8>(1));
    session.write_aiger_outputs(&binary, &[out], &InputOrdering::Inferred)?;
    assert!(fs::read(&binary)?.starts_with(b"aig "));

    let session = SymbolicSession::with_config(SessionConfig::new().with_export(ExportConfig::minimal()));
    let x = session.fresh_i8(0);
    let out = session.add(x, session.lit::<I8>(1));
    session.write_aiger_outputs(&minimal, &[out], &InputOrdering::Inferred)?;
    let aiger = ParsedAiger::read(&minimal);
    assert!(aiger.symbols.is_empty());
    Ok(())
}

#[test]
fn test_aiger_contract_violations() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.aag");

    let session = SymbolicSession::new();
    let x = session.fresh_i32(0);
    let y = session.fresh_i32(0);
    let sum = session.add(x, y);

    match session.write_aiger_outputs(&path, &[sum], &InputOrdering::explicit([x])) {
        Err(Error::DependencyNotCovered { uncovered }) => assert_eq!(uncovered, vec![y.id()]),
        other => panic!("unexpected {other:?}"),
    }

    let invalid = [
        (OutputSpec::Sequence(Vec::new()), InputOrdering::Inferred),
        (OutputSpec::single(sum), InputOrdering::explicit([x, y, x])),
        (OutputSpec::single(sum), InputOrdering::explicit([x, y, sum])),
    ];
    for (outputs, inputs) in &invalid {
        assert!(matches!(
            session.write_aiger(&path, outputs, inputs),
            Err(Error::InvalidArgument { .. })
        ));
    }
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_rejected_export_keeps_existing_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("keep.aag");
    fs::write(&path, "previous contents")?;

    let session = SymbolicSession::new();
    let x = session.fresh_i64(0);
    let y = session.fresh_i64(0);
    let out = session.mul(x, y);

    assert!(session
        .write_aiger_outputs(&path, &[out], &InputOrdering::explicit([y]))
        .is_err());
    assert!(session.write_cnf(&path, &OutputSpec::single(out)).is_err());
    assert_eq!(fs::read_to_string(&path)?, "previous contents");

    session.write_aiger_outputs(&path, &[out], &InputOrdering::Inferred)?;
    assert!(fs::read_to_string(&path)?.starts_with("aag "));
    Ok(())
}

#[test]
fn test_unwritable_path_is_file_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.cnf");

    let session = SymbolicSession::new();
    let flag = session.fresh_bool(false);
    assert!(matches!(
        session.write_cnf_bool(&path, flag),
        Err(Error::FileError(_))
    ));
}

#[test]
fn test_cnf_of_tautology_is_unsatisfiable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("implies.cnf");

    let session = SymbolicSession::new();
    let x = session.fresh_named::<Bool>("x", false);
    let y = session.fresh_named::<Bool>("y", false);
    // (x & y) -> x
    let claim = session.or(session.not(session.and(x, y)), x);
    session.write_cnf_bool(&path, claim)?;

    let cnf = ParsedCnf::read(&path);
    assert_eq!(cnf.variables, 4);
    assert_eq!(cnf.clauses.last().map(Vec::len), Some(1));
    assert!(cnf.comments.iter().any(|c| c == "1 x"));
    assert!(!cnf.satisfiable());
    Ok(())
}

#[test]
fn test_cnf_of_falsifiable_claim_is_satisfiable() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("eq.cnf");

    let session = SymbolicSession::new();
    let x = session.fresh_bool(false);
    let y = session.fresh_bool(false);
    session.write_cnf_bool(&path, session.eq(x, y))?;

    let cnf = ParsedCnf::read(&path);
    assert!(cnf.satisfiable());
    Ok(())
}

#[test]
fn test_cnf_of_folded_outputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let always = dir.path().join("always.cnf");
    let never = dir.path().join("never.cnf");

    let session = SymbolicSession::new();
    let x = session.fresh_bool(false);
    session.write_cnf_bool(&always, session.or(x, session.not(x)))?;
    session.write_cnf_bool(&never, session.and(x, session.not(x)))?;

    assert!(fs::read_to_string(&always)?.ends_with("p cnf 1 1\n0\n"));
    assert!(fs::read_to_string(&never)?.ends_with("p cnf 1 0\n"));
    assert!(!ParsedCnf::read(&always).satisfiable());
    assert!(ParsedCnf::read(&never).satisfiable());
    Ok(())
}

#[test]
fn test_cnf_rejects_non_boolean_and_sequences() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bad.cnf");

    let session = SymbolicSession::new();
    let x = session.fresh_i8(0);
    let flag = session.fresh_bool(false);

    let specs = [
        OutputSpec::single(x),
        OutputSpec::single(flag).with(flag),
        OutputSpec::Sequence(Vec::new()),
    ];
    for spec in &specs {
        assert!(matches!(
            session.write_cnf(&path, spec),
            Err(Error::InvalidArgument { .. })
        ));
    }
    assert!(!path.exists());
    Ok(())
}
