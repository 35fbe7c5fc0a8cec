//! DIMACS CNF serialization.
//!
//! Produces a Tseitin encoding of "the output is false": every AND gate in the output's
//! cone gets the three defining clauses `(!g | a)`, `(!g | b)`, `(g | !a | !b)` and a unit
//! clause asserts the negated output. AIG variable `v` is DIMACS variable `v`, so circuit
//! inputs keep the numbers `1..=I`. A satisfying assignment is a counterexample; an
//! unsatisfiable formula proves the output is a tautology.
//!
//! Constant outputs need no variables: a constant-true output yields the empty clause, a
//! constant-false output yields no clause at all.

use std::{
    collections::HashSet,
    io::{self, Write},
};

use crate::{
    circuit::aig::{Aig, AigLit},
    config::ExportFlags,
};

/// Serializes the CNF asserting that `output` is false.
///
/// # Arguments
///
/// * `out` - The sink receiving the file contents.
/// * `aig` - The circuit containing `output`.
/// * `output` - The literal to negate.
/// * `flags` - [`ExportFlags::HEADER_COMMENT`] emits `comment` as `c` lines,
///   [`ExportFlags::INPUT_SYMBOLS`] lists the named inputs.
/// * `comment` - Free-form header lines.
///
/// # Errors
///
/// Returns any error of `out`.
pub fn write_cnf<W: Write>(
    out: &mut W,
    aig: &Aig,
    output: AigLit,
    flags: ExportFlags,
    comment: &[String],
) -> io::Result<()> {
    if flags.contains(ExportFlags::HEADER_COMMENT) {
        for line in comment {
            writeln!(out, "c {line}")?;
        }
    }
    if flags.contains(ExportFlags::INPUT_SYMBOLS) {
        for (index, name) in aig.input_names().iter().enumerate() {
            if let Some(name) = name {
                writeln!(out, "c {} {name}", index + 1)?;
            }
        }
    }

    if output == AigLit::TRUE {
        writeln!(out, "p cnf {} 1", aig.max_var())?;
        return writeln!(out, "0");
    }
    if output == AigLit::FALSE {
        return writeln!(out, "p cnf {} 0", aig.max_var());
    }

    let cone = gate_cone(aig, output);
    writeln!(out, "p cnf {} {}", aig.max_var(), cone.len() * 3 + 1)?;

    for var in cone {
        let Some((rhs0, rhs1)) = aig.gate_of(var) else {
            continue;
        };
        let g = dimacs(AigLit::var(var));
        let (a, b) = (dimacs(rhs0), dimacs(rhs1));
        writeln!(out, "{} {a} 0", -g)?;
        writeln!(out, "{} {b} 0", -g)?;
        writeln!(out, "{g} {} {} 0", -a, -b)?;
    }
    writeln!(out, "{} 0", -dimacs(output))
}

/// Returns the gate variables reachable from `root`, in ascending order.
fn gate_cone(aig: &Aig, root: AigLit) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut stack = vec![root.variable()];
    while let Some(var) = stack.pop() {
        let Some((rhs0, rhs1)) = aig.gate_of(var) else {
            continue;
        };
        if seen.insert(var) {
            stack.push(rhs0.variable());
            stack.push(rhs1.variable());
        }
    }
    let mut cone: Vec<usize> = seen.into_iter().collect();
    cone.sort_unstable();
    cone
}

/// Converts a non-constant literal into a signed DIMACS literal.
fn dimacs(lit: AigLit) -> i64 {
    let var = lit.variable() as i64;
    if lit.is_inverted() {
        -var
    } else {
        var
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(aig: &Aig, output: AigLit) -> String {
        let mut out = Vec::new();
        write_cnf(&mut out, aig, output, ExportFlags::empty(), &[]).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_gate() {
        let mut aig = Aig::new(2);
        let g = aig.and(aig.input(0), aig.input(1));
        assert_eq!(render(&aig, g), "p cnf 3 4\n-3 2 0\n-3 1 0\n3 -2 -1 0\n-3 0\n");
    }

    #[test]
    fn test_inverted_output() {
        let mut aig = Aig::new(2);
        let g = aig.or(aig.input(0), aig.input(1));
        // or(a, b) = !(!a & !b)
        assert_eq!(render(&aig, g), "p cnf 3 4\n-3 -2 0\n-3 -1 0\n3 2 1 0\n3 0\n");
    }

    #[test]
    fn test_input_output() {
        let aig = Aig::new(1);
        assert_eq!(render(&aig, aig.input(0)), "p cnf 1 1\n-1 0\n");
    }

    #[test]
    fn test_constants() {
        let aig = Aig::new(0);
        assert_eq!(render(&aig, AigLit::TRUE), "p cnf 0 1\n0\n");
        assert_eq!(render(&aig, AigLit::FALSE), "p cnf 0 0\n");
    }

    #[test]
    fn test_comments_precede_header() {
        let mut aig = Aig::new(1);
        aig.set_input_name(0, "flag");
        let mut out = Vec::new();
        let comment = vec!["generated".to_string()];
        write_cnf(&mut out, &aig, aig.input(0), ExportFlags::all(), &comment).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "c generated\nc 1 flag\np cnf 1 1\n-1 0\n");
    }
}
