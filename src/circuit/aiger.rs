//! AIGER serialization.
//!
//! Writes the combinational subset of AIGER 1.9: header `M I L O A` with `L = 0`, one line
//! per input and output, the AND gates, an optional symbol table and an optional comment
//! section. The binary variant keeps outputs textual and stores each gate as two
//! delta-encoded 7-bit varints, which requires inputs on variables `1..=I` and every gate
//! reading strictly smaller literals. [`Aig`] guarantees both.

use std::io::{self, Write};

use crate::{
    circuit::aig::Aig,
    config::{AigerFormat, ExportFlags},
};

/// Serializes `aig` in the given format.
///
/// # Arguments
///
/// * `out` - The sink receiving the file contents.
/// * `aig` - The circuit to write.
/// * `format` - ASCII (`aag`) or binary (`aig`).
/// * `flags` - Which optional sections to emit.
/// * `comment` - Lines of the comment section, used with [`ExportFlags::HEADER_COMMENT`].
///
/// # Errors
///
/// Returns any error of `out`.
pub fn write_aiger<W: Write>(
    out: &mut W,
    aig: &Aig,
    format: AigerFormat,
    flags: ExportFlags,
    comment: &[String],
) -> io::Result<()> {
    let tag = match format {
        AigerFormat::Ascii => "aag",
        AigerFormat::Binary => "aig",
    };
    writeln!(
        out,
        "{tag} {} {} 0 {} {}",
        aig.max_var(),
        aig.num_inputs(),
        aig.num_outputs(),
        aig.num_ands()
    )?;

    match format {
        AigerFormat::Ascii => {
            for index in 0..aig.num_inputs() {
                writeln!(out, "{}", aig.input(index))?;
            }
            for output in aig.outputs() {
                writeln!(out, "{output}")?;
            }
            for (index, (rhs0, rhs1)) in aig.gates().iter().enumerate() {
                writeln!(out, "{} {rhs0} {rhs1}", aig.gate_lhs(index))?;
            }
        }
        AigerFormat::Binary => {
            for output in aig.outputs() {
                writeln!(out, "{output}")?;
            }
            for (index, (rhs0, rhs1)) in aig.gates().iter().enumerate() {
                let lhs = aig.gate_lhs(index).code();
                write_varint(out, lhs - rhs0.code())?;
                write_varint(out, rhs0.code() - rhs1.code())?;
            }
        }
    }

    if flags.contains(ExportFlags::INPUT_SYMBOLS) {
        for (index, name) in aig.input_names().iter().enumerate() {
            if let Some(name) = name {
                writeln!(out, "i{index} {name}")?;
            }
        }
    }
    if flags.contains(ExportFlags::OUTPUT_SYMBOLS) {
        for (index, name) in aig.output_names().iter().enumerate() {
            if let Some(name) = name {
                writeln!(out, "o{index} {name}")?;
            }
        }
    }
    if flags.contains(ExportFlags::HEADER_COMMENT) && !comment.is_empty() {
        writeln!(out, "c")?;
        for line in comment {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

/// Writes `value` as a little-endian base-128 varint.
fn write_varint<W: Write>(out: &mut W, mut value: usize) -> io::Result<()> {
    while value >= 0x80 {
        out.write_all(&[(value & 0x7F) as u8 | 0x80])?;
        value >>= 7;
    }
    out.write_all(&[value as u8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::aig::AigLit;

    fn half_adder() -> Aig {
        let mut aig = Aig::new(2);
        let (a, b) = (aig.input(0), aig.input(1));
        let sum = aig.xor(a, b);
        let carry = aig.and(a, b);
        aig.set_input_name(0, "a");
        aig.set_input_name(1, "b");
        aig.add_output(sum, Some("sum".into()));
        aig.add_output(carry, None);
        aig
    }

    #[test]
    fn test_ascii() {
        let mut out = Vec::new();
        let comment = vec!["half adder".to_string()];
        write_aiger(&mut out, &half_adder(), AigerFormat::Ascii, ExportFlags::all(), &comment)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        let expected = "aag 5 2 0 2 3\n2\n4\n10\n6\n6 4 2\n8 5 3\n10 9 7\ni0 a\ni1 b\no0 sum\nc\nhalf adder\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_binary() {
        let mut out = Vec::new();
        write_aiger(&mut out, &half_adder(), AigerFormat::Binary, ExportFlags::empty(), &[])
            .unwrap();

        let header = b"aig 5 2 0 2 3\n10\n6\n";
        assert_eq!(&out[..header.len()], header);
        // gates 6 = 4 & 2, 8 = 5 & 3, 10 = 9 & 7
        assert_eq!(&out[header.len()..], &[2u8, 2, 3, 2, 1, 2]);
    }

    #[test]
    fn test_constant_output() {
        let mut aig = Aig::new(0);
        aig.add_output(AigLit::TRUE, None);
        let mut out = Vec::new();
        write_aiger(&mut out, &aig, AigerFormat::Ascii, ExportFlags::all(), &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "aag 0 0 0 1 0\n1\n");
    }

    #[test]
    fn test_varint() {
        let mut out = Vec::new();
        write_varint(&mut out, 0x3FFF + 1).unwrap();
        assert_eq!(out, vec![0x80, 0x80, 0x01]);
    }
}
