//! Static disassembler (spec §4.6): walks a code segment from offset zero
//! and renders one line per instruction, skipping runs of zero bytes
//! between them.
//!
//! Grounded on the teacher's `fuel-asm` `Instruction::Display` impl, adapted
//! to this system's closed operand alphabet instead of generic registers.

use std::fmt::Write as _;

use crate::asm::{self, Operands};
use crate::codec::{Cursor, Endianness};

/// Disassemble `code`, one `"[PC: %04x] <mnemonic> <operand repr>"` line per
/// instruction. `order` should match the program's protocol version; a
/// malformed tail simply stops the walk rather than panicking, since static
/// disassembly has no error channel to report through.
pub fn disassemble(code: &[u8], order: Endianness) -> String {
    let mut out = String::new();
    let mut cursor = Cursor::new(code, 0);

    while skip_zero_run(&mut cursor) {
        let start = cursor.position();
        let instruction = match asm::decode(&mut cursor, order) {
            Ok(instruction) => instruction,
            Err(_) => break,
        };
        let _ = writeln!(
            out,
            "[PC: {:04x}] {} {}",
            start,
            instruction.opcode.mnemonic(),
            operand_repr(instruction.operands)
        );
    }

    out
}

/// Advance past consecutive zero bytes (padding between instructions).
/// Returns `false` once the cursor reaches the end of the code.
fn skip_zero_run(cursor: &mut Cursor<'_>) -> bool {
    loop {
        if cursor.position() >= cursor.len() {
            return false;
        }
        let byte = cursor.read_bytes(1).expect("position checked above")[0];
        if byte != 0 {
            cursor.set_position(cursor.position() - 1);
            return true;
        }
    }
}

fn operand_repr(operands: Operands) -> String {
    match operands {
        Operands::None => String::new(),
        Operands::Value(v) => format!("{v}"),
        Operands::DataAddr(a) => format!("@{a}"),
        Operands::DataAddrValue(a, v) => format!("@{a} {v}"),
        Operands::DataAddr2(a, b) => format!("@{a} @{b}"),
        Operands::DataAddr3(a, b, c) => format!("@{a} @{b} @{c}"),
        Operands::DataAddrOffset(a, offset) => format!("@{a} {offset}"),
        Operands::DataAddr2Offset(a, b, offset) => format!("@{a} @{b} {offset}"),
        Operands::CodeAddr(addr) => format!("${addr:04x}"),
        Operands::FuncCode(func) => format!("{func:#06x}"),
        Operands::FuncCodeDataAddr1(func, a) => format!("{func:#06x} @{a}"),
        Operands::FuncCodeDataAddr2(func, a, b) => format!("{func:#06x} @{a} @{b}"),
        Operands::FuncCodeDataAddr3(func, a, b, c) => format!("{func:#06x} @{a} @{b} @{c}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::OpCode;

    #[test]
    fn disassembles_set_val_then_fin() {
        let mut code = vec![OpCode::SetVal as u8];
        code.extend_from_slice(&1u32.to_be_bytes());
        code.extend_from_slice(&42u64.to_be_bytes());
        code.push(OpCode::Fin as u8);

        let text = disassemble(&code, Endianness::Big);
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "[PC: 0000] SET_VAL @1 42");
        assert_eq!(lines.next().unwrap(), "[PC: 000d] FIN");
        assert!(lines.next().is_none());
    }

    #[test]
    fn skips_zero_padding_between_instructions() {
        let mut code = vec![OpCode::Nop as u8, 0, 0, 0];
        code.push(OpCode::Fin as u8);

        let text = disassemble(&code, Endianness::Big);
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "[PC: 0000] NOP");
        assert_eq!(lines.next().unwrap(), "[PC: 0004] FIN");
        assert!(lines.next().is_none());
    }

    #[test]
    fn stops_cleanly_on_truncated_tail() {
        let code = vec![OpCode::SetVal as u8, 0, 0, 0, 1];
        let text = disassemble(&code, Endianness::Big);
        assert!(text.is_empty());
    }

    #[test]
    fn branch_shows_signed_offset_and_code_addr_is_hex() {
        let mut code = vec![OpCode::Bzr as u8];
        code.extend_from_slice(&3u32.to_be_bytes());
        code.push((-2i8) as u8);
        code.push(OpCode::JmpAdr as u8);
        code.extend_from_slice(&0x10u32.to_be_bytes());

        let text = disassemble(&code, Endianness::Big);
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "[PC: 0000] BZR @3 -2");
        assert_eq!(lines.next().unwrap(), "[PC: 0006] JMP_ADR $0010");
    }
}
