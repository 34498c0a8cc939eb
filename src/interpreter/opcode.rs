//! One-byte opcode executor (spec §4.2): arithmetic, bitwise, data move,
//! branch, stack, and program-control semantics.
//!
//! Grounded on `fuel-vm/src/interpreter/alu.rs`'s wrapping-arithmetic
//! helpers and `fuel-vm/src/interpreter/internal.rs`'s branch/jump
//! plumbing, adapted to this system's single-word data cells instead of a
//! general-purpose register file.

use crate::asm::{Instruction, OpCode, Operands};
use crate::codec::Cursor;
use crate::consts::NO_ERROR_ADDRESS;
use crate::error::PanicReason;
use crate::state::{Flags, MachineState};

/// Execute one already-decoded instruction, advancing `cursor` for any
/// branch/jump (the caller re-syncs `state.pc` from `cursor` afterward,
/// per spec §4.4 step 6).
///
/// Returns `Ok(true)` if the opcode requested the EXT_FUN dispatcher be
/// invoked separately (the caller does so, since it alone holds the host
/// reference); `Ok(false)` otherwise.
pub fn execute(
    state: &mut MachineState,
    cursor: &mut Cursor,
    instruction: Instruction,
) -> Result<bool, PanicReason> {
    match (instruction.opcode, instruction.operands) {
        (OpCode::Nop, Operands::None) => {}

        (OpCode::SetVal, Operands::DataAddrValue(addr, value)) => state.write_cell(addr, value)?,
        (OpCode::SetDat, Operands::DataAddr2(dst, src)) => {
            let value = state.read_cell(src)?;
            state.write_cell(dst, value)?;
        }
        (OpCode::ClrDat, Operands::DataAddr(addr)) => state.write_cell(addr, 0)?,
        // SET_IND @a,@b: `a` is the direct destination; `b` holds a pointer
        // to the source cell. `data[a] = data[*b]` (spec §8 scenario 5).
        (OpCode::SetInd, Operands::DataAddr2(dst, src_ptr)) => {
            let src = cell_as_addr(state.read_cell(src_ptr)?)?;
            let value = state.read_cell(src)?;
            state.write_cell(dst, value)?;
        }
        // SET_IDX @a,@b,@c: `a` is the direct destination; `data[b] +
        // data[c]` is the indexed source cell. `data[a] = data[src]`.
        (OpCode::SetIdx, Operands::DataAddr3(dst, base_ptr, offset_ptr)) => {
            let src = indexed_addr(state, base_ptr, offset_ptr)?;
            let value = state.read_cell(src)?;
            state.write_cell(dst, value)?;
        }
        // IND_DAT @a,@b: `a` holds a pointer to the destination cell; `b` is
        // the direct source. `data[*a] = data[b]`.
        (OpCode::IndDat, Operands::DataAddr2(dst_ptr, src)) => {
            let value = state.read_cell(src)?;
            let dst = cell_as_addr(state.read_cell(dst_ptr)?)?;
            state.write_cell(dst, value)?;
        }
        // IDX_DAT @a,@b,@c: `data[a] + data[b]` is the indexed destination
        // cell; `c` is the direct source. `data[dst] = data[c]`.
        (OpCode::IdxDat, Operands::DataAddr3(base_ptr, offset_ptr, src)) => {
            let value = state.read_cell(src)?;
            let dst = indexed_addr(state, base_ptr, offset_ptr)?;
            state.write_cell(dst, value)?;
        }

        (OpCode::IncDat, Operands::DataAddr(addr)) => {
            let v = state.read_cell(addr)?;
            state.write_cell(addr, v.wrapping_add(1))?;
        }
        (OpCode::DecDat, Operands::DataAddr(addr)) => {
            let v = state.read_cell(addr)?;
            state.write_cell(addr, v.wrapping_sub(1))?;
        }
        (OpCode::AddDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, u64::wrapping_add)?,
        (OpCode::SubDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, u64::wrapping_sub)?,
        (OpCode::MulDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, u64::wrapping_mul)?,
        (OpCode::DivDat, Operands::DataAddr2(dst, src)) => {
            let divisor = state.read_cell(src)?;
            if divisor == 0 {
                return Err(PanicReason::Arithmetic);
            }
            let dividend = state.read_cell(dst)?;
            state.write_cell(dst, dividend.wrapping_div(divisor))?;
        }
        (OpCode::ModDat, Operands::DataAddr2(dst, src)) => {
            let divisor = state.read_cell(src)?;
            if divisor == 0 {
                return Err(PanicReason::Arithmetic);
            }
            let dividend = state.read_cell(dst)?;
            state.write_cell(dst, dividend.wrapping_rem(divisor))?;
        }

        (OpCode::BorDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, |a, b| a | b)?,
        (OpCode::AndDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, |a, b| a & b)?,
        (OpCode::XorDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, |a, b| a ^ b)?,
        (OpCode::NotDat, Operands::DataAddr(addr)) => {
            let v = state.read_cell(addr)?;
            state.write_cell(addr, !v)?;
        }
        (OpCode::ShlDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, shift_left)?,
        (OpCode::ShrDat, Operands::DataAddr2(dst, src)) => binop(state, dst, src, shift_right)?,

        (OpCode::Bzr, Operands::DataAddrOffset(addr, offset)) => {
            if state.read_cell(addr)? == 0 {
                branch(cursor, instruction.opcode_start, offset)?;
            }
        }
        (OpCode::Bnz, Operands::DataAddrOffset(addr, offset)) => {
            if state.read_cell(addr)? != 0 {
                branch(cursor, instruction.opcode_start, offset)?;
            }
        }
        (OpCode::Bgt, Operands::DataAddr2Offset(a, b, offset)) => {
            branch_if(cursor, instruction.opcode_start, offset, state, a, b, |x, y| x > y)?
        }
        (OpCode::Blt, Operands::DataAddr2Offset(a, b, offset)) => {
            branch_if(cursor, instruction.opcode_start, offset, state, a, b, |x, y| x < y)?
        }
        (OpCode::Bge, Operands::DataAddr2Offset(a, b, offset)) => {
            branch_if(cursor, instruction.opcode_start, offset, state, a, b, |x, y| x >= y)?
        }
        (OpCode::Ble, Operands::DataAddr2Offset(a, b, offset)) => {
            branch_if(cursor, instruction.opcode_start, offset, state, a, b, |x, y| x <= y)?
        }
        (OpCode::Beq, Operands::DataAddr2Offset(a, b, offset)) => {
            branch_if(cursor, instruction.opcode_start, offset, state, a, b, |x, y| x == y)?
        }
        (OpCode::Bne, Operands::DataAddr2Offset(a, b, offset)) => {
            branch_if(cursor, instruction.opcode_start, offset, state, a, b, |x, y| x != y)?
        }

        (OpCode::PshDat, Operands::DataAddr(addr)) => {
            let value = state.read_cell(addr)?;
            state.push_user(value)?;
        }
        (OpCode::PopDat, Operands::DataAddr(addr)) => {
            let value = state.pop_user()?;
            state.write_cell(addr, value)?;
        }
        (OpCode::JmpAdr, Operands::CodeAddr(addr)) => {
            let target = crate::address::validate_code_address(addr, state.code.len())?;
            cursor.set_position(target);
        }
        (OpCode::JmpSub, Operands::CodeAddr(addr)) => {
            let return_addr = u32::try_from(cursor.position()).map_err(|_| PanicReason::CodeSegment)?;
            state.push_call(return_addr)?;
            let target = crate::address::validate_code_address(addr, state.code.len())?;
            cursor.set_position(target);
        }
        (OpCode::RetSub, Operands::None) => {
            let addr = state.pop_call()?;
            let target = crate::address::validate_code_address(addr, state.code.len())?;
            cursor.set_position(target);
        }

        (OpCode::Slp, Operands::None) => state.flags.insert(Flags::IS_SLEEPING),
        (OpCode::SlpDat, Operands::DataAddr(addr)) => {
            let height = u32::try_from(state.read_cell(addr)?).map_err(|_| PanicReason::InvalidAddress)?;
            state.flags.insert(Flags::IS_SLEEPING);
            state.sleep_until_height = Some(height);
        }
        (OpCode::Stp, Operands::None) => state.flags.insert(Flags::IS_STOPPED),
        (OpCode::Stz, Operands::DataAddr(addr)) => {
            if state.read_cell(addr)? == 0 {
                state.flags.insert(Flags::IS_STOPPED);
            }
        }
        (OpCode::Fin, Operands::None) => state.flags.insert(Flags::IS_FINISHED),
        (OpCode::Fiz, Operands::DataAddr(addr)) => {
            if state.read_cell(addr)? == 0 {
                state.flags.insert(Flags::IS_FINISHED);
            }
        }
        (OpCode::Err, Operands::CodeAddr(addr)) => {
            if addr == NO_ERROR_ADDRESS {
                state.on_error_address = None;
            } else {
                crate::address::validate_code_address(addr, state.code.len())?;
                state.on_error_address = Some(addr);
            }
        }
        (OpCode::SetPcs, Operands::None) => {
            state.on_stop_address =
                u32::try_from(cursor.position()).map_err(|_| PanicReason::CodeSegment)?;
        }

        (
            OpCode::ExtFun
            | OpCode::ExtFunDat
            | OpCode::ExtFunDat2
            | OpCode::ExtFunRet
            | OpCode::ExtFunRetDat
            | OpCode::ExtFunRetDat2,
            _,
        ) => return Ok(true),

        _ => return Err(PanicReason::IllegalOperation),
    }

    Ok(false)
}

fn cell_as_addr(value: u64) -> Result<u32, PanicReason> {
    u32::try_from(value).map_err(|_| PanicReason::InvalidAddress)
}

fn indexed_addr(state: &MachineState, base_ptr: u32, offset_ptr: u32) -> Result<u32, PanicReason> {
    let base = cell_as_addr(state.read_cell(base_ptr)?)?;
    let offset = cell_as_addr(state.read_cell(offset_ptr)?)?;
    base.checked_add(offset).ok_or(PanicReason::InvalidAddress)
}

fn binop(
    state: &mut MachineState,
    dst: u32,
    src: u32,
    f: impl FnOnce(u64, u64) -> u64,
) -> Result<(), PanicReason> {
    let a = state.read_cell(dst)?;
    let b = state.read_cell(src)?;
    state.write_cell(dst, f(a, b))
}

/// Unsigned 64-bit left shift with shift-count ≥ 64 yielding zero (spec §4.1).
fn shift_left(value: u64, shift: u64) -> u64 {
    if shift >= 64 {
        0
    } else {
        value << shift
    }
}

/// Logical (non-arithmetic) right shift, same zero-on-overflow rule.
fn shift_right(value: u64, shift: u64) -> u64 {
    if shift >= 64 {
        0
    } else {
        value >> shift
    }
}

/// Jump relative to the start of the branch opcode, not the post-decode
/// cursor position (spec §4.1).
fn branch(cursor: &mut Cursor, opcode_start: u32, offset: i8) -> Result<(), PanicReason> {
    let target = (opcode_start as i64)
        .checked_add(offset as i64)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(PanicReason::InvalidAddress)?;
    if target > cursor.len() {
        return Err(PanicReason::InvalidAddress);
    }
    cursor.set_position(target);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn branch_if(
    cursor: &mut Cursor,
    opcode_start: u32,
    offset: i8,
    state: &MachineState,
    a: u32,
    b: u32,
    cond: impl FnOnce(u64, u64) -> bool,
) -> Result<(), PanicReason> {
    let x = state.read_cell(a)?;
    let y = state.read_cell(b)?;
    if cond(x, y) {
        branch(cursor, opcode_start, offset)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::decode;
    use crate::codec::Endianness;
    use crate::state::{Header, Version};

    fn sample_state(code_len: usize, data_cells: usize) -> MachineState {
        let header = Header {
            version: Version::V2,
            reserved: 0,
            num_code_pages: code_len as u16,
            num_data_pages: data_cells as u16,
            num_call_stack_pages: 4,
            num_user_stack_pages: 4,
            min_activation_amount: 0,
        };
        MachineState {
            code: vec![0u8; header.code_len()].into_boxed_slice(),
            data: vec![0u8; header.data_len()].into_boxed_slice(),
            call_stack: Vec::new(),
            user_stack: Vec::new(),
            pc: 0,
            on_stop_address: 0,
            on_error_address: None,
            reg_a: [0; 4],
            reg_b: [0; 4],
            current_balance: 0,
            previous_balance: 0,
            steps: 0,
            current_block_height: 0,
            sleep_until_height: None,
            frozen_balance: None,
            flags: Flags::empty(),
            is_first_opcode_after_sleeping: false,
            header,
        }
    }

    #[test]
    fn set_val_writes_cell() {
        let mut state = sample_state(16, 4);
        let mut bytes = vec![OpCode::SetVal as u8];
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&2222u64.to_be_bytes());
        let mut cursor = Cursor::new(&bytes, 0);
        let inst = decode(&mut cursor, Endianness::Big).unwrap();
        execute(&mut state, &mut cursor, inst).unwrap();
        assert_eq!(state.read_cell(2).unwrap(), 2222);
    }

    #[test]
    fn inc_dat_wraps_on_overflow() {
        let mut state = sample_state(16, 4);
        state.write_cell(2, u64::MAX).unwrap();
        let bytes = [OpCode::IncDat as u8, 0, 0, 0, 2];
        let mut cursor = Cursor::new(&bytes, 0);
        let inst = decode(&mut cursor, Endianness::Big).unwrap();
        execute(&mut state, &mut cursor, inst).unwrap();
        assert_eq!(state.read_cell(2).unwrap(), 0);
    }

    #[test]
    fn div_dat_by_zero_raises_arithmetic() {
        let mut state = sample_state(16, 4);
        state.write_cell(3, 3333).unwrap();
        state.write_cell(0, 0).unwrap();
        let bytes = [OpCode::DivDat as u8, 0, 0, 0, 3, 0, 0, 0, 0];
        let mut cursor = Cursor::new(&bytes, 0);
        let inst = decode(&mut cursor, Endianness::Big).unwrap();
        assert_eq!(execute(&mut state, &mut cursor, inst), Err(PanicReason::Arithmetic));
    }

    #[test]
    fn shr_dat_is_logical_shift() {
        let mut state = sample_state(16, 4);
        state.write_cell(2, 2222).unwrap();
        state.write_cell(3, 3).unwrap();
        let bytes = [OpCode::ShrDat as u8, 0, 0, 0, 2, 0, 0, 0, 3];
        let mut cursor = Cursor::new(&bytes, 0);
        let inst = decode(&mut cursor, Endianness::Big).unwrap();
        execute(&mut state, &mut cursor, inst).unwrap();
        assert_eq!(state.read_cell(2).unwrap(), 2222 >> 3);
    }

    #[test]
    fn shift_at_or_above_64_yields_zero() {
        assert_eq!(shift_left(1, 64), 0);
        assert_eq!(shift_right(u64::MAX, 64), 0);
    }
}
