//! A/B register access function codes (spec §4.3, `0x0100`–`0x012B`).

use crate::address;
use crate::consts::REGISTER_BLOCK_WORDS;
use crate::error::PanicReason;
use crate::state::{MachineState, RegisterBlock};

/// Read a 256-bit block directly from `data[addr..addr+4 cells)`.
fn read_block_direct(state: &MachineState, addr: u32) -> Result<RegisterBlock, PanicReason> {
    address::validate_data_address_range(addr, REGISTER_BLOCK_WORDS as u32, state.data.len())?;
    let mut block = [0u64; REGISTER_BLOCK_WORDS];
    for (i, word) in block.iter_mut().enumerate() {
        *word = state.read_cell(addr + i as u32)?;
    }
    Ok(block)
}

/// Write a 256-bit block directly into `data[addr..addr+4 cells)`.
fn write_block_direct(state: &mut MachineState, addr: u32, block: RegisterBlock) -> Result<(), PanicReason> {
    address::validate_data_address_range(addr, REGISTER_BLOCK_WORDS as u32, state.data.len())?;
    for (i, word) in block.into_iter().enumerate() {
        state.write_cell(addr + i as u32, word)?;
    }
    Ok(())
}

/// `GET_A_DAT` / `GET_B_DAT`: copy the register block from `data[addr..]`.
pub fn get_dat(state: &mut MachineState, addr: u32, is_a: bool) -> Result<(), PanicReason> {
    let block = read_block_direct(state, addr)?;
    if is_a {
        state.reg_a = block;
    } else {
        state.reg_b = block;
    }
    Ok(())
}

/// `GET_A_IND` / `GET_B_IND`: `addr` holds a pointer to the source block.
pub fn get_ind(state: &mut MachineState, addr: u32, is_a: bool) -> Result<(), PanicReason> {
    let pointer = u32::try_from(state.read_cell(addr)?).map_err(|_| PanicReason::InvalidAddress)?;
    get_dat(state, pointer, is_a)
}

/// `SET_A_DAT` / `SET_B_DAT`: copy the register block into `data[addr..]`.
pub fn set_dat(state: &mut MachineState, addr: u32, is_a: bool) -> Result<(), PanicReason> {
    let block = if is_a { state.reg_a } else { state.reg_b };
    write_block_direct(state, addr, block)
}

/// `SET_A_IND` / `SET_B_IND`: `addr` holds a pointer to the destination block.
pub fn set_ind(state: &mut MachineState, addr: u32, is_a: bool) -> Result<(), PanicReason> {
    let pointer = u32::try_from(state.read_cell(addr)?).map_err(|_| PanicReason::InvalidAddress)?;
    set_dat(state, pointer, is_a)
}

/// `GET_A1..GET_B4`: return a single register word.
pub fn get_word(state: &MachineState, is_a: bool, index: u8) -> u64 {
    let block = if is_a { &state.reg_a } else { &state.reg_b };
    block[index as usize]
}

/// `SET_A1..SET_B4`: write one register word, sourced from `data[addr]`.
pub fn set_word(state: &mut MachineState, addr: u32, is_a: bool, index: u8) -> Result<(), PanicReason> {
    let value = state.read_cell(addr)?;
    let block = if is_a { &mut state.reg_a } else { &mut state.reg_b };
    block[index as usize] = value;
    Ok(())
}

pub fn clear(state: &mut MachineState, is_a: bool) {
    if is_a {
        state.reg_a = [0; REGISTER_BLOCK_WORDS];
    } else {
        state.reg_b = [0; REGISTER_BLOCK_WORDS];
    }
}

pub fn copy_a_from_b(state: &mut MachineState) {
    state.reg_a = state.reg_b;
}

pub fn swap(state: &mut MachineState) {
    std::mem::swap(&mut state.reg_a, &mut state.reg_b);
}

pub fn or_with_b(state: &mut MachineState) {
    for i in 0..REGISTER_BLOCK_WORDS {
        state.reg_a[i] |= state.reg_b[i];
    }
}

pub fn and_with_b(state: &mut MachineState) {
    for i in 0..REGISTER_BLOCK_WORDS {
        state.reg_a[i] &= state.reg_b[i];
    }
}

pub fn xor_with_b(state: &mut MachineState) {
    for i in 0..REGISTER_BLOCK_WORDS {
        state.reg_a[i] ^= state.reg_b[i];
    }
}

pub fn check_is_zero(state: &MachineState, is_a: bool) -> u64 {
    let block = if is_a { &state.reg_a } else { &state.reg_b };
    u64::from(block.iter().all(|w| *w == 0))
}

pub fn check_a_equals_b(state: &MachineState) -> u64 {
    u64::from(state.reg_a == state.reg_b)
}

/// `UNSIGNED_COMPARE_A_WITH_B`: returns -1/0/1 as a `u64` two's-complement
/// value.
///
/// Reproduces the source's self-comparison quirk (spec §9 open question i):
/// it compares `a3` against `a3` and `a4` against `a4`, never touching B3/B4.
/// Preserved exactly, bug and all, because consensus depends on it.
pub fn unsigned_compare_a_with_b(state: &MachineState) -> u64 {
    compare_quirk(state, false)
}

/// `SIGNED_COMPARE_A_WITH_B`: signed counterpart of the same quirk.
pub fn signed_compare_a_with_b(state: &MachineState) -> u64 {
    compare_quirk(state, true)
}

fn compare_quirk(state: &MachineState, signed: bool) -> u64 {
    let a3 = state.reg_a[2];
    let a4 = state.reg_a[3];
    let ordering = if signed {
        (a3 as i64, a4 as i64).cmp(&(a3 as i64, a4 as i64))
    } else {
        (a3, a4).cmp(&(a3, a4))
    };
    match ordering {
        std::cmp::Ordering::Less => (-1i64) as u64,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Flags, Header, Version};

    fn sample() -> MachineState {
        let header = Header {
            version: Version::V2,
            reserved: 0,
            num_code_pages: 1,
            num_data_pages: 4,
            num_call_stack_pages: 1,
            num_user_stack_pages: 1,
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
            reg_a: [1, 2, 3, 4],
            reg_b: [5, 6, 7, 8],
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
    fn get_dat_copies_four_cells() {
        let mut state = sample();
        for i in 0..4 {
            state.write_cell(i, 100 + i as u64).unwrap();
        }
        get_dat(&mut state, 0, true).unwrap();
        assert_eq!(state.reg_a, [100, 101, 102, 103]);
    }

    #[test]
    fn self_comparison_quirk_always_reports_equal() {
        let state = sample();
        assert_eq!(unsigned_compare_a_with_b(&state), 0);
        assert_eq!(signed_compare_a_with_b(&state), 0);
    }

    #[test]
    fn swap_exchanges_blocks() {
        let mut state = sample();
        swap(&mut state);
        assert_eq!(state.reg_a, [5, 6, 7, 8]);
        assert_eq!(state.reg_b, [1, 2, 3, 4]);
    }
}
