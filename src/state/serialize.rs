//! Byte-exact serializer / restorer for persistent state (spec §4.5).
//!
//! Code bytes are invariant and stored separately by the host; they are
//! supplied to [`MachineState::from_state_bytes`] rather than round-tripped
//! here.

use super::{Flags, Header, MachineState, Version};
use crate::codec::{write_i32, write_i64, write_u32, write_u64, Cursor, Endianness};
use crate::consts::REGISTER_BLOCK_WORDS;
use crate::error::PanicReason;

impl MachineState {
    fn header_bytes(&self, order: Endianness) -> Vec<u8> {
        let mut out = Vec::with_capacity(14);
        let h = &self.header;
        write_u16_field(&mut out, h.version.as_raw(), order);
        write_u16_field(&mut out, h.reserved, order);
        write_u16_field(&mut out, h.num_code_pages, order);
        write_u16_field(&mut out, h.num_data_pages, order);
        write_u16_field(&mut out, h.num_call_stack_pages, order);
        write_u16_field(&mut out, h.num_user_stack_pages, order);
        if h.version.has_activation_amount() {
            write_u64(&mut out, h.min_activation_amount, order);
        }
        out
    }

    /// Serialize this machine's persistent (between-rounds) state, per
    /// spec §4.5. Code bytes are excluded; the host supplies them again on
    /// restore.
    pub fn to_state_bytes(&self) -> Vec<u8> {
        let order = self.header.version.endianness();
        let mut out = self.header_bytes(order);

        out.extend_from_slice(&self.data);

        write_u32(&mut out, self.call_stack.len() as u32, order);
        out.extend_from_slice(&self.call_stack);
        write_u32(&mut out, self.user_stack.len() as u32, order);
        out.extend_from_slice(&self.user_stack);

        write_i32(&mut out, self.pc as i32, order);
        write_i32(&mut out, self.on_stop_address as i32, order);

        if matches!(self.header.version, Version::V1) {
            // V1 omits previous_balance (spec §4.5).
        } else {
            write_i64(&mut out, self.previous_balance as i64, order);
        }

        write_u32(&mut out, flags_word(self), order);

        if let Some(addr) = self.on_error_address {
            write_i32(&mut out, addr as i32, order);
        }
        if let Some(height) = self.sleep_until_height {
            write_i32(&mut out, height as i32, order);
        }
        if let Some(balance) = self.frozen_balance {
            write_i64(&mut out, balance as i64, order);
        }
        if self.reg_a != [0; REGISTER_BLOCK_WORDS] {
            for word in self.reg_a {
                write_i64(&mut out, word as i64, order);
            }
        }
        if self.reg_b != [0; REGISTER_BLOCK_WORDS] {
            for word in self.reg_b {
                write_i64(&mut out, word as i64, order);
            }
        }

        out
    }

    /// Restore persistent state from bytes produced by [`Self::to_state_bytes`],
    /// re-supplying the invariant code segment.
    pub fn from_state_bytes(code: &[u8], bytes: &[u8]) -> Result<Self, PanicReason> {
        // Version 1 is the only little-endian wire format, and its version
        // field (the integer 1) is the only one whose first byte is nonzero;
        // every big-endian (V2+) version field starts with a zero high byte.
        // That lets the first byte alone disambiguate the format.
        let first_byte = *bytes.first().ok_or(PanicReason::CodeSegment)?;
        let order = if first_byte == 0 {
            Endianness::Big
        } else {
            Endianness::Little
        };

        let mut cursor = Cursor::new(bytes, 0);
        let raw_version = cursor.read_u16(order)?;
        let version = Version::from_raw(raw_version)?;
        let reserved = cursor.read_u16(order)?;
        let num_code_pages = cursor.read_u16(order)?;
        let num_data_pages = cursor.read_u16(order)?;
        let num_call_stack_pages = cursor.read_u16(order)?;
        let num_user_stack_pages = cursor.read_u16(order)?;
        let min_activation_amount = if version.has_activation_amount() {
            cursor.read_u64(order)?
        } else {
            0
        };

        let header = Header {
            version,
            reserved,
            num_code_pages,
            num_data_pages,
            num_call_stack_pages,
            num_user_stack_pages,
            min_activation_amount,
        };

        if code.len() != header.code_len() {
            return Err(PanicReason::InvalidAddress);
        }

        let data_len = header.data_len();
        let data = cursor
            .read_bytes(data_len)?
            .to_vec()
            .into_boxed_slice();

        let call_stack_len = cursor.read_u32(order)? as usize;
        let call_stack = cursor.read_bytes(call_stack_len)?.to_vec();
        let user_stack_len = cursor.read_u32(order)? as usize;
        let user_stack = cursor.read_bytes(user_stack_len)?.to_vec();

        let pc = cursor.read_u32(order)?;
        let on_stop_address = cursor.read_u32(order)?;

        let previous_balance = if matches!(version, Version::V1) {
            0
        } else {
            cursor.read_u64(order)?
        };

        let flags_raw = cursor.read_u32(order)?;
        let flags = Flags::from_bits_truncate(flags_raw);

        let on_error_address = if flags.contains(Flags::HAS_ON_ERROR_ADDRESS) {
            Some(cursor.read_u32(order)?)
        } else {
            None
        };
        let sleep_until_height = if flags.contains(Flags::HAS_SLEEP_UNTIL_HEIGHT) {
            Some(cursor.read_u32(order)?)
        } else {
            None
        };
        let frozen_balance = if flags.contains(Flags::HAS_FROZEN_BALANCE) {
            Some(cursor.read_u64(order)?)
        } else {
            None
        };
        let reg_a = if flags.contains(Flags::HAS_NON_ZERO_A) {
            read_register_block(&mut cursor, order)?
        } else {
            [0; REGISTER_BLOCK_WORDS]
        };
        let reg_b = if flags.contains(Flags::HAS_NON_ZERO_B) {
            read_register_block(&mut cursor, order)?
        } else {
            [0; REGISTER_BLOCK_WORDS]
        };

        Ok(MachineState {
            header,
            code: code.to_vec().into_boxed_slice(),
            data,
            call_stack,
            user_stack,
            pc,
            on_stop_address,
            on_error_address,
            reg_a,
            reg_b,
            current_balance: previous_balance,
            previous_balance,
            steps: 0,
            current_block_height: 0,
            sleep_until_height,
            frozen_balance,
            flags,
            is_first_opcode_after_sleeping: false,
        })
    }
}

fn write_u16_field(out: &mut Vec<u8>, value: u16, order: Endianness) {
    crate::codec::write_u16(out, value, order)
}

fn read_register_block(
    cursor: &mut Cursor,
    order: Endianness,
) -> Result<[u64; REGISTER_BLOCK_WORDS], PanicReason> {
    let mut block = [0u64; REGISTER_BLOCK_WORDS];
    for word in &mut block {
        *word = cursor.read_u64(order)?;
    }
    Ok(block)
}

fn flags_word(state: &MachineState) -> u32 {
    let mut flags = state.flags;
    flags.set(Flags::HAS_ON_ERROR_ADDRESS, state.on_error_address.is_some());
    flags.set(Flags::HAS_SLEEP_UNTIL_HEIGHT, state.sleep_until_height.is_some());
    flags.set(Flags::HAS_FROZEN_BALANCE, state.frozen_balance.is_some());
    flags.set(Flags::HAS_NON_ZERO_A, state.reg_a != [0; REGISTER_BLOCK_WORDS]);
    flags.set(Flags::HAS_NON_ZERO_B, state.reg_b != [0; REGISTER_BLOCK_WORDS]);
    flags.bits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Header;

    fn sample_state() -> MachineState {
        let header = Header {
            version: Version::V2,
            reserved: 0,
            num_code_pages: 4,
            num_data_pages: 2,
            num_call_stack_pages: 2,
            num_user_stack_pages: 2,
            min_activation_amount: 0,
        };
        MachineState {
            code: vec![0u8; header.code_len()].into_boxed_slice(),
            data: vec![0u8; header.data_len()].into_boxed_slice(),
            call_stack: Vec::new(),
            user_stack: Vec::new(),
            pc: 12,
            on_stop_address: 0,
            on_error_address: Some(0x29),
            reg_a: [0; REGISTER_BLOCK_WORDS],
            reg_b: [0; REGISTER_BLOCK_WORDS],
            current_balance: 1000,
            previous_balance: 1000,
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
    fn round_trips_v2_state_bytes() {
        let state = sample_state();
        let bytes = state.to_state_bytes();
        let restored = MachineState::from_state_bytes(&state.code, &bytes).unwrap();
        assert_eq!(restored.pc, state.pc);
        assert_eq!(restored.on_error_address, state.on_error_address);
        assert_eq!(restored.data, state.data);
    }

    #[test]
    fn round_trip_is_byte_identical_on_second_pass() {
        let state = sample_state();
        let bytes = state.to_state_bytes();
        let restored = MachineState::from_state_bytes(&state.code, &bytes).unwrap();
        let bytes2 = restored.to_state_bytes();
        assert_eq!(bytes, bytes2);
    }
}
