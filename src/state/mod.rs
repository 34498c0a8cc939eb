//! The machine-state container (spec §3): header, code/data segments, both
//! downward-growing stacks, registers, balances, and status flags.
//!
//! Grounded on the `Registers`/flags split of `fuel-vm/src/interpreter/register.rs`
//! and `fuel-vm/src/state.rs`, collapsed onto this system's much smaller
//! fixed register file (PC, on-stop/on-error addresses, A/B blocks,
//! balances, step counter) plus an explicit status-flags word instead of the
//! teacher's general-purpose register array.

pub mod serialize;

use crate::consts::{PageSizes, REGISTER_BLOCK_WORDS};
use crate::error::PanicReason;

/// Protocol version. Only two wire formats exist; an unrecognized version
/// byte is rejected at construction rather than silently treated as V1
/// (spec §9, "Big/little endianness").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// Little-endian header/state scalars, flat 256-byte pages.
    V1,
    /// Big-endian header/state scalars, natural-unit page sizes.
    V2,
}

impl Version {
    /// Parse a raw version field.
    pub fn from_raw(raw: u16) -> Result<Self, PanicReason> {
        match raw {
            1 => Ok(Self::V1),
            v if v >= 2 => Ok(Self::V2),
            _ => Err(PanicReason::IllegalOperation),
        }
    }

    /// Raw wire value.
    pub const fn as_raw(self) -> u16 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Byte order for this version's header and persistent-state scalars.
    pub const fn endianness(self) -> crate::codec::Endianness {
        match self {
            Self::V1 => crate::codec::Endianness::Little,
            Self::V2 => crate::codec::Endianness::Big,
        }
    }

    /// Page sizes for this version (spec §3 "Versioned page sizes").
    pub const fn page_sizes(self) -> PageSizes {
        match self {
            Self::V1 => PageSizes::V1,
            Self::V2 => PageSizes::V2,
        }
    }

    /// Whether this version carries the `min_activation_amount` header
    /// trailer.
    pub const fn has_activation_amount(self) -> bool {
        matches!(self, Self::V2)
    }
}

/// Fixed-length header fields (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Protocol version.
    pub version: Version,
    /// Reserved field, round-tripped but otherwise unused.
    pub reserved: u16,
    /// Number of code pages.
    pub num_code_pages: u16,
    /// Number of data pages.
    pub num_data_pages: u16,
    /// Number of call-stack pages.
    pub num_call_stack_pages: u16,
    /// Number of user-stack pages.
    pub num_user_stack_pages: u16,
    /// Minimum balance required to unfreeze the AT (V2+ only; `0` for V1).
    pub min_activation_amount: u64,
}

impl Header {
    /// Code segment length in bytes.
    pub fn code_len(&self) -> usize {
        self.num_code_pages as usize * self.version.page_sizes().code_page as usize
    }

    /// Data segment length in bytes.
    pub fn data_len(&self) -> usize {
        self.num_data_pages as usize * self.version.page_sizes().data_page as usize
    }

    /// Call-stack length in bytes.
    pub fn call_stack_len(&self) -> usize {
        self.num_call_stack_pages as usize * self.version.page_sizes().call_stack_page as usize
    }

    /// User-stack length in bytes.
    pub fn user_stack_len(&self) -> usize {
        self.num_user_stack_pages as usize * self.version.page_sizes().user_stack_page as usize
    }
}

bitflags::bitflags! {
    /// Status flags (spec §3 "Flags"), packed into a single word by the
    /// serializer with the most-recently-pushed bit highest (spec §4.5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        /// Execution halted cooperatively; resumes at `sleep_until_height`.
        const IS_SLEEPING = 1 << 0;
        /// Execution halted for this round; PC resets to `on_stop_address`.
        const IS_STOPPED = 1 << 1;
        /// Terminal: the VM will never execute again.
        const IS_FINISHED = 1 << 2;
        /// An uncaught error halted the machine permanently.
        const HAD_FATAL_ERROR = 1 << 3;
        /// Execution halted for insufficient balance.
        const IS_FROZEN = 1 << 4;
        /// Whether `on_error_address` carries a meaningful value.
        const HAS_ON_ERROR_ADDRESS = 1 << 5;
        /// Whether `sleep_until_height` carries a meaningful value.
        const HAS_SLEEP_UNTIL_HEIGHT = 1 << 6;
        /// Whether `frozen_balance` carries a meaningful value.
        const HAS_FROZEN_BALANCE = 1 << 7;
        /// Whether the A register block is non-zero (affects serialized length).
        const HAS_NON_ZERO_A = 1 << 8;
        /// Whether the B register block is non-zero (affects serialized length).
        const HAS_NON_ZERO_B = 1 << 9;
    }
}

/// A 256-bit scratch register, four 64-bit words (spec §3, GLOSSARY "A/B register").
pub type RegisterBlock = [u64; REGISTER_BLOCK_WORDS];

/// The full state of one automated transaction between rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    /// Immutable header.
    pub header: Header,
    /// Code segment. Never mutated by execution (spec §3 invariant).
    pub code: Box<[u8]>,
    /// Data segment, 8-byte cells, intra-cell little-endian.
    pub data: Box<[u8]>,
    /// Downward-growing call stack: 4-byte code addresses.
    pub call_stack: Vec<u8>,
    /// Downward-growing user stack: 8-byte values.
    pub user_stack: Vec<u8>,
    /// Program counter: offset of the next opcode to execute.
    pub pc: u32,
    /// Code offset the PC resets to after a round ends `is_stopped`.
    pub on_stop_address: u32,
    /// Code offset jumped to when a recoverable error is raised, if set.
    pub on_error_address: Option<u32>,
    /// A register.
    pub reg_a: RegisterBlock,
    /// B register.
    pub reg_b: RegisterBlock,
    /// Current balance.
    pub current_balance: u64,
    /// Balance as of the end of the previous round (or deployment).
    pub previous_balance: u64,
    /// Opcodes consumed so far this round.
    pub steps: u32,
    /// Block height cached at the start of the current round.
    pub current_block_height: u32,
    /// Block height at (or after) which a sleeping AT resumes.
    pub sleep_until_height: Option<u32>,
    /// Balance threshold below which a frozen AT stays frozen.
    pub frozen_balance: Option<u64>,
    /// Status flags.
    pub flags: Flags,
    /// Set on the opcode immediately following a sleep-triggered resume
    /// (spec §4.4); cleared after that opcode executes.
    pub is_first_opcode_after_sleeping: bool,
}

impl MachineState {
    /// The call stack's limit: it grows downward from `call_stack_len`.
    pub fn call_stack_limit(&self) -> usize {
        self.header.call_stack_len()
    }

    /// The user stack's limit: it grows downward from `user_stack_len`.
    pub fn user_stack_limit(&self) -> usize {
        self.header.user_stack_len()
    }

    /// Push a 4-byte code address onto the call stack.
    pub fn push_call(&mut self, code_addr: u32) -> Result<(), PanicReason> {
        if self.call_stack.len() + 4 > self.call_stack_limit() {
            return Err(PanicReason::StackBounds);
        }
        self.call_stack.extend_from_slice(&code_addr.to_be_bytes());
        Ok(())
    }

    /// Pop a 4-byte code address from the call stack.
    pub fn pop_call(&mut self) -> Result<u32, PanicReason> {
        if self.call_stack.len() < 4 {
            return Err(PanicReason::StackBounds);
        }
        let start = self.call_stack.len() - 4;
        let bytes: [u8; 4] = self.call_stack[start..].try_into().expect("checked length");
        self.call_stack.truncate(start);
        Ok(u32::from_be_bytes(bytes))
    }

    /// Push an 8-byte value onto the user stack.
    pub fn push_user(&mut self, value: u64) -> Result<(), PanicReason> {
        if self.user_stack.len() + 8 > self.user_stack_limit() {
            return Err(PanicReason::StackBounds);
        }
        self.user_stack.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Pop an 8-byte value from the user stack.
    pub fn pop_user(&mut self) -> Result<u64, PanicReason> {
        if self.user_stack.len() < 8 {
            return Err(PanicReason::StackBounds);
        }
        let start = self.user_stack.len() - 8;
        let bytes: [u8; 8] = self.user_stack[start..].try_into().expect("checked length");
        self.user_stack.truncate(start);
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read the little-endian value of data cell `cell_index`, validating
    /// bounds first.
    pub fn read_cell(&self, cell_index: u32) -> Result<u64, PanicReason> {
        let offset = crate::address::validate_data_address(cell_index, self.data.len())?;
        let bytes: [u8; 8] = self.data[offset..offset + 8].try_into().expect("validated length");
        Ok(u64::from_le_bytes(bytes))
    }

    /// Write `value` into data cell `cell_index`, validating bounds first.
    pub fn write_cell(&mut self, cell_index: u32, value: u64) -> Result<(), PanicReason> {
        let offset = crate::address::validate_data_address(cell_index, self.data.len())?;
        self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Whether the machine will execute no further opcodes.
    pub fn is_finished(&self) -> bool {
        self.flags.contains(Flags::IS_FINISHED)
    }
}
