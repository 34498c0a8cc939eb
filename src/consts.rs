//! VM-wide constants: register widths, versioned page sizes, header layout.

use core::mem;

/// Width of a data cell / register word, in bytes.
pub const WORD_SIZE: usize = mem::size_of::<u64>();

/// Number of 64-bit words making up the A or B register block.
pub const REGISTER_BLOCK_WORDS: usize = 4;

/// Highest code address a `code-addr` operand may name (spec §4.1).
pub const MAX_CODE_ADDRESS: u32 = u32::MAX - 1;

/// Sentinel value that clears `on_error_address` when passed to `ERR` (spec §4.2).
pub const NO_ERROR_ADDRESS: u32 = u32::MAX;

/// Page sizes and counts are fixed per protocol version (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSizes {
    /// Bytes per code page.
    pub code_page: u32,
    /// Bytes per data page (always a multiple of [`WORD_SIZE`]).
    pub data_page: u32,
    /// Bytes per call-stack page.
    pub call_stack_page: u32,
    /// Bytes per user-stack page.
    pub user_stack_page: u32,
}

impl PageSizes {
    /// Version 1: every page kind is a flat 256 bytes.
    pub const V1: Self = Self {
        code_page: 256,
        data_page: 256,
        call_stack_page: 256,
        user_stack_page: 256,
    };

    /// Version 2 and later: pages are sized per their natural unit.
    pub const V2: Self = Self {
        code_page: 1,
        data_page: 8,
        call_stack_page: 4,
        user_stack_page: 8,
    };
}

static_assertions::const_assert!(PageSizes::V2.data_page as usize == WORD_SIZE);

/// Fixed byte length of the header's integer fields, excluding the optional
/// version-2+ `min_activation_amount` trailer.
pub const HEADER_CORE_LEN: usize = 2 * 6;

/// Byte length of the version-2+ `min_activation_amount` trailer.
pub const HEADER_ACTIVATION_LEN: usize = 8;

/// Call-stack entries are 4-byte code addresses.
pub const CALL_STACK_ENTRY_LEN: usize = 4;

/// User-stack entries are 8-byte values.
pub const USER_STACK_ENTRY_LEN: usize = WORD_SIZE;
