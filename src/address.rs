//! Address validators: bounds checks for code and data addresses.
//!
//! Every operand decode and every indirect addressing opcode routes through
//! here (spec §3 invariants: "every address argument is validated before
//! use").

use crate::consts::MAX_CODE_ADDRESS;
use crate::error::PanicReason;

/// Validate a code address operand against the code segment length, per
/// spec §4.1: `0 <= a <= MAX_CODE_ADDRESS` and `a < code segment length`.
pub fn validate_code_address(addr: u32, code_len: usize) -> Result<usize, PanicReason> {
    if addr > MAX_CODE_ADDRESS {
        return Err(PanicReason::InvalidAddress);
    }
    let addr = addr as usize;
    if addr >= code_len {
        return Err(PanicReason::InvalidAddress);
    }
    Ok(addr)
}

/// Validate a data-cell index against the data segment's cell count
/// (`num_data_pages * data_page_size / 8`), returning the byte offset of the
/// cell.
pub fn validate_data_address(cell_index: u32, data_len_bytes: usize) -> Result<usize, PanicReason> {
    let byte_offset = (cell_index as usize)
        .checked_mul(8)
        .ok_or(PanicReason::InvalidAddress)?;
    let end = byte_offset.checked_add(8).ok_or(PanicReason::InvalidAddress)?;
    if end > data_len_bytes {
        return Err(PanicReason::InvalidAddress);
    }
    Ok(byte_offset)
}

/// Validate a run of `count` consecutive data cells starting at
/// `cell_index`, used by the A/B register block copies
/// (`GET_A_DAT`/`SET_A_DAT`/...) which address four cells at once.
pub fn validate_data_address_range(
    cell_index: u32,
    count: u32,
    data_len_bytes: usize,
) -> Result<usize, PanicReason> {
    let byte_offset = (cell_index as usize)
        .checked_mul(8)
        .ok_or(PanicReason::InvalidAddress)?;
    let span = (count as usize).checked_mul(8).ok_or(PanicReason::InvalidAddress)?;
    let end = byte_offset.checked_add(span).ok_or(PanicReason::InvalidAddress)?;
    if end > data_len_bytes {
        return Err(PanicReason::InvalidAddress);
    }
    Ok(byte_offset)
}

/// Validate a hash-source byte range `[start*8, start*8 + length)` against
/// the data segment, per spec §4.3 `getHashData` preflight.
pub fn validate_hash_range(
    start_cell: u32,
    length: u32,
    data_len_bytes: usize,
) -> Result<(usize, usize), PanicReason> {
    let start = (start_cell as usize)
        .checked_mul(8)
        .ok_or(PanicReason::InvalidAddress)?;
    let len = length as usize;
    let end = start.checked_add(len).ok_or(PanicReason::InvalidAddress)?;
    // Preflight validates whole cells covering the byte range fit in the
    // data segment, i.e. start + ceil(length/8) cells <= num_data_pages.
    let cells_covered = len.div_ceil(8);
    let covered_end = start
        .checked_add(cells_covered.checked_mul(8).ok_or(PanicReason::InvalidAddress)?)
        .ok_or(PanicReason::InvalidAddress)?;
    if covered_end > data_len_bytes {
        return Err(PanicReason::Execution);
    }
    Ok((start, end))
}
