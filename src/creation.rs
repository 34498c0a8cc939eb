//! Creation-bytes wire format (spec §6): `header || code || initial_data`,
//! used to deploy a new automated transaction.

use crate::codec::{write_u16, write_u64, Cursor};
use crate::consts::REGISTER_BLOCK_WORDS;
use crate::error::PanicReason;
use crate::state::{Flags, Header, MachineState, Version};

/// Encode creation bytes for a new AT (spec §6
/// `to_creation_bytes(version, code, data, num_call_stack_pages,
/// num_user_stack_pages, min_activation_amount)`).
///
/// `data` is copied into the front of the data segment; any remaining cells
/// are zero-filled.
pub fn to_creation_bytes(
    version: Version,
    code: &[u8],
    data: &[u8],
    num_call_stack_pages: u16,
    num_user_stack_pages: u16,
    min_activation_amount: u64,
) -> Result<Vec<u8>, PanicReason> {
    let page_sizes = version.page_sizes();
    let code_page = page_sizes.code_page as usize;
    let data_page = page_sizes.data_page as usize;

    if code.len() % code_page != 0 {
        return Err(PanicReason::InvalidAddress);
    }
    let num_code_pages = u16::try_from(code.len() / code_page).map_err(|_| PanicReason::InvalidAddress)?;

    let num_data_pages = u16::try_from(data.len().div_ceil(data_page).max(1))
        .map_err(|_| PanicReason::InvalidAddress)?;

    let order = version.endianness();
    let mut out = Vec::new();
    write_u16(&mut out, version.as_raw(), order);
    write_u16(&mut out, 0, order); // reserved
    write_u16(&mut out, num_code_pages, order);
    write_u16(&mut out, num_data_pages, order);
    write_u16(&mut out, num_call_stack_pages, order);
    write_u16(&mut out, num_user_stack_pages, order);
    if version.has_activation_amount() {
        write_u64(&mut out, min_activation_amount, order);
    }

    out.extend_from_slice(code);
    out.extend_from_slice(data);
    let total_data_len = num_data_pages as usize * data_page;
    out.resize(out.len() + (total_data_len - data.len()), 0);

    Ok(out)
}

/// Decode creation bytes into a freshly-deployed [`MachineState`].
///
/// `reject_legacy_v1` implements spec §9(ii): version-1 creation bytes whose
/// declared length uses the historical `num_data_pages + DATA_PAGE_SIZE`
/// (addition) rather than `num_data_pages * DATA_PAGE_SIZE` (multiplication)
/// are rejected rather than silently under- or over-reading the data
/// segment, when this flag is set.
pub fn from_creation_bytes(
    bytes: &[u8],
    reject_legacy_v1: bool,
) -> Result<MachineState, PanicReason> {
    let first_byte = *bytes.first().ok_or(PanicReason::CodeSegment)?;
    let order = if first_byte == 0 {
        crate::codec::Endianness::Big
    } else {
        crate::codec::Endianness::Little
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

    if matches!(version, Version::V1) {
        let page_sizes = version.page_sizes();
        let legacy_len = num_data_pages as usize + page_sizes.data_page as usize;
        let correct_len = header.data_len();
        if reject_legacy_v1 && legacy_len != correct_len {
            return Err(PanicReason::InvalidAddress);
        }
    }

    let code = cursor.read_bytes(header.code_len())?.to_vec().into_boxed_slice();

    let data_len = header.data_len();
    let remaining = bytes.len().saturating_sub(cursor.position());
    let mut data = vec![0u8; data_len];
    let take = remaining.min(data_len);
    let provided = cursor.read_bytes(take)?;
    data[..take].copy_from_slice(provided);

    let frozen = if min_activation_amount > 0 {
        Some(min_activation_amount - 1)
    } else {
        None
    };

    let mut flags = Flags::empty();
    flags.set(Flags::IS_FROZEN, frozen.is_some());

    Ok(MachineState {
        header,
        code,
        data: data.into_boxed_slice(),
        call_stack: Vec::new(),
        user_stack: Vec::new(),
        pc: 0,
        on_stop_address: 0,
        on_error_address: None,
        reg_a: [0; REGISTER_BLOCK_WORDS],
        reg_b: [0; REGISTER_BLOCK_WORDS],
        current_balance: 0,
        previous_balance: 0,
        steps: 0,
        current_block_height: 0,
        sleep_until_height: None,
        frozen_balance: frozen,
        flags,
        is_first_opcode_after_sleeping: false,
    })
}
