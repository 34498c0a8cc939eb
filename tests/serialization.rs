//! Persistent-state serialization round-trips (spec §4.5), beyond the
//! colocated unit tests in `src/state/serialize.rs`: a mid-program snapshot
//! with every optional trailer populated, and the V1/V2 disambiguation on
//! restore.

use at_vm::prelude::*;
use at_vm::state::{Flags, Header, Version};

fn header(version: Version, data_pages: u16) -> Header {
    Header {
        version,
        reserved: 7,
        num_code_pages: 4,
        num_data_pages: data_pages,
        num_call_stack_pages: 2,
        num_user_stack_pages: 2,
        min_activation_amount: if version.has_activation_amount() { 42 } else { 0 },
    }
}

fn populated_state(version: Version) -> MachineState {
    let header = header(version, 2);
    let mut state = MachineState {
        code: vec![0u8; header.code_len()].into_boxed_slice(),
        data: vec![0u8; header.data_len()].into_boxed_slice(),
        call_stack: Vec::new(),
        user_stack: Vec::new(),
        pc: 3,
        on_stop_address: 1,
        on_error_address: Some(9),
        reg_a: [1, 2, 3, 4],
        reg_b: [5, 6, 7, 8],
        current_balance: 555,
        previous_balance: 777,
        steps: 0,
        current_block_height: 0,
        sleep_until_height: Some(100),
        frozen_balance: Some(10),
        flags: Flags::empty(),
        is_first_opcode_after_sleeping: false,
        header,
    };
    state.push_call(0x1234).unwrap();
    state.push_user(0xABCD).unwrap();
    state
}

/// A V2 machine with every optional trailer field populated round-trips
/// byte-for-byte through `to_state_bytes`/`from_state_bytes`.
#[test]
fn v2_full_trailer_round_trips() {
    let state = populated_state(Version::V2);
    let bytes = state.to_state_bytes();
    let restored = MachineState::from_state_bytes(&state.code, &bytes).unwrap();

    assert_eq!(restored.pc, state.pc);
    assert_eq!(restored.on_stop_address, state.on_stop_address);
    assert_eq!(restored.on_error_address, state.on_error_address);
    assert_eq!(restored.sleep_until_height, state.sleep_until_height);
    assert_eq!(restored.frozen_balance, state.frozen_balance);
    assert_eq!(restored.reg_a, state.reg_a);
    assert_eq!(restored.reg_b, state.reg_b);
    assert_eq!(restored.call_stack, state.call_stack);
    assert_eq!(restored.user_stack, state.user_stack);
    assert_eq!(restored.previous_balance, state.previous_balance);

    // A second pass produces byte-identical output.
    assert_eq!(restored.to_state_bytes(), bytes);
}

/// A V1 machine (little-endian wire, no `previous_balance` field) restores
/// correctly and is distinguished from V2 purely by its first byte.
#[test]
fn v1_little_endian_round_trips_without_previous_balance() {
    let state = populated_state(Version::V1);
    let bytes = state.to_state_bytes();

    // V1's version field (1) serializes little-endian, so its first byte
    // is nonzero — the restorer's only signal to pick little-endian.
    assert_ne!(bytes[0], 0);

    let restored = MachineState::from_state_bytes(&state.code, &bytes).unwrap();
    assert_eq!(restored.header.version, Version::V1);
    assert_eq!(restored.pc, state.pc);
    assert_eq!(restored.reg_a, state.reg_a);
    // V1 carries no previous_balance trailer; restore defaults it to 0 and
    // current_balance tracks it.
    assert_eq!(restored.previous_balance, 0);
    assert_eq!(restored.current_balance, 0);
}

/// Zeroed A/B register blocks are omitted from the wire format entirely
/// (`HAS_NON_ZERO_A`/`HAS_NON_ZERO_B`), so a state with no register
/// activity round-trips to a strictly shorter buffer than one with it.
#[test]
fn zero_registers_are_omitted_from_the_wire_format() {
    let mut with_registers = populated_state(Version::V2);
    with_registers.call_stack.clear();
    with_registers.user_stack.clear();

    let mut without_registers = with_registers.clone();
    without_registers.reg_a = [0; 4];
    without_registers.reg_b = [0; 4];

    let longer = with_registers.to_state_bytes();
    let shorter = without_registers.to_state_bytes();
    assert!(shorter.len() < longer.len());

    let restored = MachineState::from_state_bytes(&without_registers.code, &shorter).unwrap();
    assert_eq!(restored.reg_a, [0; 4]);
    assert_eq!(restored.reg_b, [0; 4]);
}
