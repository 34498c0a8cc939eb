//! Block/transaction query and payment function codes (spec §4.3,
//! `0x0300`–`0x0406`). Each forwards to [`HostApi`] after whatever local
//! bookkeeping the machine itself owns (balances, the finish-on-zero-balance
//! rule from spec §9 open question iii).

use crate::host::HostApi;
use crate::state::MachineState;

/// `GET_BLOCK_TIMESTAMP`: the current round's cached block height, encoded
/// per spec §6 (`(height << 32) | tx_index`, tx index `0` at block level).
pub fn block_timestamp(state: &MachineState) -> u64 {
    (state.current_block_height as u64) << 32
}

/// `GET_CREATION_TIMESTAMP`: this AT's deployment block, same encoding.
pub fn creation_timestamp<H: HostApi>(host: &H, state: &MachineState) -> u64 {
    (host.at_creation_block_height(state) as u64) << 32
}

/// `PUT_PREV_BLOCK_HASH_INTO_A`.
pub fn previous_block_hash_into_a<H: HostApi>(
    host: &H,
    state: &mut MachineState,
) -> Result<(), H::Error> {
    host.put_previous_block_hash_into_a(state)
}

/// `PUT_TX_AFTER_TIMESTAMP_INTO_A`.
pub fn tx_after_timestamp_into_a<H: HostApi>(
    host: &H,
    timestamp: u64,
    state: &mut MachineState,
) -> Result<(), H::Error> {
    host.put_transaction_after_timestamp_into_a(timestamp, state)
}

pub fn type_for_tx_in_a<H: HostApi>(host: &H, state: &MachineState) -> Result<i64, H::Error> {
    host.type_from_tx_in_a(state)
}

pub fn amount_for_tx_in_a<H: HostApi>(host: &H, state: &MachineState) -> Result<i64, H::Error> {
    host.amount_from_tx_in_a(state)
}

pub fn timestamp_for_tx_in_a<H: HostApi>(host: &H, state: &MachineState) -> Result<i64, H::Error> {
    host.timestamp_from_tx_in_a(state)
}

/// `GENERATE_RANDOM_USING_TX_IN_A`. If the host defers by setting
/// `is_sleeping`, the caller (the EXT_FUN dispatcher) rewinds the PC by the
/// full instruction width so this call re-executes next round (spec §4.3,
/// §6).
pub fn generate_random_using_tx_in_a<H: HostApi>(
    host: &H,
    state: &mut MachineState,
) -> Result<i64, H::Error> {
    host.generate_random_using_tx_in_a(state)
}

pub fn message_from_tx_in_a_into_b<H: HostApi>(
    host: &H,
    state: &mut MachineState,
) -> Result<(), H::Error> {
    host.put_message_from_tx_in_a_into_b(state)
}

pub fn address_from_tx_in_a_into_b<H: HostApi>(
    host: &H,
    state: &mut MachineState,
) -> Result<(), H::Error> {
    host.put_address_from_tx_in_a_into_b(state)
}

pub fn creator_into_b<H: HostApi>(host: &H, state: &mut MachineState) -> Result<(), H::Error> {
    host.put_creator_address_into_b(state)
}

pub fn current_balance<H: HostApi>(host: &H, state: &MachineState) -> u64 {
    host.current_balance(state)
}

pub fn previous_balance(state: &MachineState) -> u64 {
    state.previous_balance
}

/// `PAY_AMOUNT_TO_B` / `PAY_ALL_TO_B` / `PAY_PREVIOUS_TO_B`: the amount to
/// pay is resolved by the caller. The finish-on-zero-balance rule (spec §9
/// open question iii, matching the later source) is applied by the
/// dispatcher once the host confirms the payment.
pub fn pay_to_b<H: HostApi>(host: &H, amount: u64, state: &mut MachineState) -> Result<(), H::Error> {
    host.pay_amount_to_b(amount, state)
}

pub fn message_a_to_b<H: HostApi>(host: &H, state: &mut MachineState) -> Result<(), H::Error> {
    host.message_a_to_b(state)
}

pub fn add_minutes_to_timestamp<H: HostApi>(
    host: &H,
    timestamp: u64,
    minutes: u64,
) -> Result<i64, H::Error> {
    host.add_minutes_to_timestamp(timestamp, minutes)
}
