//! The host-facing seam (spec §6): everything the interpreter needs from
//! its embedding blockchain that it cannot compute itself, block height,
//! balances, transaction lookups, payments, and the fee schedule.
//!
//! Grounded on `fuel-vm/src/interpreter/interpreter_trait.rs`'s `Ecal`/
//! storage-backend trait seam: a single trait parameterizing the
//! interpreter over everything environment-specific, with an associated
//! `Error` type threaded through `error::RuntimeError`.

use crate::asm::OpCode;
use crate::error::PanicReason;
use crate::state::MachineState;

/// Everything the round driver needs from the embedding chain.
///
/// Implementations are expected to be pure functions of committed chain
/// state (spec §5): the VM's determinism guarantee depends on every host
/// call producing identical results given identical inputs across
/// independent validators.
pub trait HostApi {
    /// Host-side error type, surfaced to the round driver as
    /// `RuntimeError::Host` and never redirected to `on_error_address`.
    type Error;

    /// Height of the block currently being produced.
    fn current_block_height(&self) -> u32;

    /// This machine's balance as tracked by the host ledger.
    fn current_balance(&self, machine: &MachineState) -> u64;

    /// Height of the block preceding the one being produced.
    fn previous_block_height(&self) -> u32;

    /// Height of the block in which this machine was deployed.
    fn at_creation_block_height(&self, machine: &MachineState) -> u32;

    /// Write the hash of the previous block into the A register.
    fn put_previous_block_hash_into_a(&self, machine: &mut MachineState) -> Result<(), Self::Error>;

    /// Find the first transaction to this AT at or after `timestamp` and
    /// set A to its 64-bit handle, or `0` if none exists yet.
    fn put_transaction_after_timestamp_into_a(
        &self,
        timestamp: u64,
        machine: &mut MachineState,
    ) -> Result<(), Self::Error>;

    /// Type of the transaction referenced by A, or `-1` if A is not a valid
    /// transaction handle.
    fn type_from_tx_in_a(&self, machine: &MachineState) -> Result<i64, Self::Error>;

    /// Amount of the transaction referenced by A, or `-1` if invalid.
    fn amount_from_tx_in_a(&self, machine: &MachineState) -> Result<i64, Self::Error>;

    /// Timestamp of the transaction referenced by A, or `-1` if invalid.
    fn timestamp_from_tx_in_a(&self, machine: &MachineState) -> Result<i64, Self::Error>;

    /// Derive a random value from the transaction referenced by A. May set
    /// `is_sleeping` on `machine` to defer to the next block for entropy;
    /// when it does, the round driver rewinds the PC so this call
    /// re-executes on wake (spec §4.3, §6).
    fn generate_random_using_tx_in_a(&self, machine: &mut MachineState) -> Result<i64, Self::Error>;

    /// Write the message attached to the transaction referenced by A into B.
    fn put_message_from_tx_in_a_into_b(&self, machine: &mut MachineState) -> Result<(), Self::Error>;

    /// Write the sender address of the transaction referenced by A into B.
    fn put_address_from_tx_in_a_into_b(&self, machine: &mut MachineState) -> Result<(), Self::Error>;

    /// Write this AT's creator address into B.
    fn put_creator_address_into_b(&self, machine: &mut MachineState) -> Result<(), Self::Error>;

    /// Pay `amount` from this AT's balance to the address held in B.
    fn pay_amount_to_b(&self, amount: u64, machine: &mut MachineState) -> Result<(), Self::Error>;

    /// Send A as a message to the address held in B.
    fn message_a_to_b(&self, machine: &mut MachineState) -> Result<(), Self::Error>;

    /// Add `minutes` to `timestamp`, in the host's timestamp encoding.
    fn add_minutes_to_timestamp(&self, timestamp: u64, minutes: u64) -> Result<i64, Self::Error>;

    /// Fee charged per step this round (spec §4.4).
    fn fee_per_step(&self) -> u64;

    /// Maximum steps a single round may consume before sleeping.
    fn max_steps_per_round(&self) -> u32;

    /// Per-opcode step cost; defaults to the opcode's built-in cost when a
    /// host does not wish to override it.
    fn opcode_steps(&self, opcode: OpCode) -> u32 {
        opcode.default_steps()
    }

    /// Called when a round ends with `had_fatal_error` set.
    fn on_fatal_error(&self, machine: &MachineState, error: PanicReason);

    /// Called when `is_finished` transitions to true; `remaining_balance`
    /// is refunded to the creator by the host.
    fn on_finished(&self, remaining_balance: u64, machine: &MachineState);

    /// Dispatch a platform-specific function code (`0x0500..=0x06FF`) to
    /// the host, which may read/write `machine`'s data segment and
    /// registers as it sees fit.
    fn platform_specific_post_check_execute(
        &self,
        raw_function_code: u16,
        machine: &mut MachineState,
    ) -> Result<(), Self::Error>;
}

/// A no-op host used by tests: every query returns a fixed default and no
/// host error ever occurs. Not meant to model any real chain semantics.
#[cfg(feature = "test-helpers")]
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost {
    pub block_height: u32,
    pub fee_per_step: u64,
    pub max_steps_per_round: u32,
}

#[cfg(feature = "test-helpers")]
impl HostApi for NullHost {
    type Error = std::convert::Infallible;

    fn current_block_height(&self) -> u32 {
        self.block_height
    }

    fn current_balance(&self, machine: &MachineState) -> u64 {
        machine.current_balance
    }

    fn previous_block_height(&self) -> u32 {
        self.block_height.saturating_sub(1)
    }

    fn at_creation_block_height(&self, _machine: &MachineState) -> u32 {
        0
    }

    fn put_previous_block_hash_into_a(&self, machine: &mut MachineState) -> Result<(), Self::Error> {
        machine.reg_a = [0; crate::consts::REGISTER_BLOCK_WORDS];
        Ok(())
    }

    fn put_transaction_after_timestamp_into_a(
        &self,
        _timestamp: u64,
        machine: &mut MachineState,
    ) -> Result<(), Self::Error> {
        machine.reg_a = [0; crate::consts::REGISTER_BLOCK_WORDS];
        Ok(())
    }

    fn type_from_tx_in_a(&self, _machine: &MachineState) -> Result<i64, Self::Error> {
        Ok(-1)
    }

    fn amount_from_tx_in_a(&self, _machine: &MachineState) -> Result<i64, Self::Error> {
        Ok(-1)
    }

    fn timestamp_from_tx_in_a(&self, _machine: &MachineState) -> Result<i64, Self::Error> {
        Ok(-1)
    }

    fn generate_random_using_tx_in_a(&self, _machine: &mut MachineState) -> Result<i64, Self::Error> {
        Ok(0)
    }

    fn put_message_from_tx_in_a_into_b(&self, machine: &mut MachineState) -> Result<(), Self::Error> {
        machine.reg_b = [0; crate::consts::REGISTER_BLOCK_WORDS];
        Ok(())
    }

    fn put_address_from_tx_in_a_into_b(&self, machine: &mut MachineState) -> Result<(), Self::Error> {
        machine.reg_b = [0; crate::consts::REGISTER_BLOCK_WORDS];
        Ok(())
    }

    fn put_creator_address_into_b(&self, machine: &mut MachineState) -> Result<(), Self::Error> {
        machine.reg_b = [0; crate::consts::REGISTER_BLOCK_WORDS];
        Ok(())
    }

    fn pay_amount_to_b(&self, amount: u64, machine: &mut MachineState) -> Result<(), Self::Error> {
        machine.current_balance = machine.current_balance.saturating_sub(amount);
        Ok(())
    }

    fn message_a_to_b(&self, _machine: &mut MachineState) -> Result<(), Self::Error> {
        Ok(())
    }

    fn add_minutes_to_timestamp(&self, timestamp: u64, minutes: u64) -> Result<i64, Self::Error> {
        Ok(timestamp as i64 + minutes as i64 * 60)
    }

    fn fee_per_step(&self) -> u64 {
        self.fee_per_step
    }

    fn max_steps_per_round(&self) -> u32 {
        self.max_steps_per_round
    }

    fn on_fatal_error(&self, _machine: &MachineState, _error: PanicReason) {}

    fn on_finished(&self, _remaining_balance: u64, _machine: &MachineState) {}

    fn platform_specific_post_check_execute(
        &self,
        _raw_function_code: u16,
        _machine: &mut MachineState,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}
