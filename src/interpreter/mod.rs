//! The round driver (spec §4.4): pre-round gating, the opcode fetch/meter/
//! execute loop, and post-round disposition.
//!
//! Grounded on `fuel-vm/src/interpreter/executors/main.rs`'s run-to-
//! completion loop shape (fetch, gas-meter, dispatch, advance PC),
//! collapsed from its receipts-and-panic-reason machinery onto this
//! system's simpler sleep/stop/freeze/finish state machine.

pub mod function;
pub mod opcode;

use crate::asm::function::FunctionCode;
use crate::asm::{self, Instruction, Operands};
use crate::codec::Cursor;
use crate::error::{PanicReason, RuntimeError};
use crate::host::HostApi;
use crate::state::{Flags, MachineState};
use function::ExtKind;

/// Host-supplied values snapshotted at the start of a round (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundInputs {
    pub current_block_height: u32,
    pub current_balance: u64,
    pub fee_per_step: u64,
    pub max_steps_per_round: u32,
}

impl RoundInputs {
    /// Snapshot the round's inputs from `host`.
    pub fn snapshot<H: HostApi>(host: &H, state: &MachineState) -> Self {
        Self {
            current_block_height: host.current_block_height(),
            current_balance: host.current_balance(state),
            fee_per_step: host.fee_per_step(),
            max_steps_per_round: host.max_steps_per_round(),
        }
    }
}

const HALT_FLAGS: Flags = Flags::IS_SLEEPING
    .union(Flags::IS_STOPPED)
    .union(Flags::IS_FROZEN)
    .union(Flags::IS_FINISHED);

/// Run one round for `state` against `host` (spec §4.4).
///
/// Returns `Ok(())` for every outcome the consensus contract itself
/// models (finish, sleep, freeze, stop, or a trapped/fatal VM error),
/// those are all recorded in `state.flags`, not in this `Result`. Only a
/// [`HostApi::Error`] (an infrastructure failure the host itself is
/// reporting) surfaces as `Err`, since it carries no well-formed
/// consensus meaning for `on_error_address` to redirect to (spec §7).
pub fn execute_round<H: HostApi>(state: &mut MachineState, host: &H) -> Result<(), H::Error> {
    let inputs = RoundInputs::snapshot(host, state);
    state.current_block_height = inputs.current_block_height;
    state.current_balance = inputs.current_balance;

    if state.is_finished() {
        return Ok(());
    }
    if state.flags.contains(Flags::IS_FROZEN) {
        if let Some(threshold) = state.frozen_balance {
            if state.current_balance <= threshold {
                return Ok(());
            }
        }
    }
    if state.flags.contains(Flags::IS_SLEEPING) {
        if let Some(height) = state.sleep_until_height {
            if state.current_block_height < height {
                return Ok(());
            }
        }
    }

    state.is_first_opcode_after_sleeping = state.flags.contains(Flags::IS_SLEEPING);
    state
        .flags
        .remove(Flags::IS_SLEEPING | Flags::IS_STOPPED | Flags::IS_FROZEN);
    state.sleep_until_height = None;
    state.frozen_balance = None;
    // `steps` is volatile per round (the serializer omits it, restore always
    // sets it to 0); reset it here too so a host that reuses the in-memory
    // `MachineState` across rounds instead of round-tripping through bytes
    // gets the same per-round step budget either way.
    state.steps = 0;

    // The code segment is read-only during execution (spec §3 invariant);
    // cloning it up front lets the cursor borrow independently of the
    // mutable state borrows the loop body needs.
    let code = state.code.clone();
    let mut cursor = Cursor::new(&code, state.pc as usize);

    loop {
        if state.flags.intersects(HALT_FLAGS) {
            break;
        }

        let order = state.header.version.endianness();
        let instruction = match asm::decode(&mut cursor, order) {
            Ok(instruction) => instruction,
            Err(reason) => {
                if trap(state, host, &mut cursor, reason) {
                    continue;
                }
                break;
            }
        };

        let steps = host.opcode_steps(instruction.opcode);
        if state.steps + steps > inputs.max_steps_per_round {
            state.flags.insert(Flags::IS_SLEEPING);
            break;
        }
        let fee = steps as u64 * inputs.fee_per_step;
        if state.current_balance < fee {
            state.flags.insert(Flags::IS_FROZEN);
            state.frozen_balance = Some(state.current_balance);
            break;
        }
        state.current_balance -= fee;
        state.steps += steps;

        match run_one(state, host, &mut cursor, instruction) {
            Ok(()) => {}
            Err(RuntimeError::Recoverable(reason)) => {
                let recovered = trap(state, host, &mut cursor, reason);
                state.is_first_opcode_after_sleeping = false;
                if recovered {
                    continue;
                }
                break;
            }
            Err(RuntimeError::Host(error)) => return Err(error),
        }

        state.pc = u32::try_from(cursor.position()).unwrap_or(u32::MAX);
        state.is_first_opcode_after_sleeping = false;
    }

    post_round(state, host);
    Ok(())
}

/// Execute one instruction, routing `EXT_FUN*` opcodes through the
/// function dispatcher.
fn run_one<H: HostApi>(
    state: &mut MachineState,
    host: &H,
    cursor: &mut Cursor,
    instruction: Instruction,
) -> Result<(), RuntimeError<H::Error>> {
    let needs_function_dispatch = opcode::execute(state, cursor, instruction)?;
    if !needs_function_dispatch {
        return Ok(());
    }

    let (raw_func, kind, addrs) = match instruction.operands {
        Operands::FuncCode(raw) => (raw, ExtKind::Fun, Vec::new()),
        Operands::FuncCodeDataAddr1(raw, a) => {
            let kind = if matches!(instruction.opcode, asm::OpCode::ExtFunDat) {
                ExtKind::FunDat
            } else {
                ExtKind::FunRet
            };
            (raw, kind, vec![a])
        }
        Operands::FuncCodeDataAddr2(raw, a, b) => {
            let kind = if matches!(instruction.opcode, asm::OpCode::ExtFunDat2) {
                ExtKind::FunDat2
            } else {
                ExtKind::FunRetDat
            };
            (raw, kind, vec![a, b])
        }
        Operands::FuncCodeDataAddr3(raw, a, b, c) => (raw, ExtKind::FunRetDat2, vec![a, b, c]),
        _ => return Err(RuntimeError::Recoverable(PanicReason::IllegalOperation)),
    };

    let func = FunctionCode::from_raw(raw_func).ok_or(RuntimeError::Recoverable(PanicReason::IllegalOperation))?;
    function::dispatch(state, host, func, kind, &addrs)?;

    // `GENERATE_RANDOM_USING_TX_IN_A` may defer to next block by setting
    // `is_sleeping`; when it does, rewind so this instruction re-executes
    // on wake instead of advancing past it (spec §4.3, §6).
    if state.flags.contains(Flags::IS_SLEEPING) {
        cursor.set_position(instruction.opcode_start as usize);
    }

    Ok(())
}

/// Trap a recoverable [`PanicReason`]: redirect to `on_error_address` if
/// set (returning `true`, the step counter and fee charge already taken
/// are retained per spec §7), otherwise finish fatally and return `false`.
fn trap<H: HostApi>(state: &mut MachineState, host: &H, cursor: &mut Cursor, reason: PanicReason) -> bool {
    if let Some(addr) = state.on_error_address {
        state.pc = addr;
        cursor.set_position(addr as usize);
        true
    } else {
        state.flags.insert(Flags::IS_FINISHED | Flags::HAD_FATAL_ERROR);
        host.on_fatal_error(state, reason);
        false
    }
}

/// Post-round disposition (spec §4.4): reset PC on stop, refund and zero
/// balance on finish, then roll `previous_balance` forward.
fn post_round<H: HostApi>(state: &mut MachineState, host: &H) {
    if state.flags.contains(Flags::IS_STOPPED) {
        state.pc = state.on_stop_address;
    }
    if state.is_finished() {
        let remaining = state.current_balance;
        host.on_finished(remaining, state);
        state.current_balance = 0;
    }
    state.previous_balance = state.current_balance;
}
