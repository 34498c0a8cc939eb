//! `EXT_FUN` family dispatcher (spec §4.3): validates the caller's declared
//! parameter/return shape against the function code's own, then routes to
//! the register/crypto/blockchain/platform implementation.

pub mod blockchain;
pub mod crypto;
pub mod platform;
pub mod register;

use crate::asm::function::FunctionCode;
use crate::error::{PanicReason, RuntimeError};
use crate::host::HostApi;
use crate::state::MachineState;
use crypto::HashAlgorithm;

/// Which `EXT_FUN*` opcode invoked the function, fixing how many data-addr
/// operands are present and whether the last one is a return destination
/// (spec §4.1, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtKind {
    Fun,
    FunDat,
    FunDat2,
    FunRet,
    FunRetDat,
    FunRetDat2,
}

impl ExtKind {
    const fn param_count(self) -> u8 {
        match self {
            Self::Fun | Self::FunRet => 0,
            Self::FunDat | Self::FunRetDat => 1,
            Self::FunDat2 | Self::FunRetDat2 => 2,
        }
    }

    const fn returns_value(self) -> bool {
        matches!(self, Self::FunRet | Self::FunRetDat | Self::FunRetDat2)
    }
}

/// Dispatch one `EXT_FUN*` invocation.
///
/// `addrs` holds the decoded data-addr operands in source order; if `kind`
/// returns a value, the last entry is the return destination and the
/// preceding entries are parameters.
pub fn dispatch<H: HostApi>(
    state: &mut MachineState,
    host: &H,
    func: FunctionCode,
    kind: ExtKind,
    addrs: &[u32],
) -> Result<(), RuntimeError<H::Error>> {
    if func.param_count() != kind.param_count() || func.returns_value() != kind.returns_value() {
        return Err(RuntimeError::Recoverable(PanicReason::IllegalOperation));
    }

    let params = if kind.returns_value() {
        &addrs[..addrs.len() - 1]
    } else {
        addrs
    };
    let return_dest = if kind.returns_value() {
        Some(addrs[addrs.len() - 1])
    } else {
        None
    };

    macro_rules! ret {
        ($value:expr) => {{
            let dest = return_dest.expect("returns_value checked above");
            state.write_cell(dest, $value)?;
            Ok(())
        }};
    }
    macro_rules! host_call {
        ($call:expr) => {
            $call.map_err(RuntimeError::Host)
        };
    }

    match func {
        FunctionCode::Echo => {
            let value = state.read_cell(params[0])?;
            tracing::info!(value, "ECHO");
            Ok(())
        }

        FunctionCode::GetA(n) => ret!(register::get_word(state, true, n)),
        FunctionCode::GetB(n) => ret!(register::get_word(state, false, n)),
        FunctionCode::GetADat => {
            register::get_dat(state, params[0], true)?;
            Ok(())
        }
        FunctionCode::GetBDat => {
            register::get_dat(state, params[0], false)?;
            Ok(())
        }
        FunctionCode::GetAInd => {
            register::get_ind(state, params[0], true)?;
            Ok(())
        }
        FunctionCode::GetBInd => {
            register::get_ind(state, params[0], false)?;
            Ok(())
        }
        FunctionCode::SetA(n) => {
            register::set_word(state, params[0], true, n)?;
            Ok(())
        }
        FunctionCode::SetB(n) => {
            register::set_word(state, params[0], false, n)?;
            Ok(())
        }
        FunctionCode::SetADat => {
            register::set_dat(state, params[0], true)?;
            Ok(())
        }
        FunctionCode::SetBDat => {
            register::set_dat(state, params[0], false)?;
            Ok(())
        }
        FunctionCode::SetAInd => {
            register::set_ind(state, params[0], true)?;
            Ok(())
        }
        FunctionCode::SetBInd => {
            register::set_ind(state, params[0], false)?;
            Ok(())
        }
        FunctionCode::ClearA => Ok(register::clear(state, true)),
        FunctionCode::ClearB => Ok(register::clear(state, false)),
        FunctionCode::CopyAFromB => Ok(register::copy_a_from_b(state)),
        FunctionCode::SwapAAndB => Ok(register::swap(state)),
        FunctionCode::OrAWithB => Ok(register::or_with_b(state)),
        FunctionCode::AndAWithB => Ok(register::and_with_b(state)),
        FunctionCode::XorAWithB => Ok(register::xor_with_b(state)),
        FunctionCode::CheckAIsZero => ret!(register::check_is_zero(state, true)),
        FunctionCode::CheckBIsZero => ret!(register::check_is_zero(state, false)),
        FunctionCode::CheckAEqualsB => ret!(register::check_a_equals_b(state)),
        FunctionCode::UnsignedCompareAWithB => ret!(register::unsigned_compare_a_with_b(state)),
        FunctionCode::SignedCompareAWithB => ret!(register::signed_compare_a_with_b(state)),

        FunctionCode::Md5IntoB => hash_into_b(state, params, HashAlgorithm::Md5),
        FunctionCode::Rmd160IntoB => hash_into_b(state, params, HashAlgorithm::Rmd160),
        FunctionCode::Sha256IntoB => hash_into_b(state, params, HashAlgorithm::Sha256),
        FunctionCode::Hash160IntoB => hash_into_b(state, params, HashAlgorithm::Hash160),
        FunctionCode::CheckMd5WithB => check_hash(state, params, return_dest, HashAlgorithm::Md5),
        FunctionCode::CheckRmd160WithB => check_hash(state, params, return_dest, HashAlgorithm::Rmd160),
        FunctionCode::CheckSha256WithB => check_hash(state, params, return_dest, HashAlgorithm::Sha256),
        FunctionCode::CheckHash160WithB => check_hash(state, params, return_dest, HashAlgorithm::Hash160),

        FunctionCode::GetBlockTimestamp => ret!(blockchain::block_timestamp(state)),
        FunctionCode::GetCreationTimestamp => ret!(blockchain::creation_timestamp(host, state)),
        FunctionCode::PutPreviousBlockHashIntoA => {
            host_call!(blockchain::previous_block_hash_into_a(host, state))
        }
        FunctionCode::PutTxAfterTimestampIntoA => {
            let timestamp = state.read_cell(params[0])?;
            host_call!(blockchain::tx_after_timestamp_into_a(host, timestamp, state))
        }
        FunctionCode::GetTypeForTxInA => {
            let v = host_call!(blockchain::type_for_tx_in_a(host, state))?;
            ret!(v as u64)
        }
        FunctionCode::GetAmountForTxInA => {
            let v = host_call!(blockchain::amount_for_tx_in_a(host, state))?;
            ret!(v as u64)
        }
        FunctionCode::GetTimestampForTxInA => {
            let v = host_call!(blockchain::timestamp_for_tx_in_a(host, state))?;
            ret!(v as u64)
        }
        FunctionCode::GenerateRandomUsingTxInA => {
            let v = host_call!(blockchain::generate_random_using_tx_in_a(host, state))?;
            ret!(v as u64)
        }
        FunctionCode::PutMessageFromTxInAIntoB => {
            host_call!(blockchain::message_from_tx_in_a_into_b(host, state))
        }
        FunctionCode::PutAddressFromTxInAIntoB => {
            host_call!(blockchain::address_from_tx_in_a_into_b(host, state))
        }
        FunctionCode::PutCreatorIntoB => host_call!(blockchain::creator_into_b(host, state)),

        FunctionCode::GetCurrentBalance => ret!(blockchain::current_balance(host, state)),
        FunctionCode::GetPreviousBalance => ret!(blockchain::previous_balance(state)),
        FunctionCode::PayAmountToB => {
            let amount = state.read_cell(params[0])?;
            host_call!(blockchain::pay_to_b(host, amount, state))?;
            finish_if_drained(state);
            Ok(())
        }
        FunctionCode::PayAllToB => {
            let amount = host.current_balance(state);
            host_call!(blockchain::pay_to_b(host, amount, state))?;
            finish_if_drained(state);
            Ok(())
        }
        FunctionCode::PayPreviousToB => {
            let amount = state.previous_balance;
            host_call!(blockchain::pay_to_b(host, amount, state))?;
            finish_if_drained(state);
            Ok(())
        }
        FunctionCode::MessageAToB => host_call!(blockchain::message_a_to_b(host, state)),
        FunctionCode::AddMinutesToTimestamp => {
            let timestamp = state.read_cell(params[0])?;
            let minutes = state.read_cell(params[1])?;
            let v = host_call!(blockchain::add_minutes_to_timestamp(host, timestamp, minutes))?;
            ret!(v as u64)
        }

        FunctionCode::Platform(raw) => host_call!(platform::dispatch(host, raw, state)),
    }
}

fn hash_into_b<H>(
    state: &mut MachineState,
    params: &[u32],
    algorithm: HashAlgorithm,
) -> Result<(), RuntimeError<H>> {
    let start = u32::try_from(state.read_cell(params[0])?).map_err(|_| PanicReason::InvalidAddress)?;
    let length = u32::try_from(state.read_cell(params[1])?).map_err(|_| PanicReason::InvalidAddress)?;
    crypto::hash_into_b(state, algorithm, start, length)?;
    Ok(())
}

fn check_hash<H>(
    state: &mut MachineState,
    params: &[u32],
    return_dest: Option<u32>,
    algorithm: HashAlgorithm,
) -> Result<(), RuntimeError<H>> {
    let start = u32::try_from(state.read_cell(params[0])?).map_err(|_| PanicReason::InvalidAddress)?;
    let length = u32::try_from(state.read_cell(params[1])?).map_err(|_| PanicReason::InvalidAddress)?;
    let result = crypto::check_hash_with_b(state, algorithm, start, length)?;
    let dest = return_dest.expect("check functions always return a value");
    state.write_cell(dest, result)?;
    Ok(())
}

/// Spec §9 open question (iii): finish the AT when a `PAY_*_TO_B` call
/// drains its balance to zero, matching the later source.
fn finish_if_drained(state: &mut MachineState) {
    if state.current_balance == 0 {
        state.flags.insert(crate::state::Flags::IS_FINISHED);
    }
}
