//! Function-code table for the `EXT_FUN` family (spec §4.3): register
//! access, hashing, block/transaction queries, payments, and platform
//! passthrough, each carrying `(param_count, returns_value)` so the
//! decoder's EXT_FUN variant picked by the caller can be checked against
//! what the function actually expects.

/// A two-byte function code. Platform codes (`0x0500..=0x06FF`) carry their
/// raw value through unchanged for the host to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCode {
    Echo,
    GetA(u8),
    GetB(u8),
    GetAInd,
    GetBInd,
    GetADat,
    GetBDat,
    SetA(u8),
    SetB(u8),
    SetAInd,
    SetBInd,
    SetADat,
    SetBDat,
    ClearA,
    ClearB,
    CopyAFromB,
    SwapAAndB,
    OrAWithB,
    AndAWithB,
    XorAWithB,
    CheckAIsZero,
    CheckBIsZero,
    CheckAEqualsB,
    UnsignedCompareAWithB,
    SignedCompareAWithB,
    Md5IntoB,
    CheckMd5WithB,
    Rmd160IntoB,
    CheckRmd160WithB,
    Sha256IntoB,
    CheckSha256WithB,
    Hash160IntoB,
    CheckHash160WithB,
    GetBlockTimestamp,
    GetCreationTimestamp,
    PutPreviousBlockHashIntoA,
    PutTxAfterTimestampIntoA,
    GetTypeForTxInA,
    GetAmountForTxInA,
    GetTimestampForTxInA,
    GenerateRandomUsingTxInA,
    PutMessageFromTxInAIntoB,
    PutAddressFromTxInAIntoB,
    PutCreatorIntoB,
    GetCurrentBalance,
    GetPreviousBalance,
    PayAmountToB,
    PayAllToB,
    PayPreviousToB,
    MessageAToB,
    AddMinutesToTimestamp,
    /// `0x0500..=0x06FF`: dispatched to the host unchanged
    /// (`HostApi::platform_specific_post_check_execute`).
    Platform(u16),
}

impl FunctionCode {
    /// Parse a raw 2-byte function code.
    pub fn from_raw(raw: u16) -> Option<Self> {
        Some(match raw {
            0x0001 => Self::Echo,
            0x0100..=0x0103 => Self::GetA((raw - 0x0100) as u8),
            0x0104..=0x0107 => Self::GetB((raw - 0x0104) as u8),
            0x0108 => Self::GetAInd,
            0x0109 => Self::GetBInd,
            0x010A => Self::GetADat,
            0x010B => Self::GetBDat,
            0x0110..=0x0113 => Self::SetA((raw - 0x0110) as u8),
            0x0114..=0x0117 => Self::SetB((raw - 0x0114) as u8),
            0x0118 => Self::SetAInd,
            0x0119 => Self::SetBInd,
            0x011A => Self::SetADat,
            0x011B => Self::SetBDat,
            0x0120 => Self::ClearA,
            0x0121 => Self::ClearB,
            0x0122 => Self::CopyAFromB,
            0x0123 => Self::SwapAAndB,
            0x0124 => Self::OrAWithB,
            0x0125 => Self::AndAWithB,
            0x0126 => Self::XorAWithB,
            0x0127 => Self::CheckAIsZero,
            0x0128 => Self::CheckBIsZero,
            0x0129 => Self::CheckAEqualsB,
            0x012A => Self::UnsignedCompareAWithB,
            0x012B => Self::SignedCompareAWithB,
            0x0200 => Self::Md5IntoB,
            0x0201 => Self::CheckMd5WithB,
            0x0202 => Self::Rmd160IntoB,
            0x0203 => Self::CheckRmd160WithB,
            0x0204 => Self::Sha256IntoB,
            0x0205 => Self::CheckSha256WithB,
            0x0206 => Self::Hash160IntoB,
            0x0207 => Self::CheckHash160WithB,
            0x0300 => Self::GetBlockTimestamp,
            0x0301 => Self::GetCreationTimestamp,
            0x0302 => Self::PutPreviousBlockHashIntoA,
            0x0303 => Self::PutTxAfterTimestampIntoA,
            0x0304 => Self::GetTypeForTxInA,
            0x0305 => Self::GetAmountForTxInA,
            0x0306 => Self::GetTimestampForTxInA,
            0x0307 => Self::GenerateRandomUsingTxInA,
            0x0308 => Self::PutMessageFromTxInAIntoB,
            0x0309 => Self::PutAddressFromTxInAIntoB,
            0x030A => Self::PutCreatorIntoB,
            0x0400 => Self::GetCurrentBalance,
            0x0401 => Self::GetPreviousBalance,
            0x0402 => Self::PayAmountToB,
            0x0403 => Self::PayAllToB,
            0x0404 => Self::PayPreviousToB,
            0x0405 => Self::MessageAToB,
            0x0406 => Self::AddMinutesToTimestamp,
            0x0500..=0x06FF => Self::Platform(raw),
            _ => return None,
        })
    }

    /// Raw wire value.
    pub const fn raw(self) -> u16 {
        match self {
            Self::Echo => 0x0001,
            Self::GetA(n) => 0x0100 + n as u16,
            Self::GetB(n) => 0x0104 + n as u16,
            Self::GetAInd => 0x0108,
            Self::GetBInd => 0x0109,
            Self::GetADat => 0x010A,
            Self::GetBDat => 0x010B,
            Self::SetA(n) => 0x0110 + n as u16,
            Self::SetB(n) => 0x0114 + n as u16,
            Self::SetAInd => 0x0118,
            Self::SetBInd => 0x0119,
            Self::SetADat => 0x011A,
            Self::SetBDat => 0x011B,
            Self::ClearA => 0x0120,
            Self::ClearB => 0x0121,
            Self::CopyAFromB => 0x0122,
            Self::SwapAAndB => 0x0123,
            Self::OrAWithB => 0x0124,
            Self::AndAWithB => 0x0125,
            Self::XorAWithB => 0x0126,
            Self::CheckAIsZero => 0x0127,
            Self::CheckBIsZero => 0x0128,
            Self::CheckAEqualsB => 0x0129,
            Self::UnsignedCompareAWithB => 0x012A,
            Self::SignedCompareAWithB => 0x012B,
            Self::Md5IntoB => 0x0200,
            Self::CheckMd5WithB => 0x0201,
            Self::Rmd160IntoB => 0x0202,
            Self::CheckRmd160WithB => 0x0203,
            Self::Sha256IntoB => 0x0204,
            Self::CheckSha256WithB => 0x0205,
            Self::Hash160IntoB => 0x0206,
            Self::CheckHash160WithB => 0x0207,
            Self::GetBlockTimestamp => 0x0300,
            Self::GetCreationTimestamp => 0x0301,
            Self::PutPreviousBlockHashIntoA => 0x0302,
            Self::PutTxAfterTimestampIntoA => 0x0303,
            Self::GetTypeForTxInA => 0x0304,
            Self::GetAmountForTxInA => 0x0305,
            Self::GetTimestampForTxInA => 0x0306,
            Self::GenerateRandomUsingTxInA => 0x0307,
            Self::PutMessageFromTxInAIntoB => 0x0308,
            Self::PutAddressFromTxInAIntoB => 0x0309,
            Self::PutCreatorIntoB => 0x030A,
            Self::GetCurrentBalance => 0x0400,
            Self::GetPreviousBalance => 0x0401,
            Self::PayAmountToB => 0x0402,
            Self::PayAllToB => 0x0403,
            Self::PayPreviousToB => 0x0404,
            Self::MessageAToB => 0x0405,
            Self::AddMinutesToTimestamp => 0x0406,
            Self::Platform(raw) => raw,
        }
    }

    /// Number of `data-addr` parameters the EXT_FUN variant must supply.
    pub const fn param_count(self) -> u8 {
        match self {
            Self::Echo
            | Self::SetA(_)
            | Self::SetB(_)
            | Self::SetAInd
            | Self::SetBInd
            | Self::SetADat
            | Self::SetBDat
            | Self::GetAInd
            | Self::GetBInd
            | Self::GetADat
            | Self::GetBDat
            | Self::PutTxAfterTimestampIntoA
            | Self::PayAmountToB => 1,
            Self::Md5IntoB
            | Self::CheckMd5WithB
            | Self::Rmd160IntoB
            | Self::CheckRmd160WithB
            | Self::Sha256IntoB
            | Self::CheckSha256WithB
            | Self::Hash160IntoB
            | Self::CheckHash160WithB
            | Self::AddMinutesToTimestamp => 2,
            Self::Platform(_) => 0,
            _ => 0,
        }
    }

    /// Whether this function produces a value for `EXT_FUN_RET*` callers.
    pub const fn returns_value(self) -> bool {
        matches!(
            self,
            Self::GetA(_)
                | Self::GetB(_)
                | Self::CheckMd5WithB
                | Self::CheckRmd160WithB
                | Self::CheckSha256WithB
                | Self::CheckHash160WithB
                | Self::CheckAIsZero
                | Self::CheckBIsZero
                | Self::CheckAEqualsB
                | Self::UnsignedCompareAWithB
                | Self::SignedCompareAWithB
                | Self::GetBlockTimestamp
                | Self::GetCreationTimestamp
                | Self::GetTypeForTxInA
                | Self::GetAmountForTxInA
                | Self::GetTimestampForTxInA
                | Self::GenerateRandomUsingTxInA
                | Self::GetCurrentBalance
                | Self::GetPreviousBalance
                | Self::AddMinutesToTimestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_named_codes() {
        for raw in [0x0001, 0x0100, 0x0107, 0x010A, 0x0200, 0x0207, 0x0307, 0x0406] {
            let code = FunctionCode::from_raw(raw).unwrap();
            assert_eq!(code.raw(), raw);
        }
    }

    #[test]
    fn platform_range_passes_through() {
        let code = FunctionCode::from_raw(0x0642).unwrap();
        assert_eq!(code, FunctionCode::Platform(0x0642));
        assert_eq!(code.raw(), 0x0642);
    }

    #[test]
    fn out_of_range_code_is_none() {
        assert_eq!(FunctionCode::from_raw(0x0700), None);
        assert_eq!(FunctionCode::from_raw(0x011C), None);
    }

    #[test]
    fn hash_functions_take_two_params() {
        assert_eq!(FunctionCode::Sha256IntoB.param_count(), 2);
        assert!(!FunctionCode::Sha256IntoB.returns_value());
        assert!(FunctionCode::CheckSha256WithB.returns_value());
    }
}
