//! Instruction decoder (spec §4.1): the one-byte opcode alphabet, their
//! operand shapes, and a decoder that walks the code segment.
//!
//! Grounded on `fuel-asm/src/opcode.rs`'s tagged-enum-plus-repr(u8) shape,
//! collapsed from its generic register-operand encoding onto this system's
//! closed operand alphabet (value / data-addr / code-addr / offset /
//! func-code), matching spec §9's "tagged opcode enum... with `(mnemonic,
//! operand-shape, steps-default)` metadata" guidance.

pub mod function;

use crate::codec::{Cursor, Endianness};
use crate::error::PanicReason;

/// One-byte opcodes (spec §4.1 table). Discriminants are this
/// implementation's own and carry no significance beyond internal
/// consistency, the source table names opcodes, not byte values.
///
/// `NOP` deliberately does not take `0x00`: the disassembler (spec §4.6)
/// skips runs of zero bytes as inter-instruction padding, so a zero opcode
/// byte would make `NOP` indistinguishable from padding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum OpCode {
    SetVal = 0x01,
    SetDat = 0x02,
    ClrDat = 0x03,
    SetInd = 0x04,
    SetIdx = 0x05,
    IndDat = 0x06,
    IdxDat = 0x07,
    IncDat = 0x08,
    DecDat = 0x09,
    AddDat = 0x0A,
    SubDat = 0x0B,
    MulDat = 0x0C,
    DivDat = 0x0D,
    ModDat = 0x0E,
    BorDat = 0x0F,
    AndDat = 0x10,
    XorDat = 0x11,
    NotDat = 0x12,
    ShlDat = 0x13,
    ShrDat = 0x14,
    Bzr = 0x15,
    Bnz = 0x16,
    Bgt = 0x17,
    Blt = 0x18,
    Bge = 0x19,
    Ble = 0x1A,
    Beq = 0x1B,
    Bne = 0x1C,
    PshDat = 0x1D,
    PopDat = 0x1E,
    JmpAdr = 0x1F,
    JmpSub = 0x20,
    RetSub = 0x21,
    Slp = 0x22,
    SlpDat = 0x23,
    Stp = 0x24,
    Stz = 0x25,
    Fin = 0x26,
    Fiz = 0x27,
    Err = 0x28,
    SetPcs = 0x29,
    ExtFun = 0x2A,
    ExtFunDat = 0x2B,
    ExtFunDat2 = 0x2C,
    ExtFunRet = 0x2D,
    ExtFunRetDat = 0x2E,
    ExtFunRetDat2 = 0x2F,
    Nop = 0x30,
}

impl OpCode {
    /// Parse a raw opcode byte.
    pub fn from_byte(byte: u8) -> Result<Self, PanicReason> {
        use strum::IntoEnumIterator;
        Self::iter()
            .find(|op| *op as u8 == byte)
            .ok_or(PanicReason::IllegalOperation)
    }

    /// Mnemonic, as used by the disassembler.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::SetVal => "SET_VAL",
            Self::SetDat => "SET_DAT",
            Self::ClrDat => "CLR_DAT",
            Self::SetInd => "SET_IND",
            Self::SetIdx => "SET_IDX",
            Self::IndDat => "IND_DAT",
            Self::IdxDat => "IDX_DAT",
            Self::IncDat => "INC_DAT",
            Self::DecDat => "DEC_DAT",
            Self::AddDat => "ADD_DAT",
            Self::SubDat => "SUB_DAT",
            Self::MulDat => "MUL_DAT",
            Self::DivDat => "DIV_DAT",
            Self::ModDat => "MOD_DAT",
            Self::BorDat => "BOR_DAT",
            Self::AndDat => "AND_DAT",
            Self::XorDat => "XOR_DAT",
            Self::NotDat => "NOT_DAT",
            Self::ShlDat => "SHL_DAT",
            Self::ShrDat => "SHR_DAT",
            Self::Bzr => "BZR",
            Self::Bnz => "BNZ",
            Self::Bgt => "BGT",
            Self::Blt => "BLT",
            Self::Bge => "BGE",
            Self::Ble => "BLE",
            Self::Beq => "BEQ",
            Self::Bne => "BNE",
            Self::PshDat => "PSH_DAT",
            Self::PopDat => "POP_DAT",
            Self::JmpAdr => "JMP_ADR",
            Self::JmpSub => "JMP_SUB",
            Self::RetSub => "RET_SUB",
            Self::Slp => "SLP",
            Self::SlpDat => "SLP_DAT",
            Self::Stp => "STP",
            Self::Stz => "STZ",
            Self::Fin => "FIN",
            Self::Fiz => "FIZ",
            Self::Err => "ERR",
            Self::SetPcs => "SET_PCS",
            Self::ExtFun => "EXT_FUN",
            Self::ExtFunDat => "EXT_FUN_DAT",
            Self::ExtFunDat2 => "EXT_FUN_DAT_2",
            Self::ExtFunRet => "EXT_FUN_RET",
            Self::ExtFunRetDat => "EXT_FUN_RET_DAT",
            Self::ExtFunRetDat2 => "EXT_FUN_RET_DAT_2",
        }
    }

    /// Default per-opcode step cost, used unless the host overrides via
    /// `opcode_steps` (spec §4.4).
    pub const fn default_steps(self) -> u32 {
        match self {
            Self::Nop => 1,
            Self::ExtFun
            | Self::ExtFunDat
            | Self::ExtFunDat2
            | Self::ExtFunRet
            | Self::ExtFunRetDat
            | Self::ExtFunRetDat2 => 10,
            _ => 1,
        }
    }
}

/// Decoded operand values for one opcode invocation (spec §4.1's operand
/// alphabet: value / data-addr / code-addr / offset / func-code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    None,
    Value(u64),
    DataAddr(u32),
    DataAddrValue(u32, u64),
    DataAddr2(u32, u32),
    DataAddr3(u32, u32, u32),
    DataAddrOffset(u32, i8),
    DataAddr2Offset(u32, u32, i8),
    CodeAddr(u32),
    FuncCode(u16),
    FuncCodeDataAddr1(u16, u32),
    FuncCodeDataAddr2(u16, u32, u32),
    FuncCodeDataAddr3(u16, u32, u32, u32),
}

/// One fully-decoded instruction: the opcode, its operands, and the code
/// offset the opcode byte itself started at (branches jump relative to this,
/// not the post-decode cursor position, spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub operands: Operands,
    pub opcode_start: u32,
}

/// Decode one instruction from `cursor`, using `order` for multi-byte
/// operand scalars (the version's header/scalar byte order; data-segment
/// cell contents are handled separately and are always little-endian).
pub fn decode(cursor: &mut Cursor, order: Endianness) -> Result<Instruction, PanicReason> {
    let opcode_start = u32::try_from(cursor.position()).map_err(|_| PanicReason::CodeSegment)?;
    let opcode = OpCode::from_byte(cursor.read_u8()?)?;

    let operands = match opcode {
        OpCode::Nop
        | OpCode::RetSub
        | OpCode::Slp
        | OpCode::Stp
        | OpCode::Fin
        | OpCode::SetPcs => Operands::None,

        OpCode::SlpDat
        | OpCode::ClrDat
        | OpCode::IncDat
        | OpCode::DecDat
        | OpCode::NotDat
        | OpCode::PshDat
        | OpCode::PopDat
        | OpCode::Stz
        | OpCode::Fiz => Operands::DataAddr(read_data_addr(cursor, order)?),

        OpCode::SetVal => {
            let addr = read_data_addr(cursor, order)?;
            let value = cursor.read_u64(order)?;
            Operands::DataAddrValue(addr, value)
        }

        OpCode::SetDat
        | OpCode::SetInd
        | OpCode::IndDat
        | OpCode::AddDat
        | OpCode::SubDat
        | OpCode::MulDat
        | OpCode::DivDat
        | OpCode::ModDat
        | OpCode::BorDat
        | OpCode::AndDat
        | OpCode::XorDat
        | OpCode::ShlDat
        | OpCode::ShrDat => {
            let a = read_data_addr(cursor, order)?;
            let b = read_data_addr(cursor, order)?;
            Operands::DataAddr2(a, b)
        }

        OpCode::SetIdx | OpCode::IdxDat => {
            let a = read_data_addr(cursor, order)?;
            let b = read_data_addr(cursor, order)?;
            let c = read_data_addr(cursor, order)?;
            Operands::DataAddr3(a, b, c)
        }

        OpCode::Bzr | OpCode::Bnz => {
            let addr = read_data_addr(cursor, order)?;
            let offset = cursor.read_i8()?;
            Operands::DataAddrOffset(addr, offset)
        }

        OpCode::Bgt | OpCode::Blt | OpCode::Bge | OpCode::Ble | OpCode::Beq | OpCode::Bne => {
            let a = read_data_addr(cursor, order)?;
            let b = read_data_addr(cursor, order)?;
            let offset = cursor.read_i8()?;
            Operands::DataAddr2Offset(a, b, offset)
        }

        OpCode::JmpAdr | OpCode::JmpSub => Operands::CodeAddr(cursor.read_u32(order)?),

        OpCode::Err => Operands::CodeAddr(cursor.read_u32(order)?),

        OpCode::ExtFun => Operands::FuncCode(cursor.read_u16(order)?),
        OpCode::ExtFunDat | OpCode::ExtFunRet => {
            let func = cursor.read_u16(order)?;
            let a = read_data_addr(cursor, order)?;
            Operands::FuncCodeDataAddr1(func, a)
        }
        OpCode::ExtFunDat2 | OpCode::ExtFunRetDat => {
            let func = cursor.read_u16(order)?;
            let a = read_data_addr(cursor, order)?;
            let b = read_data_addr(cursor, order)?;
            Operands::FuncCodeDataAddr2(func, a, b)
        }
        OpCode::ExtFunRetDat2 => {
            let func = cursor.read_u16(order)?;
            let a = read_data_addr(cursor, order)?;
            let b = read_data_addr(cursor, order)?;
            let c = read_data_addr(cursor, order)?;
            Operands::FuncCodeDataAddr3(func, a, b, c)
        }
    };

    Ok(Instruction {
        opcode,
        operands,
        opcode_start,
    })
}

fn read_data_addr(cursor: &mut Cursor, order: Endianness) -> Result<u32, PanicReason> {
    cursor.read_u32(order)
}
