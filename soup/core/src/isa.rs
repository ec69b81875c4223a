//! Opcode table for the soup instruction set.
//!
//! Opcodes are single bytes `0x00..=0x1f`. `nop_0`/`nop_1` double as template
//! marker bits when the resolver scans them; during fetch they are plain no-ops.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_OPCODE;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Opcode {
    Nop0 = 0x00,
    Nop1 = 0x01,
    Or1 = 0x02,
    Shl = 0x03,
    Zero = 0x04,
    IfCz = 0x05,
    SubAb = 0x06,
    SubAc = 0x07,
    IncA = 0x08,
    IncB = 0x09,
    DecC = 0x0a,
    IncC = 0x0b,
    PushAx = 0x0c,
    PushBx = 0x0d,
    PushCx = 0x0e,
    PushDx = 0x0f,
    PopAx = 0x10,
    PopBx = 0x11,
    PopCx = 0x12,
    PopDx = 0x13,
    Jmp = 0x14,
    Jmpb = 0x15,
    Call = 0x16,
    Ret = 0x17,
    MovCd = 0x18,
    MovAb = 0x19,
    MovIab = 0x1a,
    Adr = 0x1b,
    Adrb = 0x1c,
    Adrf = 0x1d,
    Mal = 0x1e,
    Divide = 0x1f,
}

/// Dense table indexed by opcode value.
pub const OPCODES: [Opcode; 32] = [
    Opcode::Nop0,
    Opcode::Nop1,
    Opcode::Or1,
    Opcode::Shl,
    Opcode::Zero,
    Opcode::IfCz,
    Opcode::SubAb,
    Opcode::SubAc,
    Opcode::IncA,
    Opcode::IncB,
    Opcode::DecC,
    Opcode::IncC,
    Opcode::PushAx,
    Opcode::PushBx,
    Opcode::PushCx,
    Opcode::PushDx,
    Opcode::PopAx,
    Opcode::PopBx,
    Opcode::PopCx,
    Opcode::PopDx,
    Opcode::Jmp,
    Opcode::Jmpb,
    Opcode::Call,
    Opcode::Ret,
    Opcode::MovCd,
    Opcode::MovAb,
    Opcode::MovIab,
    Opcode::Adr,
    Opcode::Adrb,
    Opcode::Adrf,
    Opcode::Mal,
    Opcode::Divide,
];

/// Mnemonic prefixes in match order. Mnemonics that extend a shorter one
/// (`jmpb`/`jmp`, `adrb`/`adrf`/`adr`) must come first.
pub const MNEMONIC_PREFIXES: [(&str, Opcode); 32] = [
    ("nop_0", Opcode::Nop0),
    ("nop_1", Opcode::Nop1),
    ("or1", Opcode::Or1),
    ("shl", Opcode::Shl),
    ("zero", Opcode::Zero),
    ("if_cz", Opcode::IfCz),
    ("sub_ab", Opcode::SubAb),
    ("sub_ac", Opcode::SubAc),
    ("inc_a", Opcode::IncA),
    ("inc_b", Opcode::IncB),
    ("dec_c", Opcode::DecC),
    ("inc_c", Opcode::IncC),
    ("push_ax", Opcode::PushAx),
    ("push_bx", Opcode::PushBx),
    ("push_cx", Opcode::PushCx),
    ("push_dx", Opcode::PushDx),
    ("pop_ax", Opcode::PopAx),
    ("pop_bx", Opcode::PopBx),
    ("pop_cx", Opcode::PopCx),
    ("pop_dx", Opcode::PopDx),
    ("jmpb", Opcode::Jmpb),
    ("jmp", Opcode::Jmp),
    ("call", Opcode::Call),
    ("ret", Opcode::Ret),
    ("mov_cd", Opcode::MovCd),
    ("mov_ab", Opcode::MovAb),
    ("mov_iab", Opcode::MovIab),
    ("adrb", Opcode::Adrb),
    ("adrf", Opcode::Adrf),
    ("adr", Opcode::Adr),
    ("mal", Opcode::Mal),
    ("divide", Opcode::Divide),
];

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        if byte > MAX_OPCODE {
            return None;
        }
        Some(OPCODES[byte as usize])
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop0 => "nop_0",
            Opcode::Nop1 => "nop_1",
            Opcode::Or1 => "or1",
            Opcode::Shl => "shl",
            Opcode::Zero => "zero",
            Opcode::IfCz => "if_cz",
            Opcode::SubAb => "sub_ab",
            Opcode::SubAc => "sub_ac",
            Opcode::IncA => "inc_a",
            Opcode::IncB => "inc_b",
            Opcode::DecC => "dec_c",
            Opcode::IncC => "inc_c",
            Opcode::PushAx => "push_ax",
            Opcode::PushBx => "push_bx",
            Opcode::PushCx => "push_cx",
            Opcode::PushDx => "push_dx",
            Opcode::PopAx => "pop_ax",
            Opcode::PopBx => "pop_bx",
            Opcode::PopCx => "pop_cx",
            Opcode::PopDx => "pop_dx",
            Opcode::Jmp => "jmp",
            Opcode::Jmpb => "jmpb",
            Opcode::Call => "call",
            Opcode::Ret => "ret",
            Opcode::MovCd => "mov_cd",
            Opcode::MovAb => "mov_ab",
            Opcode::MovIab => "mov_iab",
            Opcode::Adr => "adr",
            Opcode::Adrb => "adrb",
            Opcode::Adrf => "adrf",
            Opcode::Mal => "mal",
            Opcode::Divide => "divide",
        }
    }

    /// Match the start of an assembly line against the mnemonic table.
    pub fn from_line_prefix(line: &str) -> Option<Self> {
        MNEMONIC_PREFIXES
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(_, opcode)| *opcode)
    }

    /// Opcodes that are reserved but do nothing until control transfer and
    /// reproduction are defined.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            Opcode::Jmp
                | Opcode::Jmpb
                | Opcode::Call
                | Opcode::Ret
                | Opcode::Adr
                | Opcode::Mal
                | Opcode::Divide
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
