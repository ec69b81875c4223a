use serde::{Deserialize, Serialize};

use crate::constants::STACK_SIZE;
use crate::soup::wrap;

/// General-purpose registers of a creature CPU.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Register {
    // address registers
    AX,
    BX,
    // numeric registers
    CX,
    DX,
}

/// Conditions an instruction could not complete.
///
/// Faults are recorded on the CPU and never stop execution.
#[derive(thiserror::Error, Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("no complementary template found")]
    TemplateNotFound,
}

/// Register, stack and flag context for one creature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cpu {
    #[serde(default)]
    pub ax: i64,
    #[serde(default)]
    pub bx: i64,
    #[serde(default)]
    pub cx: i64,
    #[serde(default)]
    pub dx: i64,
    #[serde(default)]
    pub sp: usize,
    #[serde(default)]
    pub stack: [i64; STACK_SIZE],
    #[serde(default)]
    pub ip: i64,
    /// Sticky error flag; set by any fault and never cleared by the machine.
    #[serde(default)]
    pub fl: bool,
    #[serde(default)]
    pub last_fault: Option<Fault>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            ax: 0,
            bx: 0,
            cx: 0,
            dx: 0,
            sp: 0,
            stack: [0; STACK_SIZE],
            ip: 0,
            fl: false,
            last_fault: None,
        }
    }

    /// CPU whose instruction pointer starts at `ip` (normalized into the soup).
    pub fn at(ip: i64) -> Self {
        Self {
            ip: wrap(ip) as i64,
            ..Self::new()
        }
    }

    pub fn get(&self, reg: Register) -> i64 {
        match reg {
            Register::AX => self.ax,
            Register::BX => self.bx,
            Register::CX => self.cx,
            Register::DX => self.dx,
        }
    }

    pub fn set(&mut self, reg: Register, value: i64) {
        match reg {
            Register::AX => self.ax = value,
            Register::BX => self.bx = value,
            Register::CX => self.cx = value,
            Register::DX => self.dx = value,
        }
    }

    /// Push a register onto the stack.
    ///
    /// The push only succeeds while `sp + 1 < STACK_SIZE`, so the topmost
    /// cell is never written. A failed push leaves the stack untouched.
    pub fn push(&mut self, reg: Register) -> Result<(), Fault> {
        if self.sp + 1 < STACK_SIZE {
            self.stack[self.sp] = self.get(reg);
            self.sp += 1;
            Ok(())
        } else {
            Err(Fault::StackOverflow)
        }
    }

    /// Pop the top of the stack into a register. Fails without side effects when empty.
    pub fn pop(&mut self, reg: Register) -> Result<(), Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow);
        }
        self.sp -= 1;
        let value = self.stack[self.sp];
        self.set(reg, value);
        Ok(())
    }

    /// `sp` may sit anywhere in `0..=STACK_SIZE`; state restored from outside
    /// the machine is checked against that before it runs.
    pub fn stack_pointer_in_range(&self) -> bool {
        self.sp <= STACK_SIZE
    }

    /// Record a fault: raise the sticky flag and remember the cause.
    pub fn record_fault(&mut self, fault: Fault) {
        self.fl = true;
        self.last_fault = Some(fault);
    }
}
