//! Instruction handlers and the opcode dispatch table.
//!
//! Every handler is a total function over the CPU and the soup. Failures are
//! returned as [`Fault`] values and recorded by [`execute_step`]; nothing here
//! panics or changes control flow on a fault.

use crate::cpu::{Cpu, Fault, Register};
use crate::isa::{Opcode, OPCODES};
use crate::soup::{wrap, Soup};
use crate::template::{resolve_template, search, Direction};

pub type Handler = fn(&mut Cpu, &mut Soup) -> Result<(), Fault>;

/// What a single fetch cycle did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Executed(u8),
    Faulted(u8, Fault),
    /// Byte with no registered handler; skipped without side effects.
    Ignored(u8),
}

impl StepOutcome {
    pub fn opcode(self) -> u8 {
        match self {
            StepOutcome::Executed(op) | StepOutcome::Faulted(op, _) | StepOutcome::Ignored(op) => {
                op
            }
        }
    }

    pub fn fault(self) -> Option<Fault> {
        match self {
            StepOutcome::Faulted(_, fault) => Some(fault),
            _ => None,
        }
    }
}

fn nop(_cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    Ok(())
}

fn reserved(cpu: &mut Cpu, soup: &mut Soup) -> Result<(), Fault> {
    tracing::trace!(
        ip = cpu.ip,
        opcode = soup.read(cpu.ip),
        "reserved opcode has no behaviour yet"
    );
    Ok(())
}

fn or1(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.cx ^= 1;
    Ok(())
}

fn shl(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.cx = cpu.cx.wrapping_shl(1);
    Ok(())
}

fn zero(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.cx = 0;
    Ok(())
}

fn if_cz(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    if cpu.cx == 0 {
        cpu.ip += 1;
    }
    Ok(())
}

fn sub_ab(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.cx = cpu.ax.wrapping_sub(cpu.bx);
    Ok(())
}

fn sub_ac(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.ax = cpu.ax.wrapping_sub(cpu.cx);
    Ok(())
}

fn inc_a(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.ax = cpu.ax.wrapping_add(1);
    Ok(())
}

fn inc_b(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.bx = cpu.bx.wrapping_add(1);
    Ok(())
}

fn dec_c(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.cx = cpu.cx.wrapping_sub(1);
    Ok(())
}

fn inc_c(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.cx = cpu.cx.wrapping_add(1);
    Ok(())
}

fn push_ax(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.push(Register::AX)
}

fn push_bx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.push(Register::BX)
}

fn push_cx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.push(Register::CX)
}

fn push_dx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.push(Register::DX)
}

fn pop_ax(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.pop(Register::AX)
}

fn pop_bx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.pop(Register::BX)
}

fn pop_cx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.pop(Register::CX)
}

fn pop_dx(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.pop(Register::DX)
}

fn mov_cd(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.dx = cpu.cx;
    Ok(())
}

fn mov_ab(cpu: &mut Cpu, _soup: &mut Soup) -> Result<(), Fault> {
    cpu.bx = cpu.ax;
    Ok(())
}

// Copy one byte from [BX] to [AX].
fn mov_iab(cpu: &mut Cpu, soup: &mut Soup) -> Result<(), Fault> {
    let byte = soup.read(cpu.bx);
    soup.write(cpu.ax, byte);
    Ok(())
}

fn address_of_complement(cpu: &mut Cpu, soup: &Soup, direction: Direction) -> Result<(), Fault> {
    let template = resolve_template(soup, cpu.ip);
    match search(soup, cpu.ip, template, direction) {
        Some(address) => {
            cpu.ax = address as i64;
            Ok(())
        }
        None => Err(Fault::TemplateNotFound),
    }
}

fn adrb(cpu: &mut Cpu, soup: &mut Soup) -> Result<(), Fault> {
    address_of_complement(cpu, soup, Direction::Backward)
}

fn adrf(cpu: &mut Cpu, soup: &mut Soup) -> Result<(), Fault> {
    address_of_complement(cpu, soup, Direction::Forward)
}

/// Built-in handler for an opcode.
pub fn handler_for(opcode: Opcode) -> Handler {
    match opcode {
        Opcode::Nop0 | Opcode::Nop1 => nop,
        Opcode::Or1 => or1,
        Opcode::Shl => shl,
        Opcode::Zero => zero,
        Opcode::IfCz => if_cz,
        Opcode::SubAb => sub_ab,
        Opcode::SubAc => sub_ac,
        Opcode::IncA => inc_a,
        Opcode::IncB => inc_b,
        Opcode::DecC => dec_c,
        Opcode::IncC => inc_c,
        Opcode::PushAx => push_ax,
        Opcode::PushBx => push_bx,
        Opcode::PushCx => push_cx,
        Opcode::PushDx => push_dx,
        Opcode::PopAx => pop_ax,
        Opcode::PopBx => pop_bx,
        Opcode::PopCx => pop_cx,
        Opcode::PopDx => pop_dx,
        Opcode::MovCd => mov_cd,
        Opcode::MovAb => mov_ab,
        Opcode::MovIab => mov_iab,
        Opcode::Adrb => adrb,
        Opcode::Adrf => adrf,
        Opcode::Jmp
        | Opcode::Jmpb
        | Opcode::Call
        | Opcode::Ret
        | Opcode::Adr
        | Opcode::Mal
        | Opcode::Divide => reserved,
    }
}

/// Opcode-indexed handler table.
///
/// The standard table covers `0x00..=0x1f`; further opcodes can be registered
/// without touching the fetch loop.
#[derive(Clone)]
pub struct Dispatch {
    handlers: [Option<Handler>; 256],
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered = self.handlers.iter().filter(|h| h.is_some()).count();
        f.debug_struct("Dispatch")
            .field("registered", &registered)
            .finish()
    }
}

impl Dispatch {
    pub fn empty() -> Self {
        Self {
            handlers: [None; 256],
        }
    }

    pub fn standard() -> Self {
        let mut table = Self::empty();
        for opcode in OPCODES {
            table.register(opcode.byte(), handler_for(opcode));
        }
        table
    }

    /// Install `handler` for `opcode`, returning the one it replaces.
    pub fn register(&mut self, opcode: u8, handler: Handler) -> Option<Handler> {
        self.handlers[opcode as usize].replace(handler)
    }

    pub fn lookup(&self, opcode: u8) -> Option<Handler> {
        self.handlers[opcode as usize]
    }
}

/// Run one fetch-decode-execute cycle.
///
/// The fetch address is normalized into the soup first. After dispatch the
/// instruction pointer advances by one (on top of any skip done by `if_cz`)
/// and is normalized again. Faults raise the CPU's sticky flag.
pub fn execute_step(dispatch: &Dispatch, cpu: &mut Cpu, soup: &mut Soup) -> StepOutcome {
    cpu.ip = wrap(cpu.ip) as i64;
    let opcode = soup.read(cpu.ip);
    let outcome = match dispatch.lookup(opcode) {
        Some(handler) => match handler(cpu, soup) {
            Ok(()) => StepOutcome::Executed(opcode),
            Err(fault) => {
                tracing::debug!(ip = cpu.ip, opcode, %fault, "instruction fault");
                cpu.record_fault(fault);
                StepOutcome::Faulted(opcode, fault)
            }
        },
        None => StepOutcome::Ignored(opcode),
    };
    cpu.ip = wrap(cpu.ip + 1) as i64;
    outcome
}
