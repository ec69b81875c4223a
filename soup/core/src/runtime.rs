//! Simulation context: one soup, one creature CPU and the dispatch table.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::config::RunConfig;
use crate::cpu::{Cpu, Fault};
use crate::exec::{execute_step, Dispatch, StepOutcome};
use crate::isa::Opcode;
use crate::soup::Soup;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultCounts {
    pub stack_overflow: u64,
    pub stack_underflow: u64,
    pub template_not_found: u64,
}

impl FaultCounts {
    fn record(&mut self, fault: Fault) {
        match fault {
            Fault::StackOverflow => self.stack_overflow += 1,
            Fault::StackUnderflow => self.stack_underflow += 1,
            Fault::TemplateNotFound => self.template_not_found += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.stack_overflow + self.stack_underflow + self.template_not_found
    }
}

/// Tally of one call to [`Simulation::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub steps: u64,
    pub ignored: u64,
    /// Reserved opcodes that ran as no-ops.
    #[serde(default)]
    pub reserved: u64,
    pub faults: FaultCounts,
    pub cancelled: bool,
    pub ip: i64,
    pub fl: bool,
    #[serde(default)]
    pub last_fault: Option<Fault>,
}

#[derive(Clone, Debug, Default)]
pub struct Simulation {
    pub soup: Soup,
    pub cpu: Cpu,
    dispatch: Dispatch,
    steps_executed: u64,
    trace_steps: bool,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(soup: Soup, cpu: Cpu) -> Self {
        Self {
            soup,
            cpu,
            ..Self::default()
        }
    }

    pub fn dispatch_mut(&mut self) -> &mut Dispatch {
        &mut self.dispatch
    }

    /// Total instructions executed over the lifetime of this context.
    pub fn steps_executed(&self) -> u64 {
        self.steps_executed
    }

    pub fn set_steps_executed(&mut self, steps: u64) {
        self.steps_executed = steps;
    }

    pub fn set_trace_steps(&mut self, enabled: bool) {
        self.trace_steps = enabled;
    }

    pub fn step(&mut self) -> StepOutcome {
        let ip = self.cpu.ip;
        let outcome = execute_step(&self.dispatch, &mut self.cpu, &mut self.soup);
        self.steps_executed = self.steps_executed.wrapping_add(1);
        if self.trace_steps {
            trace!(
                step = self.steps_executed,
                ip,
                opcode = outcome.opcode(),
                ax = self.cpu.ax,
                bx = self.cpu.bx,
                cx = self.cpu.cx,
                dx = self.cpu.dx,
                sp = self.cpu.sp,
                fl = self.cpu.fl,
                "step"
            );
        }
        outcome
    }

    /// Execute up to `budget` instructions.
    ///
    /// `cancel` is polled before every instruction; once it reads `true` the
    /// run stops early and the summary is marked cancelled.
    pub fn run(&mut self, budget: u64, cancel: Option<&AtomicBool>) -> RunSummary {
        let mut summary = RunSummary::default();
        for _ in 0..budget {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                summary.cancelled = true;
                break;
            }
            let outcome = self.step();
            if let Some(fault) = outcome.fault() {
                summary.faults.record(fault);
            }
            match outcome {
                StepOutcome::Ignored(_) => summary.ignored += 1,
                StepOutcome::Executed(op)
                    if Opcode::from_byte(op).is_some_and(Opcode::is_reserved) =>
                {
                    summary.reserved += 1
                }
                _ => {}
            }
            summary.steps += 1;
        }
        summary.ip = self.cpu.ip;
        summary.fl = self.cpu.fl;
        summary.last_fault = self.cpu.last_fault;
        info!(
            steps = summary.steps,
            faults = summary.faults.total(),
            ignored = summary.ignored,
            cancelled = summary.cancelled,
            "run finished"
        );
        summary
    }

    pub fn run_with(&mut self, config: &RunConfig, cancel: Option<&AtomicBool>) -> RunSummary {
        self.trace_steps = config.trace_steps;
        self.run(config.steps, cancel)
    }
}
