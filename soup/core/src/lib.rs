//! Tierra-style soup virtual machine.
//!
//! A creature is a run of opcode bytes in a shared circular memory (the
//! soup). One CPU context fetches and executes those bytes; addressing
//! instructions find labelled locations by searching the soup for the
//! complement of a template of marker bytes instead of using absolute
//! addresses.
//!
//! The crate keeps no global state: a [`Simulation`] owns the soup, the CPU
//! and the opcode dispatch table, and everything else takes them by
//! reference.

use std::time::SystemTime;
use thiserror::Error;

pub mod config;
pub mod constants;
pub mod cpu;
pub mod exec;
pub mod isa;
pub mod loader;
pub mod runtime;
pub mod snapshot;
pub mod soup;
pub mod template;

pub use config::RunConfig;
pub use constants::{SOUP_SIZE, STACK_SIZE};
pub use cpu::{Cpu, Fault, Register};
pub use exec::{execute_step, handler_for, Dispatch, Handler, StepOutcome};
pub use isa::{Opcode, MNEMONIC_PREFIXES, OPCODES};
pub use loader::{
    assemble, disassemble, load_creature, load_creature_from_file, load_creature_from_reader,
};
pub use runtime::{FaultCounts, RunSummary, Simulation};
pub use snapshot::{
    load_snapshot, save_snapshot, SnapshotLoad, SnapshotMetadata, SNAPSHOT_MAGIC,
    SNAPSHOT_VERSION,
};
pub use soup::{is_marker, wrap, Soup};
pub use template::{
    complement_of, resolve_template, search, search_backward, search_forward, Direction, Template,
};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("serialize error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("snapshot error: {0}")]
    InvalidSnapshot(String),
    #[error("{0}")]
    Other(String),
}

pub fn now_timestamp() -> String {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => format!("{}Z", duration.as_secs()),
        Err(_) => "0Z".to_string(),
    }
}
