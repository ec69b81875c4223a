use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::Result;

pub const DEFAULT_STEPS: u64 = 10_000;
pub const TRACE_STEPS_ENV: &str = "SOUP_TRACE_STEPS";

/// Knobs for a simulation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Instructions to execute before returning. Zero only loads.
    #[serde(default = "default_steps")]
    pub steps: u64,
    /// Soup offset the creature is loaded at.
    #[serde(default)]
    pub base: i64,
    /// Emit a trace event for every executed instruction.
    #[serde(default)]
    pub trace_steps: bool,
}

fn default_steps() -> u64 {
    DEFAULT_STEPS
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            base: 0,
            trace_steps: false,
        }
    }
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&text)?;
        Ok(config.with_env_overrides())
    }

    /// Apply `SOUP_TRACE_STEPS=1|true` on top of the configured value.
    pub fn with_env_overrides(mut self) -> Self {
        if matches!(
            env::var(TRACE_STEPS_ENV).as_deref(),
            Ok("1") | Ok("true") | Ok("True")
        ) {
            self.trace_steps = true;
        }
        self
    }
}
