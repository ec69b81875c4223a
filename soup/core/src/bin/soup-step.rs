use serde::{Deserialize, Serialize};
use soup_core::{Cpu, RunSummary, Simulation, Soup};
use std::io::{self, Read};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Deserialize)]
struct Input {
    cpu: Cpu,
    #[serde(default)]
    soup: Vec<(u32, u8)>,
    #[serde(default = "one_step")]
    steps: u64,
}

fn one_step() -> u64 {
    1
}

#[derive(Serialize)]
struct Output {
    cpu: Cpu,
    soup: Vec<(u32, u8)>,
    summary: RunSummary,
}

fn main() -> anyhow::Result<()> {
    // stdout carries the JSON result, so events go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soup_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let input: Input = serde_json::from_str(&buffer)?;
    anyhow::ensure!(
        input.cpu.stack_pointer_in_range(),
        "stack pointer {} out of range",
        input.cpu.sp
    );

    let mut soup = Soup::new();
    soup.preload(input.soup);
    let mut sim = Simulation::with_parts(soup, input.cpu);
    let summary = sim.run(input.steps, None);

    let output = Output {
        soup: sim.soup.dump_non_zero(),
        cpu: sim.cpu,
        summary,
    };
    serde_json::to_writer(io::stdout(), &output)?;
    Ok(())
}
