use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use soup_core::{
    disassemble, load_creature_from_file, load_snapshot, save_snapshot, Cpu, RunConfig,
    RunSummary, Simulation,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a creature in the soup")]
struct Args {
    /// Creature listing to load into an empty soup.
    #[arg(long, value_name = "PATH", conflicts_with = "resume")]
    creature: Option<PathBuf>,

    /// Soup offset the creature is written at.
    #[arg(long)]
    base: Option<i64>,

    /// Resume from a snapshot archive instead of loading a listing.
    #[arg(long, value_name = "PATH")]
    resume: Option<PathBuf>,

    /// Instructions to execute (0 loads without running).
    #[arg(long)]
    steps: Option<u64>,

    /// Print a disassembly of the loaded creature before running.
    #[arg(long, default_value_t = false, conflicts_with = "resume")]
    listing: bool,

    /// Write a snapshot archive after the run.
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// JSON run configuration; command-line flags take precedence.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    creature_size: usize,
    summary: RunSummary,
    cpu: &'a Cpu,
}

/// Run on a blocking worker so the signal task stays live; `cancel` is polled
/// between instructions.
async fn run_cancellable(
    mut sim: Simulation,
    config: RunConfig,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<(Simulation, RunSummary)> {
    let (sim, summary) = tokio::task::spawn_blocking(move || {
        let summary = sim.run_with(&config, Some(cancel.as_ref()));
        (sim, summary)
    })
    .await?;
    Ok((sim, summary))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soup_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => RunConfig::default().with_env_overrides(),
    };
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(base) = args.base {
        config.base = base;
    }

    let (sim, creature_size) = if let Some(path) = &args.resume {
        let loaded = load_snapshot(path)
            .with_context(|| format!("loading snapshot {}", path.display()))?;
        info!(
            path = %path.display(),
            steps_executed = loaded.metadata.steps_executed,
            "resumed from snapshot"
        );
        (loaded.into_simulation(), 0)
    } else {
        let path = args
            .creature
            .as_ref()
            .context("either --creature or --resume is required")?;
        let mut sim = Simulation::new();
        let (size, cpu) = load_creature_from_file(path, &mut sim.soup, config.base)
            .with_context(|| format!("loading creature {}", path.display()))?;
        sim.cpu = cpu;
        (sim, size)
    };

    if args.listing {
        for line in disassemble(&sim.soup, sim.cpu.ip, creature_size) {
            println!("{line}");
        }
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    let (sim, summary) = run_cancellable(sim, config, cancel).await?;
    if summary.cancelled {
        warn!(steps = summary.steps, "run interrupted by Ctrl-C");
    }

    if let Some(path) = &args.snapshot {
        save_snapshot(path, &sim)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
    }

    let report = Report {
        creature_size,
        summary,
        cpu: &sim.cpu,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
