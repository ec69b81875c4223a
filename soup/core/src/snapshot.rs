use crate::constants::SOUP_SIZE;
use crate::cpu::Cpu;
use crate::runtime::Simulation;
use crate::soup::Soup;
use crate::{now_timestamp, CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;
use zip::read::ZipArchive;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const SNAPSHOT_MAGIC: &str = "soup-core.snapshot";
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub magic: String,
    pub version: u32,
    pub created: String,
    pub steps_executed: u64,
    pub soup_size: usize,
    pub cpu: Cpu,
}

impl SnapshotMetadata {
    pub fn for_simulation(sim: &Simulation) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC.to_string(),
            version: SNAPSHOT_VERSION,
            created: now_timestamp(),
            steps_executed: sim.steps_executed(),
            soup_size: sim.soup.len(),
            cpu: sim.cpu.clone(),
        }
    }
}

#[derive(Debug)]
pub struct SnapshotLoad {
    pub metadata: SnapshotMetadata,
    pub soup: Soup,
}

impl SnapshotLoad {
    pub fn into_simulation(self) -> Simulation {
        let mut sim = Simulation::with_parts(self.soup, self.metadata.cpu);
        sim.set_steps_executed(self.metadata.steps_executed);
        sim
    }
}

pub fn save_snapshot(path: &Path, sim: &Simulation) -> Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let meta = SnapshotMetadata::for_simulation(sim);
    zip.start_file("snapshot.json", options)?;
    let meta_bytes = serde_json::to_vec_pretty(&meta)?;
    zip.write_all(&meta_bytes)?;

    zip.start_file("soup.bin", options)?;
    zip.write_all(sim.soup.as_slice())?;

    zip.finish()?;
    info!(path = %path.display(), steps = meta.steps_executed, "snapshot saved");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<SnapshotLoad> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let metadata = {
        let mut meta_buf = Vec::new();
        {
            let mut meta_file = archive
                .by_name("snapshot.json")
                .map_err(|e| CoreError::InvalidSnapshot(format!("snapshot.json missing: {e}")))?;
            meta_file.read_to_end(&mut meta_buf)?;
        }
        let metadata: SnapshotMetadata = serde_json::from_slice(&meta_buf)?;
        if metadata.magic != SNAPSHOT_MAGIC || metadata.version != SNAPSHOT_VERSION {
            return Err(CoreError::InvalidSnapshot(
                "snapshot magic/version mismatch".to_string(),
            ));
        }
        if metadata.soup_size != SOUP_SIZE {
            return Err(CoreError::InvalidSnapshot(format!(
                "soup size mismatch (expected {SOUP_SIZE}, got {})",
                metadata.soup_size
            )));
        }
        if !metadata.cpu.stack_pointer_in_range() {
            return Err(CoreError::InvalidSnapshot(format!(
                "stack pointer {} out of range",
                metadata.cpu.sp
            )));
        }
        metadata
    };

    let soup = {
        let mut soup_buf = Vec::new();
        let mut soup_file = archive
            .by_name("soup.bin")
            .map_err(|e| CoreError::InvalidSnapshot(format!("soup.bin missing: {e}")))?;
        soup_file.read_to_end(&mut soup_buf)?;
        Soup::from_image(&soup_buf)
            .map_err(|e| CoreError::InvalidSnapshot(format!("soup.bin: {e}")))?
    };

    Ok(SnapshotLoad { metadata, soup })
}
