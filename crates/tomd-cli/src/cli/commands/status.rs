//! `tomd status` – show what a checkpoint file records.

use anyhow::Result;
use std::path::Path;
use tomd_core::checkpoint::JsonCheckpointStore;

pub fn run_status(path: &Path) -> Result<()> {
    let Some(cp) = JsonCheckpointStore::new(path).try_load()? else {
        println!("No checkpoint at {}.", path.display());
        return Ok(());
    };
    let total = cp.completed.len() + cp.pending.len();
    println!("Checkpoint: {}", path.display());
    println!("Saved at:   {}", cp.timestamp.to_rfc3339());
    println!("Completed:  {} / {}", cp.completed.len(), total);
    println!("Pending:    {}", cp.pending.len());
    if !cp.pending.is_empty() {
        println!("{:<10} {}", "SIZE", "SOURCE");
        for d in &cp.pending {
            println!("{:<10} {}", d.size_bytes, d.source_path.display());
        }
    }
    Ok(())
}
