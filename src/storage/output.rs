// src/storage/output.rs

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::ClusterMember;

/// Writes the assembled clusters as a JSON array of arrays of
/// `{"source_data": ..., "source_row_number": n}`.
pub fn write_clusters_json<R: Serialize>(path: &Path, clusters: &[Vec<ClusterMember<R>>]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, clusters).context("Failed to serialize clusters")?;
    writer.write_all(b"\n")?;
    writer.flush().context("Failed to flush output file")?;
    info!("Wrote {} clusters to {}", clusters.len(), path.display());
    Ok(())
}
