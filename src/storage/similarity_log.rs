// src/storage/similarity_log.rs

use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes similarity samples to `<dir>/similarity_<stage>_<YYYYmmdd_HHMMSS>.csv`.
///
/// `#` lines at the top record the run parameters; then one value per line
/// under a `similarity` header. Returns the written path.
pub fn write_similarity_csv(
    dir: &Path,
    stage: &str,
    samples: &[f64],
    parameters: &[(&str, String)],
) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let file_name = format!("similarity_{}_{}.csv", stage, Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(file_name);

    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "# stage: {}", stage)?;
    for (name, value) in parameters {
        writeln!(writer, "# {}: {}", name, value)?;
    }
    writeln!(writer, "# samples: {}", samples.len())?;
    writeln!(writer, "similarity")?;
    for sample in samples {
        writeln!(writer, "{}", sample)?;
    }
    writer.flush().context("Failed to flush similarity log")?;

    info!(
        "Wrote {} {} similarity samples to {}",
        samples.len(),
        stage,
        path.display()
    );
    Ok(path)
}
