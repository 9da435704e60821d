//! JSON export of a completed run, for replay and audit

use anyhow::{Context, Result};
use std::path::Path;

use crate::pipeline::RunOutcome;

/// Write the full run report (resolved seed, configuration echo, stage
/// counts, CV scores, evaluation) as pretty-printed JSON.
pub fn write_run_report(path: &Path, outcome: &RunOutcome) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, outcome)
        .with_context(|| format!("Failed to write report JSON: {}", path.display()))?;
    Ok(())
}
