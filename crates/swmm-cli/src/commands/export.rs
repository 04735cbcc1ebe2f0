use std::path::Path;

use anyhow::{Context, Result};
use swmm_cli::{persist, SwmmConfig};
use swmm_io::{write_inp_file, LogFeedback};
use tracing::{info, warn};

pub fn handle(dir: &Path, inp: &Path, config: &SwmmConfig) -> Result<()> {
    info!("Exporting {} to {}", dir.display(), inp.display());
    let model = persist::read_model(dir)?;

    let mut feedback = LogFeedback::new();
    let diagnostics = write_inp_file(&model, inp, &config.export, &mut feedback)
        .with_context(|| format!("Export to {} failed", inp.display()))?;
    for issue in &diagnostics.issues {
        warn!(category = %issue.category, "{}", issue.message);
    }
    if diagnostics.stats.dropped_records > 0 {
        warn!(
            dropped = diagnostics.stats.dropped_records,
            "records referencing unknown nodes were not written"
        );
    }

    println!("Wrote {} ({} sections)", inp.display(), diagnostics.stats.sections);
    Ok(())
}
