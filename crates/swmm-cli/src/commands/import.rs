use std::path::Path;

use anyhow::{bail, Context, Result};
use swmm_cli::{persist, SwmmConfig};
use swmm_io::{import_inp_file, LogFeedback};
use tracing::{info, warn};

pub fn handle(inp: &Path, out: &Path, config: &SwmmConfig) -> Result<()> {
    if !inp.exists() {
        bail!("Input '{}' does not exist", inp.display());
    }
    info!("Importing {} to {}", inp.display(), out.display());

    let mut feedback = LogFeedback::new();
    let result = import_inp_file(inp, &config.import, &mut feedback)
        .with_context(|| format!("Import of {} failed", inp.display()))?;
    for issue in &result.diagnostics.issues {
        warn!(
            category = %issue.category,
            section = issue.section.as_deref().unwrap_or("-"),
            object = issue.object.as_deref().unwrap_or("-"),
            "{}",
            issue.message
        );
    }
    persist::write_model(&result.model, out)?;

    let stats = &result.diagnostics.stats;
    println!("Imported {} into {}:", inp.display(), out.display());
    println!("  Sections : {}", stats.sections);
    println!("  Objects  : {}", stats.objects);
    println!("  Layers   : {}", stats.layers);
    println!("  Sheets   : {}", stats.sheets);
    println!("  Warnings : {}", result.diagnostics.warning_count());
    Ok(())
}
