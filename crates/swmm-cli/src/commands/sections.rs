use std::io::{self, Write};

use anyhow::Result;
use swmm_core::registry;
use tabwriter::TabWriter;

pub fn handle() -> Result<()> {
    let registry = registry()?;
    let mut tw = TabWriter::new(io::stdout());
    writeln!(tw, "SECTION\tLAYER\tGEOMETRY\tLAYOUT\tDEPENDS ON")?;
    for spec in registry.iter() {
        writeln!(
            tw,
            "{}\t{}\t{}\t{:?}\t{}",
            spec.name,
            spec.layer_name.unwrap_or("-"),
            spec.geometry.map(|g| g.as_str()).unwrap_or("-"),
            spec.layout,
            spec.requires.join(", ")
        )?;
    }
    tw.flush()?;
    Ok(())
}
