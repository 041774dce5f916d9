use crate::data::CONTEXT_EXTENSION;
use crate::datamodel::{Context, PrefixExpansion};
use crate::io::CONTEXT_COLUMNS;
use anyhow::{Context as _, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `context` as CSV, rows sorted by lowercased prefix then namespace.
pub fn write_context_to<W: Write>(context: &Context, writer: W) -> Result<()> {
    let mut rows: Vec<&PrefixExpansion> = context.prefix_expansions().iter().collect();
    rows.sort_by(|a, b| {
        a.prefix
            .to_lowercase()
            .cmp(&b.prefix.to_lowercase())
            .then_with(|| a.namespace.cmp(&b.namespace))
    });

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CONTEXT_COLUMNS)?;
    for pe in rows {
        csv_writer.write_record([
            pe.context.as_str(),
            pe.prefix.as_str(),
            pe.namespace.as_str(),
            pe.status.as_str(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Replace `<dir>/<name>.csv` wholesale via a temp file and rename.
pub fn write_context(context: &Context, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{}.{CONTEXT_EXTENSION}", context.name));
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    write_context_to(context, &mut tmp)
        .with_context(|| format!("serializing context {}", context.name))?;
    tmp.persist(&path)
        .map_err(|err| err.error)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
