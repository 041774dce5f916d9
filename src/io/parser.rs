use crate::datamodel::{Context, PrefixExpansion, StatusType};
use crate::io::CONTEXT_COLUMNS;
use anyhow::{Context as _, Result, bail};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ContextRow {
    context: String,
    prefix: String,
    namespace: String,
    status: String,
}

/// Read a serialized context from disk.
pub fn parse_context_file(path: &Path, name: &str) -> Result<Context> {
    let file = File::open(path).with_context(|| format!("opening context {}", path.display()))?;
    parse_context(file, name).with_context(|| format!("parsing context {}", path.display()))
}

/// Read a serialized context. Rows are appended as stored; statuses were
/// decided when the file was written and are not recomputed.
pub fn parse_context<R: Read>(reader: R, name: &str) -> Result<Context> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().context("reading header row")?.clone();
    for column in CONTEXT_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            bail!("missing required column '{column}'");
        }
    }

    let mut context = Context::new(name);
    for (idx, row) in csv_reader.deserialize::<ContextRow>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let row = row.with_context(|| format!("malformed row on line {line}"))?;
        let status: StatusType = row
            .status
            .parse()
            .with_context(|| format!("line {line}"))?;
        if row.prefix.is_empty() || row.namespace.is_empty() {
            bail!("line {line}: prefix and namespace must not be empty");
        }
        context.push_expansion(PrefixExpansion::new(
            row.context,
            row.prefix,
            row.namespace,
            status,
        ));
    }
    Ok(context)
}
