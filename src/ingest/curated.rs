//! Curated `{name, prefixes}` YAML documents shipped under `data/input/`.
//!
//! Prefixes are added in document order, so a later entry reusing a prefix
//! becomes a prefix alias of the earlier one.

use crate::datamodel::{Context, StatusType};
use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde_yaml::Value;

#[derive(Debug, Deserialize)]
struct CuratedDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    prefixes: serde_yaml::Mapping,
}

/// Parse a curated document. An empty `context.name` is filled from the
/// document's own `name`.
pub fn from_curated_yaml(mut context: Context, text: &str) -> Result<Context> {
    let doc: CuratedDocument = serde_yaml::from_str(text).context("parsing curated prefixes")?;
    if context.name.is_empty() {
        context.name = doc
            .name
            .clone()
            .context("curated document has no name and none was supplied")?;
    }
    if context.description.is_none() {
        context.description = doc.description.clone();
    }
    for (key, value) in &doc.prefixes {
        let prefix = scalar(key).context("curated prefix keys must be strings")?;
        match value {
            Value::Sequence(namespaces) => {
                for ns in namespaces {
                    let ns = scalar(ns).with_context(|| format!("namespace for {prefix}"))?;
                    context.add_prefix(&prefix, &ns, StatusType::Canonical, false);
                }
            }
            other => {
                let ns = scalar(other).with_context(|| format!("namespace for {prefix}"))?;
                context.add_prefix(&prefix, &ns, StatusType::Canonical, false);
            }
        }
    }
    Ok(context)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
