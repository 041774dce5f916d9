//! JSON-LD `@context` documents (OBO Foundry, prefix.cc).
//!
//! Terms are added in document order; the first spelling of a prefix is
//! canonical.

use crate::datamodel::{Context, StatusType};
use crate::error::PrefixMapError;
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use tracing::debug;

pub fn from_jsonld(mut context: Context, text: &str) -> Result<Context> {
    let doc: Value = serde_json::from_str(text)
        .with_context(|| format!("parsing JSON-LD for {}", context.name))?;
    let drift = |details: &str| PrefixMapError::RegistryDrift {
        source_name: context.name.clone(),
        details: details.to_string(),
    };

    let frames: Vec<&Map<String, Value>> = match doc.get("@context") {
        Some(Value::Object(map)) => vec![map],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => return Err(drift("document has no @context object").into()),
    };

    for frame in frames {
        for (key, value) in frame {
            if key.starts_with('@') {
                continue;
            }
            let namespace = match value {
                Value::String(ns) => ns.as_str(),
                Value::Object(term) => match term.get("@id").and_then(Value::as_str) {
                    Some(ns) => ns,
                    None => continue,
                },
                _ => {
                    debug!("skipping non-prefix term {key}");
                    continue;
                }
            };
            context.add_prefix(key, namespace, StatusType::Canonical, false);
        }
    }
    Ok(context)
}
