//! w3id.org redirect registry, read from a GitHub contents listing of the
//! `perma-id/w3id.org` repository: every top-level directory is a namespace
//! `https://w3id.org/<dir>/`.

use crate::datamodel::{Context, PREFIX_RE, StatusType};
use crate::error::PrefixMapError;
use anyhow::Result;
use serde::Deserialize;

const W3ID_BASE: &str = "https://w3id.org/";

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

pub fn from_w3id(mut context: Context, text: &str) -> Result<Context> {
    let entries: Vec<ContentsEntry> =
        serde_json::from_str(text).map_err(|err| PrefixMapError::RegistryDrift {
            source_name: context.name.clone(),
            details: err.to_string(),
        })?;
    for entry in entries {
        if entry.kind != "dir" || entry.name.starts_with('.') || !PREFIX_RE.is_match(&entry.name) {
            continue;
        }
        let namespace = format!("{W3ID_BASE}{}/", entry.name);
        context.add_prefix(&entry.name, &namespace, StatusType::Canonical, false);
    }
    Ok(context)
}
