//! Gene Ontology `db-xrefs.yaml`.

use crate::datamodel::{Context, StatusType};
use crate::error::PrefixMapError;
use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct DbXref {
    database: String,
    #[serde(default)]
    rdf_uri_prefix: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
}

/// Entries with an `rdf_uri_prefix` become expansions; their synonyms are
/// added against the same namespace and so land as namespace aliases.
pub fn from_go_xrefs(mut context: Context, text: &str) -> Result<Context> {
    let entries: Vec<DbXref> =
        serde_yaml::from_str(text).map_err(|err| PrefixMapError::RegistryDrift {
            source_name: context.name.clone(),
            details: err.to_string(),
        })?;
    for entry in entries {
        let Some(namespace) = entry.rdf_uri_prefix.as_deref() else {
            debug!("{} has no rdf_uri_prefix", entry.database);
            continue;
        };
        context.add_prefix(&entry.database, namespace, StatusType::Canonical, false);
        for synonym in &entry.synonyms {
            context.add_prefix(synonym, namespace, StatusType::Canonical, false);
        }
    }
    Ok(context)
}
