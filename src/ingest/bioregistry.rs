//! Bioregistry extended prefix map exports.
//!
//! The payload is checked against the bundled extended-prefix-map schema
//! before it is deserialized, so an upstream format change surfaces as
//! `RegistryDrift` rather than as a half-populated context.
//!
//! Namespaces that do not look like semantic URIs are dropped by default.
//! Records whose prefix carries capitals are treated as preferred and keep
//! their casing under an upper/lower policy.

use crate::curie::Record;
use crate::datamodel::{Context, NAMESPACE_RE, StatusType};
use crate::error::PrefixMapError;
use crate::schema_loader::{CompiledSchema, EXTENDED_PREFIX_MAP_SCHEMA};
use anyhow::{Context as _, Result};
use serde_json::Value;
use tracing::{debug, info};

// Problematic records; revisit once upstream fixes their URI prefixes.
const SKIP: &[&str] = &["gro"];

#[derive(Clone, Copy, Debug)]
pub struct BioregistryOptions {
    pub filter_dubious: bool,
}

impl Default for BioregistryOptions {
    fn default() -> Self {
        Self {
            filter_dubious: true,
        }
    }
}

pub fn from_bioregistry(
    mut context: Context,
    text: &str,
    options: BioregistryOptions,
) -> Result<Context> {
    let payload: Value = serde_json::from_str(text)
        .with_context(|| format!("parsing extended prefix map for {}", context.name))?;
    let schema = CompiledSchema::from_json_str("extended_prefix_map", EXTENDED_PREFIX_MAP_SCHEMA)?;
    let violations = schema.violations(&payload);
    if !violations.is_empty() {
        return Err(PrefixMapError::RegistryDrift {
            source_name: context.name.clone(),
            details: violations.join("\n"),
        }
        .into());
    }
    let records: Vec<Record> = serde_json::from_value(payload)
        .with_context(|| format!("decoding extended prefix map for {}", context.name))?;

    let mut skipped = 0usize;
    for record in &records {
        if SKIP.contains(&record.prefix.as_str()) {
            continue;
        }
        if options.filter_dubious && !NAMESPACE_RE.is_match(&record.uri_prefix) {
            debug!(
                "Skipping dubious ns {} => {}",
                record.prefix, record.uri_prefix
            );
            skipped += 1;
            continue;
        }
        let preferred = record.prefix != record.prefix.to_lowercase();
        context.add_prefix(
            &record.prefix,
            &record.uri_prefix,
            StatusType::Canonical,
            preferred,
        );
        for uri_prefix in &record.uri_prefix_synonyms {
            if options.filter_dubious && !NAMESPACE_RE.is_match(uri_prefix) {
                continue;
            }
            context.add_prefix(&record.prefix, uri_prefix, StatusType::Canonical, preferred);
        }
        for prefix in &record.prefix_synonyms {
            context.add_prefix(prefix, &record.uri_prefix, StatusType::Canonical, false);
        }
    }
    info!(
        context = %context.name,
        records = records.len(),
        skipped,
        "ingested bioregistry records"
    );
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::CaseNormalization;

    const EPM: &str = r#"[
        {"prefix": "GO", "uri_prefix": "http://purl.obolibrary.org/obo/GO_",
         "prefix_synonyms": ["go", "gomf"],
         "uri_prefix_synonyms": ["http://identifiers.org/GO:", "https://www.ebi.ac.uk/QuickGO/term/GO:"]},
        {"prefix": "chebi", "uri_prefix": "http://purl.obolibrary.org/obo/CHEBI_"},
        {"prefix": "gro", "uri_prefix": "http://www.bootstrep.eu/ontology/GRO#"},
        {"prefix": "foodb.compound", "uri_prefix": "http://foodb.ca/compounds?id="}
    ]"#;

    #[test]
    fn filters_dubious_and_skipped_records() {
        let ctx = from_bioregistry(Context::new("bioregistry"), EPM, BioregistryOptions::default())
            .unwrap();
        let dict = ctx.as_dict();
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["GO", "chebi"]);
        assert!(ctx.filter(Some("gomf"), None)[0].status == StatusType::NamespaceAlias);
        assert_eq!(
            ctx.filter(None, Some("http://identifiers.org/GO:"))[0].status,
            StatusType::PrefixAlias
        );
        // "go" collides with GO on both sides and is dropped.
        assert!(ctx.filter(Some("go"), None).is_empty());
        assert_eq!(ctx.integrity_report().messages(), Vec::<String>::new());
    }

    #[test]
    fn keeps_dubious_when_asked() {
        let ctx = from_bioregistry(
            Context::new("bioregistry"),
            EPM,
            BioregistryOptions {
                filter_dubious: false,
            },
        )
        .unwrap();
        assert!(ctx.as_dict().contains_key("foodb.compound"));
        assert!(!ctx.as_dict().contains_key("gro"));
    }

    #[test]
    fn upper_policy_spares_preferred_prefixes() {
        let mut epm: Vec<serde_json::Value> = serde_json::from_str(EPM).unwrap();
        epm.push(serde_json::json!({
            "prefix": "NCBITaxon",
            "uri_prefix": "http://purl.obolibrary.org/obo/NCBITaxon_"
        }));
        let ctx = from_bioregistry(
            Context::new("bioregistry.upper").with_case(CaseNormalization::Upper),
            &serde_json::to_string(&epm).unwrap(),
            BioregistryOptions::default(),
        )
        .unwrap();
        let dict = ctx.as_dict();
        assert!(dict.contains_key("CHEBI"));
        assert!(dict.contains_key("NCBITaxon"));
        assert!(!dict.contains_key("chebi"));
    }

    #[test]
    fn schema_violation_is_drift() {
        let err = from_bioregistry(
            Context::new("bioregistry"),
            r#"[{"prefix": "go", "uriPrefix": "http://purl.obolibrary.org/obo/GO_"}]"#,
            BioregistryOptions::default(),
        )
        .unwrap_err();
        match err.downcast_ref::<PrefixMapError>() {
            Some(PrefixMapError::RegistryDrift { details, .. }) => {
                assert!(details.contains("uri_prefix"), "{details}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
