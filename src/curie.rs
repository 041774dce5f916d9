//! Extended-prefix-map converter for expanding CURIEs and compressing URIs.
//!
//! A converter is built from `Record`s. Every prefix and prefix synonym must be
//! unique across the whole map, and likewise every URI prefix and URI prefix
//! synonym; construction fails otherwise. Synonyms resolve to the canonical
//! side of their record in both directions.

use crate::error::PrefixMapError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub prefix: String,
    pub uri_prefix: String,
    #[serde(default)]
    pub prefix_synonyms: Vec<String>,
    #[serde(default)]
    pub uri_prefix_synonyms: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Converter {
    records: Vec<Record>,
    /// Every prefix and prefix synonym → canonical URI prefix.
    prefix_map: BTreeMap<String, String>,
    /// Every URI prefix and URI prefix synonym → canonical prefix.
    reverse_prefix_map: BTreeMap<String, String>,
    /// Every prefix and prefix synonym → canonical prefix.
    synonym_map: BTreeMap<String, String>,
    // URI prefixes ordered longest first for compression.
    compress_order: Vec<String>,
}

impl Converter {
    pub fn from_extended_prefix_map(records: Vec<Record>) -> Result<Self> {
        let mut converter = Converter::default();
        for record in &records {
            for prefix in std::iter::once(&record.prefix).chain(&record.prefix_synonyms) {
                if converter.synonym_map.contains_key(prefix) {
                    return Err(PrefixMapError::DuplicatePrefix {
                        prefix: prefix.clone(),
                    }
                    .into());
                }
                converter
                    .synonym_map
                    .insert(prefix.clone(), record.prefix.clone());
                converter
                    .prefix_map
                    .insert(prefix.clone(), record.uri_prefix.clone());
            }
            for uri_prefix in std::iter::once(&record.uri_prefix).chain(&record.uri_prefix_synonyms)
            {
                if converter.reverse_prefix_map.contains_key(uri_prefix) {
                    return Err(PrefixMapError::DuplicateUriPrefix {
                        uri_prefix: uri_prefix.clone(),
                    }
                    .into());
                }
                converter
                    .reverse_prefix_map
                    .insert(uri_prefix.clone(), record.prefix.clone());
            }
        }
        converter.compress_order = converter.reverse_prefix_map.keys().cloned().collect();
        converter
            .compress_order
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        converter.records = records;
        Ok(converter)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn prefix_map(&self) -> &BTreeMap<String, String> {
        &self.prefix_map
    }

    pub fn reverse_prefix_map(&self) -> &BTreeMap<String, String> {
        &self.reverse_prefix_map
    }

    pub fn standardize_prefix(&self, prefix: &str) -> Option<&str> {
        self.synonym_map.get(prefix).map(String::as_str)
    }

    /// Expand `prefix:local` into a full URI.
    pub fn expand(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        let uri_prefix = self.prefix_map.get(prefix)?;
        Some(format!("{uri_prefix}{local}"))
    }

    /// Compress a URI using the longest matching URI prefix.
    pub fn compress(&self, uri: &str) -> Option<String> {
        self.compress_order.iter().find_map(|uri_prefix| {
            let local = uri.strip_prefix(uri_prefix.as_str())?;
            let prefix = self.reverse_prefix_map.get(uri_prefix)?;
            Some(format!("{prefix}:{local}"))
        })
    }
}
