// Data integrity of every bundled context.
mod support;

use anyhow::Result;
use prefixmaps::{ContextStore, StatusType};
use std::collections::BTreeSet;
use support::data_dir;

fn bundled_store() -> Result<ContextStore> {
    ContextStore::open(data_dir())
}

#[test]
fn bundled_contexts_are_consistent() -> Result<()> {
    let store = bundled_store()?;
    let paths = store.context_paths()?;
    assert!(paths.contains_key("bioportal"));
    assert!(paths.contains_key("merged"));
    for name in paths.keys() {
        let context = store.load_context(name)?;
        assert!(!context.is_empty(), "{name} is empty");
        let report = context.integrity_report();
        assert!(report.is_clean(), "[{name}] {:?}", report.messages());
    }
    Ok(())
}

#[test]
fn canonical_prefixes_and_namespaces_are_unique() -> Result<()> {
    let store = bundled_store()?;
    for name in store.context_paths()?.keys() {
        let context = store.load_context(name)?;
        let mut prefixes = BTreeSet::new();
        let mut namespaces = BTreeSet::new();
        for pe in context.prefix_expansions().iter().filter(|pe| pe.canonical()) {
            assert!(prefixes.insert(&pe.prefix), "[{name}] duplicate {}", pe.prefix);
            assert!(namespaces.insert(&pe.namespace), "[{name}] duplicate {}", pe.namespace);
        }
    }
    Ok(())
}

#[test]
fn every_row_names_its_context() -> Result<()> {
    let store = bundled_store()?;
    for name in store.context_paths()?.keys() {
        let context = store.load_context(name)?;
        assert!(
            context.prefix_expansions().iter().all(|pe| &pe.context == name),
            "{name} has rows from another context"
        );
    }
    Ok(())
}

#[test]
fn merged_prefers_obo_over_bioportal() -> Result<()> {
    let store = bundled_store()?;
    let merged = store.load_context("merged")?;
    assert_eq!(merged.merged_from.first().map(String::as_str), Some("obo"));
    let hp = merged.filter(Some("HP"), None);
    assert_eq!(hp.len(), 1);
    assert_eq!(hp[0].namespace, "http://purl.obolibrary.org/obo/HP_");
    assert_eq!(hp[0].status, StatusType::Canonical);

    // linked_data wins the lowercase spellings of shared vocabularies.
    let dict = merged.as_dict();
    assert_eq!(dict.get("schema").map(String::as_str), Some("http://schema.org/"));
    assert!(!dict.contains_key("SCHEMA"));
    Ok(())
}

#[test]
fn merging_go_first_keeps_its_canonical_prefixes() -> Result<()> {
    let store = bundled_store()?;
    let merged = store.load_multi_context(&["go", "linked_data"])?;
    let go = merged.filter(Some("GO"), None);
    assert_eq!(go.len(), 1);
    assert_eq!(go[0].status, StatusType::Canonical);
    assert_eq!(
        merged.as_dict().get("UniProtKB").map(String::as_str),
        Some("http://purl.uniprot.org/uniprot/")
    );
    let report = merged.integrity_report();
    assert!(report.is_clean(), "{:?}", report.messages());
    Ok(())
}
