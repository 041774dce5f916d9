//! Loading contexts from a data directory.

use crate::curie::Converter;
use crate::data::registry::is_valid_context_name;
use crate::data::{CONTEXT_EXTENSION, ContextRegistry, REGISTRY_FILE};
use crate::datamodel::Context;
use crate::error::PrefixMapError;
use crate::io::parse_context_file;
use anyhow::{Context as _, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A data directory plus its validated registry.
#[derive(Clone, Debug)]
pub struct ContextStore {
    dir: PathBuf,
    registry: ContextRegistry,
}

impl ContextStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let registry = ContextRegistry::load(&dir.join(REGISTRY_FILE))?;
        Ok(Self { dir, registry })
    }

    /// Open the store found by [`crate::find_data_dir`].
    pub fn open_default() -> Result<Self> {
        Self::open(crate::find_data_dir()?)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn registry(&self) -> &ContextRegistry {
        &self.registry
    }

    pub fn context_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{CONTEXT_EXTENSION}"))
    }

    /// Every serialized context present in the directory, keyed by name.
    pub fn context_paths(&self) -> Result<BTreeMap<String, PathBuf>> {
        let mut paths = BTreeMap::new();
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("reading data directory {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(CONTEXT_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                paths.insert(stem.to_string(), path.clone());
            }
        }
        Ok(paths)
    }

    /// Names that `load_context` can resolve or explain.
    pub fn known_names(&self) -> Result<Vec<String>> {
        let mut names: BTreeSet<String> = self.registry.names().map(str::to_string).collect();
        names.extend(self.context_paths()?.into_keys());
        Ok(names.into_iter().collect())
    }

    pub fn load_context(&self, name: &str) -> Result<Context> {
        let path = self.context_path(name);
        if !is_valid_context_name(name) || !path.is_file() {
            if is_valid_context_name(name) && self.registry.contains(name) {
                return Err(PrefixMapError::MissingResource {
                    name: name.to_string(),
                    path,
                }
                .into());
            }
            return Err(PrefixMapError::UnknownContext {
                name: name.to_string(),
                known: self.known_names()?,
            }
            .into());
        }

        debug!("loading context {name} from {}", path.display());
        let mut context = parse_context_file(&path, name)?;
        if let Some(spec) = self.registry.get(name) {
            spec.annotate(&mut context)?;
        }
        Ok(context)
    }

    /// Combine contexts in order; earlier names take precedence.
    ///
    /// A single name loads that context unchanged; several produce a context
    /// named by joining them with `+`.
    pub fn load_multi_context<S: AsRef<str>>(&self, names: &[S]) -> Result<Context> {
        match names {
            [] => Err(PrefixMapError::UnknownContext {
                name: String::new(),
                known: self.known_names()?,
            }
            .into()),
            [single] => self.load_context(single.as_ref()),
            _ => {
                let joined: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
                let mut merged = Context::new(joined.join("+"));
                for name in &joined {
                    merged.combine(&self.load_context(name)?);
                }
                merged.merged_from = joined.iter().map(|s| s.to_string()).collect();
                Ok(merged)
            }
        }
    }

    pub fn load_converter<S: AsRef<str>>(&self, names: &[S]) -> Result<Converter> {
        self.load_multi_context(names)?.as_converter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::StatusType;
    use crate::io::write_context;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"
registry_version: prefixmaps_registry_v1
contexts:
  - name: first
    description: first fixture
    source: curated_yaml
    location: input/first.yaml
  - name: second
    source: curated_yaml
    location: input/second.yaml
  - name: pending
    source: jsonld
    location: https://example.org/context.jsonld
"#;

    fn fixture_store() -> Result<(TempDir, ContextStore)> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join(REGISTRY_FILE), REGISTRY)?;

        let mut first = Context::new("first");
        first.add_prefix("ex", "http://example.org/first/", StatusType::Canonical, false);
        first.add_prefix("only1", "http://example.org/only1/", StatusType::Canonical, false);
        write_context(&first, dir.path())?;

        let mut second = Context::new("second");
        second.add_prefix("ex", "http://example.org/second/", StatusType::Canonical, false);
        second.add_prefix("only2", "http://example.org/only2/", StatusType::Canonical, false);
        write_context(&second, dir.path())?;

        let store = ContextStore::open(dir.path())?;
        Ok((dir, store))
    }

    #[test]
    fn load_context_attaches_registry_metadata() -> Result<()> {
        let (_dir, store) = fixture_store()?;
        let ctx = store.load_context("first")?;
        assert_eq!(ctx.description.as_deref(), Some("first fixture"));
        assert_eq!(ctx.as_dict().len(), 2);
        assert_eq!(
            store.context_paths()?.keys().collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        Ok(())
    }

    #[test]
    fn missing_and_unknown_contexts_are_distinguished() -> Result<()> {
        let (_dir, store) = fixture_store()?;
        let err = store.load_context("pending").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrefixMapError>(),
            Some(PrefixMapError::MissingResource { .. })
        ));

        let err = store.load_context("nope").unwrap_err();
        match err.downcast_ref::<PrefixMapError>() {
            Some(PrefixMapError::UnknownContext { known, .. }) => {
                assert_eq!(known, &vec!["first", "pending", "second"]);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = store.load_context("../first").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrefixMapError>(),
            Some(PrefixMapError::UnknownContext { .. })
        ));
        Ok(())
    }

    #[test]
    fn multi_context_keeps_canonical_rows_stored_after_aliases() -> Result<()> {
        let (dir, store) = fixture_store()?;
        let mut go = Context::new("go");
        go.add_prefix("GO", "http://purl.obolibrary.org/obo/GO_", StatusType::Canonical, false);
        go.add_prefix(
            "gene_ontology",
            "http://purl.obolibrary.org/obo/GO_",
            StatusType::Canonical,
            false,
        );
        write_context(&go, dir.path())?;
        let stored = store.load_context("go")?;
        assert_eq!(stored.prefix_expansions()[0].prefix, "gene_ontology");

        let merged = store.load_multi_context(&["go", "first"])?;
        assert_eq!(
            merged.as_dict().get("GO").map(String::as_str),
            Some("http://purl.obolibrary.org/obo/GO_")
        );
        let report = merged.integrity_report();
        assert!(report.is_clean(), "{:?}", report.messages());
        Ok(())
    }

    #[test]
    fn multi_context_respects_order() -> Result<()> {
        let (_dir, store) = fixture_store()?;
        let merged = store.load_multi_context(&["first", "second"])?;
        assert_eq!(merged.name, "first+second");
        let dict = merged.as_dict();
        assert_eq!(dict["ex"], "http://example.org/first/");
        assert!(dict.contains_key("only2"));

        let reversed = store.load_multi_context(&["second", "first"])?;
        assert_eq!(reversed.as_dict()["ex"], "http://example.org/second/");

        let single = store.load_multi_context(&["second"])?;
        assert_eq!(single.name, "second");

        let converter = store.load_converter(&["first", "second"])?;
        assert_eq!(
            converter.expand("ex:1").as_deref(),
            Some("http://example.org/first/1")
        );
        assert_eq!(
            converter.compress("http://example.org/second/1").as_deref(),
            Some("ex:1")
        );
        Ok(())
    }
}
