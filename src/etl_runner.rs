//! Regenerates serialized contexts from their registered sources.
//!
//! Non-merged contexts are built first, then merged ones, each in registry
//! order, so a merged context sees the components written earlier in the same
//! run. A failing context does not stop the others; failures are collected
//! into the report and the caller decides how to exit.

use crate::data::{CONTEXT_EXTENSION, ContextSpec, ContextStore, SourceKind};
use crate::datamodel::Context;
use crate::error::PrefixMapError;
use crate::ingest::{self, BioregistryOptions, SourceReader};
use crate::io::{parse_context_file, write_context};
use anyhow::{Context as _, Result, anyhow};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome for one successfully written context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EtlSummary {
    pub name: String,
    pub path: PathBuf,
    pub expansions: usize,
    pub canonical: usize,
    pub validation_messages: usize,
}

#[derive(Debug, Default)]
pub struct EtlReport {
    pub summaries: Vec<EtlSummary>,
    pub failures: Vec<(String, anyhow::Error)>,
}

impl EtlReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct EtlRunner {
    store: ContextStore,
    reader: SourceReader,
}

impl EtlRunner {
    pub fn new(store: ContextStore, reader: SourceReader) -> Self {
        Self { store, reader }
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    fn spec(&self, name: &str) -> Result<&ContextSpec> {
        self.store.registry().get(name).ok_or_else(|| {
            PrefixMapError::UnknownContext {
                name: name.to_string(),
                known: self.store.registry().names().map(str::to_string).collect(),
            }
            .into()
        })
    }

    /// Build `name` from its source. Merged contexts read their components
    /// from `output_dir` first, then from the store.
    pub fn build_context(&self, name: &str, output_dir: &Path) -> Result<Context> {
        let spec = self.spec(name)?;
        let context = spec.empty_context()?;
        let context = match spec.source {
            SourceKind::Merged => self.build_merged(spec, context, output_dir)?,
            SourceKind::Jsonld => ingest::from_jsonld(context, &self.read_source(spec)?)?,
            SourceKind::GoXrefs => ingest::from_go_xrefs(context, &self.read_source(spec)?)?,
            SourceKind::CuratedYaml => {
                ingest::from_curated_yaml(context, &self.read_source(spec)?)?
            }
            SourceKind::Bioregistry => ingest::from_bioregistry(
                context,
                &self.read_source(spec)?,
                BioregistryOptions {
                    filter_dubious: spec.filter_dubious,
                },
            )?,
            SourceKind::W3id => ingest::from_w3id(context, &self.read_source(spec)?)?,
        };
        Ok(context)
    }

    fn read_source(&self, spec: &ContextSpec) -> Result<String> {
        let location = spec
            .location
            .as_deref()
            .ok_or_else(|| anyhow!("context {} has no location", spec.name))?;
        self.reader
            .read(location)
            .with_context(|| format!("reading source for {}", spec.name))
    }

    fn build_merged(
        &self,
        spec: &ContextSpec,
        mut context: Context,
        output_dir: &Path,
    ) -> Result<Context> {
        for component in &spec.merged_from {
            let fresh = output_dir.join(format!("{component}.{CONTEXT_EXTENSION}"));
            let loaded = if fresh.is_file() {
                parse_context_file(&fresh, component)
            } else {
                self.store.load_context(component)
            };
            match loaded {
                Ok(part) => context.combine(&part),
                Err(err)
                    if matches!(
                        err.downcast_ref::<PrefixMapError>(),
                        Some(PrefixMapError::MissingResource { .. })
                    ) =>
                {
                    warn!("{}: skipping component {component}: {err}", spec.name);
                }
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("loading component {component} of {}", spec.name)
                    });
                }
            }
        }
        Ok(context)
    }

    fn build_and_write(&self, name: &str, output_dir: &Path) -> Result<EtlSummary> {
        let context = self.build_context(name, output_dir)?;
        let messages = context.validate(true);
        for message in &messages {
            warn!("{name}: {message}");
        }
        let path = write_context(&context, output_dir)?;
        info!(
            context = name,
            expansions = context.len(),
            canonical = context.canonical_count(),
            "wrote {}",
            path.display()
        );
        Ok(EtlSummary {
            name: name.to_string(),
            path,
            expansions: context.len(),
            canonical: context.canonical_count(),
            validation_messages: messages.len(),
        })
    }

    /// Regenerate `names` (every registered context when empty) into
    /// `output_dir`.
    pub fn run(&self, names: &[String], output_dir: &Path) -> Result<EtlReport> {
        let selected: Vec<&ContextSpec> = if names.is_empty() {
            self.store.registry().specs().collect()
        } else {
            names
                .iter()
                .map(|name| self.spec(name))
                .collect::<Result<_>>()?
        };
        let (merged, plain): (Vec<&ContextSpec>, Vec<&ContextSpec>) = selected
            .into_iter()
            .partition(|spec| spec.source == SourceKind::Merged);

        let mut report = EtlReport::default();
        for spec in plain.into_iter().chain(merged) {
            match self.build_and_write(&spec.name, output_dir) {
                Ok(summary) => report.summaries.push(summary),
                Err(err) => {
                    warn!("{}: {err:#}", spec.name);
                    report.failures.push((spec.name.clone(), err));
                }
            }
        }
        Ok(report)
    }

    /// Regenerate a single context in place.
    pub fn refresh_context(&self, name: &str) -> Result<Context> {
        let dir = self.store.dir().to_path_buf();
        self.build_and_write(name, &dir)?;
        self.store.load_context(name)
    }
}
