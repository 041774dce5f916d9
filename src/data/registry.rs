//! Validated view of `contexts.yaml`.
//!
//! The registry enforces the expected `registry_version` and rejects
//! ambiguous declarations (duplicate names, conflicting case policies, merged
//! contexts pointing at unknown components) so an ETL run cannot silently
//! produce a context nobody asked for.

use crate::datamodel::{CaseNormalization, Context};
use crate::error::PrefixMapError;
use anyhow::{Context as _, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

const DEFAULT_REGISTRY_VERSION: &str = "prefixmaps_registry_v1";
const ENV_ALLOWED_REGISTRY_VERSIONS: &str = "PREFIXMAPS_ALLOWED_REGISTRY_VERSIONS";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A JSON-LD document whose `@context` maps prefixes to namespaces.
    Jsonld,
    /// The Gene Ontology db-xrefs YAML file.
    GoXrefs,
    /// A curated `{name, prefixes}` YAML document.
    CuratedYaml,
    /// A bioregistry extended prefix map export.
    Bioregistry,
    /// A GitHub contents listing of the w3id.org registry.
    W3id,
    /// Combination of other registered contexts.
    Merged,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Jsonld => "jsonld",
            SourceKind::GoXrefs => "go_xrefs",
            SourceKind::CuratedYaml => "curated_yaml",
            SourceKind::Bioregistry => "bioregistry",
            SourceKind::W3id => "w3id",
            SourceKind::Merged => "merged",
        }
    }
}

fn default_true() -> bool {
    true
}

/// One context declaration from the registry.
#[derive(Clone, Debug, Deserialize)]
pub struct ContextSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source: SourceKind,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub upper: bool,
    #[serde(default)]
    pub lower: bool,
    #[serde(default)]
    pub merged_from: Vec<String>,
    #[serde(default = "default_true")]
    pub filter_dubious: bool,
    #[serde(default)]
    pub comments: Vec<String>,
}

impl ContextSpec {
    pub fn case(&self) -> Result<CaseNormalization, PrefixMapError> {
        CaseNormalization::from_flags(self.upper, self.lower, &self.name)
    }

    /// An empty context carrying this declaration's metadata.
    pub fn empty_context(&self) -> Result<Context> {
        let mut context = Context::new(&self.name).with_case(self.case()?);
        context.description = self.description.clone();
        context.comments = self.comments.clone();
        context.location = self.location.clone();
        context.format = Some(
            self.format
                .clone()
                .unwrap_or_else(|| self.source.as_str().to_string()),
        );
        context.merged_from = self.merged_from.clone();
        Ok(context)
    }

    /// Copy registry metadata onto a context that was read from disk.
    pub fn annotate(&self, context: &mut Context) -> Result<()> {
        let template = self.empty_context()?;
        context.description = template.description;
        context.comments = template.comments;
        context.location = template.location;
        context.format = template.format;
        context.merged_from = template.merged_from;
        context.case = template.case;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    registry_version: String,
    contexts: Vec<ContextSpec>,
}

/// Context declarations keyed by name, in file order.
#[derive(Clone, Debug)]
pub struct ContextRegistry {
    registry_version: String,
    contexts: Vec<ContextSpec>,
    by_name: BTreeMap<String, usize>,
}

impl ContextRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading context registry {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("loading {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        let file: RegistryFile =
            serde_yaml::from_str(text).context("parsing context registry yaml")?;
        validate_registry_version(&file.registry_version)?;
        let by_name = build_index(&file.contexts)?;
        Ok(Self {
            registry_version: file.registry_version,
            contexts: file.contexts,
            by_name,
        })
    }

    pub fn registry_version(&self) -> &str {
        &self.registry_version
    }

    pub fn get(&self, name: &str) -> Option<&ContextSpec> {
        self.by_name.get(name).map(|idx| &self.contexts[*idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Declarations in file order.
    pub fn specs(&self) -> impl Iterator<Item = &ContextSpec> {
        self.contexts.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().map(|spec| spec.name.as_str())
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    PrefixMapError::InvalidRegistry(message.into()).into()
}

fn validate_registry_version(version: &str) -> Result<()> {
    if version.is_empty() {
        return Err(invalid("registry_version must not be empty"));
    }
    let allowed = allowed_registry_versions();
    if !allowed.contains(version) {
        return Err(invalid(format!(
            "registry_version '{version}' not in allowed set {allowed:?}"
        )));
    }
    Ok(())
}

pub fn allowed_registry_versions() -> BTreeSet<String> {
    let mut versions: BTreeSet<String> = BTreeSet::new();
    versions.insert(DEFAULT_REGISTRY_VERSION.to_string());
    if let Ok(raw) = std::env::var(ENV_ALLOWED_REGISTRY_VERSIONS) {
        for v in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            versions.insert(v.to_string());
        }
    }
    versions
}

/// Context names double as file stems, so keep them to a safe alphabet.
pub fn is_valid_context_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn build_index(contexts: &[ContextSpec]) -> Result<BTreeMap<String, usize>> {
    if contexts.is_empty() {
        return Err(invalid("registry declares no contexts"));
    }

    let mut map = BTreeMap::new();
    for (idx, spec) in contexts.iter().enumerate() {
        if !is_valid_context_name(&spec.name) {
            return Err(invalid(format!(
                "context name must match ^[A-Za-z0-9_.-]+$, got '{}'",
                spec.name
            )));
        }
        if map.insert(spec.name.clone(), idx).is_some() {
            return Err(invalid(format!("duplicate context name {}", spec.name)));
        }
        spec.case()?;
        match spec.source {
            SourceKind::Merged => {
                if spec.merged_from.is_empty() {
                    return Err(invalid(format!(
                        "merged context {} must list merged_from",
                        spec.name
                    )));
                }
            }
            _ => {
                if spec.location.as_deref().is_none_or(|l| l.trim().is_empty()) {
                    return Err(invalid(format!("context {} has no location", spec.name)));
                }
                if !spec.merged_from.is_empty() {
                    return Err(invalid(format!(
                        "context {} sets merged_from but its source is {}",
                        spec.name,
                        spec.source.as_str()
                    )));
                }
            }
        }
    }

    for spec in contexts {
        for component in &spec.merged_from {
            if component == &spec.name {
                return Err(invalid(format!("context {} merges itself", spec.name)));
            }
            if !map.contains_key(component) {
                return Err(invalid(format!(
                    "context {} merges unknown context {}",
                    spec.name, component
                )));
            }
        }
    }
    Ok(map)
}
