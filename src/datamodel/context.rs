//! Contexts: localized, internally consistent collections of prefix expansions.
//!
//! The canonical expansions of a context are bijective. Nothing guarantees
//! consistency between two different contexts; `combine` resolves collisions by
//! keeping the receiver canonical and demoting the incoming entry to an alias.

use crate::curie::{Converter, Record};
use crate::datamodel::{PrefixExpansion, StatusType};
use crate::error::PrefixMapError;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::warn;

/// Case policy applied to prefixes added without `preferred`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseNormalization {
    #[default]
    None,
    Upper,
    Lower,
}

impl CaseNormalization {
    /// Build from the `upper`/`lower` flags used in the context registry.
    pub fn from_flags(upper: bool, lower: bool, context: &str) -> Result<Self, PrefixMapError> {
        match (upper, lower) {
            (true, true) => Err(PrefixMapError::ConflictingCase {
                context: context.to_string(),
            }),
            (true, false) => Ok(CaseNormalization::Upper),
            (false, true) => Ok(CaseNormalization::Lower),
            (false, false) => Ok(CaseNormalization::None),
        }
    }

    fn apply(&self, prefix: &str) -> String {
        match self {
            CaseNormalization::None => prefix.to_string(),
            CaseNormalization::Upper => prefix.to_uppercase(),
            CaseNormalization::Lower => prefix.to_lowercase(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    pub name: String,
    pub description: Option<String>,
    pub comments: Vec<String>,
    pub location: Option<String>,
    pub format: Option<String>,
    pub merged_from: Vec<String>,
    pub case: CaseNormalization,
    prefix_expansions: Vec<PrefixExpansion>,
    // Lowercased lookups kept in step with `prefix_expansions`.
    seen_prefixes: HashSet<String>,
    seen_namespaces: HashSet<String>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_case(mut self, case: CaseNormalization) -> Self {
        self.case = case;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn prefix_expansions(&self) -> &[PrefixExpansion] {
        &self.prefix_expansions
    }

    pub fn len(&self) -> usize {
        self.prefix_expansions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix_expansions.is_empty()
    }

    pub fn canonical_count(&self) -> usize {
        self.prefix_expansions
            .iter()
            .filter(|pe| pe.canonical())
            .count()
    }

    /// Append an expansion exactly as stored, without alias classification.
    ///
    /// Used when reading serialized contexts whose statuses were decided by
    /// the ETL run that wrote them.
    pub fn push_expansion(&mut self, expansion: PrefixExpansion) {
        self.seen_prefixes.insert(expansion.prefix.to_lowercase());
        self.seen_namespaces
            .insert(expansion.namespace.to_lowercase());
        self.prefix_expansions.push(expansion);
    }

    /// Add a prefix expansion, classifying it against what is already present.
    ///
    /// Unless `preferred` is set the prefix is first normalized to the
    /// context's case policy. Collisions are detected case-insensitively: a
    /// known prefix with a new namespace becomes a prefix alias, a new prefix
    /// with a known namespace becomes a namespace alias, and an entry whose
    /// prefix and namespace are both known is dropped.
    ///
    /// Returns the status the entry was stored with, or `None` if dropped.
    pub fn add_prefix(
        &mut self,
        prefix: &str,
        namespace: &str,
        status: StatusType,
        preferred: bool,
    ) -> Option<StatusType> {
        let prefix = if preferred {
            prefix.to_string()
        } else {
            self.case.apply(prefix)
        };
        let known_prefix = self.seen_prefixes.contains(&prefix.to_lowercase());
        let known_namespace = self.seen_namespaces.contains(&namespace.to_lowercase());
        let status = match (known_prefix, known_namespace) {
            (true, true) => return None,
            (true, false) => StatusType::PrefixAlias,
            (false, true) => StatusType::NamespaceAlias,
            (false, false) => status,
        };
        self.push_expansion(PrefixExpansion::new(
            self.name.clone(),
            prefix,
            namespace,
            status,
        ));
        Some(status)
    }

    /// Merge `other` into this context; this context takes precedence.
    ///
    /// The canonical expansions of `other` are replayed before its aliases,
    /// each group in stored order, so an alias row that sorts ahead of its
    /// canonical row on disk cannot take the canonical slot's namespace.
    pub fn combine(&mut self, other: &Context) {
        let (canonical, aliases): (Vec<&PrefixExpansion>, Vec<&PrefixExpansion>) = other
            .prefix_expansions
            .iter()
            .partition(|pe| pe.canonical());
        for pe in canonical.into_iter().chain(aliases) {
            self.add_prefix(&pe.prefix, &pe.namespace, pe.status, false);
        }
    }

    /// Expansions matching every supplied field exactly.
    pub fn filter(&self, prefix: Option<&str>, namespace: Option<&str>) -> Vec<&PrefixExpansion> {
        self.prefix_expansions
            .iter()
            .filter(|pe| prefix.is_none_or(|p| p == pe.prefix))
            .filter(|pe| namespace.is_none_or(|ns| ns == pe.namespace))
            .collect()
    }

    /// Unique prefixes across all expansions, sorted.
    pub fn prefixes(&self, lower: bool) -> Vec<String> {
        unique(self.prefix_expansions.iter().map(|pe| pe.prefix.as_str()), lower)
    }

    /// Unique namespaces across all expansions, sorted.
    pub fn namespaces(&self, lower: bool) -> Vec<String> {
        unique(
            self.prefix_expansions.iter().map(|pe| pe.namespace.as_str()),
            lower,
        )
    }

    /// Canonical prefix → namespace. Safe for RDF document headers.
    pub fn as_dict(&self) -> BTreeMap<String, String> {
        self.prefix_expansions
            .iter()
            .filter(|pe| pe.canonical())
            .map(|pe| (pe.prefix.clone(), pe.namespace.clone()))
            .collect()
    }

    /// Canonical namespace → prefix.
    pub fn as_inverted_dict(&self) -> BTreeMap<String, String> {
        self.prefix_expansions
            .iter()
            .filter(|pe| pe.canonical())
            .map(|pe| (pe.namespace.clone(), pe.prefix.clone()))
            .collect()
    }

    /// One record per canonical prefix, carrying alias information as synonyms.
    ///
    /// Prefix aliases contribute URI prefix synonyms to their prefix; namespace
    /// aliases contribute prefix synonyms to the canonical owner of their
    /// namespace. A namespace alias whose namespace has no canonical owner is
    /// skipped with a warning.
    pub fn as_extended_prefix_map(&self) -> Vec<Record> {
        let prefix_map = self.as_dict();
        let reverse_prefix_map = self.as_inverted_dict();

        let mut uri_prefix_synonyms: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
        let mut prefix_synonyms: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
        for pe in &self.prefix_expansions {
            match pe.status {
                StatusType::PrefixAlias => {
                    uri_prefix_synonyms
                        .entry(pe.prefix.as_str())
                        .or_default()
                        .insert(pe.namespace.clone());
                }
                StatusType::NamespaceAlias => match reverse_prefix_map.get(&pe.namespace) {
                    Some(owner) => {
                        prefix_synonyms
                            .entry(owner.as_str())
                            .or_default()
                            .insert(pe.prefix.clone());
                    }
                    None => warn!(
                        context = %self.name,
                        "namespace {} has no canonical prefix", pe.namespace
                    ),
                },
                StatusType::Canonical | StatusType::MultiAlias => {}
            }
        }

        prefix_map
            .iter()
            .map(|(prefix, uri_prefix)| Record {
                prefix: prefix.clone(),
                uri_prefix: uri_prefix.clone(),
                prefix_synonyms: prefix_synonyms
                    .remove(prefix.as_str())
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default(),
                uri_prefix_synonyms: uri_prefix_synonyms
                    .remove(prefix.as_str())
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn as_converter(&self) -> Result<Converter> {
        Converter::from_extended_prefix_map(self.as_extended_prefix_map())
    }

    /// Syntax messages for each expansion (canonical ones only if asked).
    pub fn validate(&self, canonical_only: bool) -> Vec<String> {
        self.prefix_expansions
            .iter()
            .filter(|pe| !canonical_only || pe.canonical())
            .flat_map(PrefixExpansion::validate)
            .collect()
    }

    /// Structural consistency of the canonical set and its aliases.
    pub fn integrity_report(&self) -> IntegrityReport {
        let mut report = IntegrityReport::default();
        let mut canonical_prefixes = BTreeSet::new();
        let mut canonical_namespaces = BTreeSet::new();
        for pe in self.prefix_expansions.iter().filter(|pe| pe.canonical()) {
            if !canonical_prefixes.insert(pe.prefix.as_str()) {
                report.duplicate_prefixes.insert(pe.prefix.clone());
            }
            if !canonical_namespaces.insert(pe.namespace.as_str()) {
                report.duplicate_namespaces.insert(pe.namespace.clone());
            }
        }
        for pe in &self.prefix_expansions {
            match pe.status {
                StatusType::PrefixAlias if !canonical_prefixes.contains(pe.prefix.as_str()) => {
                    report
                        .orphan_prefix_aliases
                        .insert(pe.prefix.clone(), pe.namespace.clone());
                }
                StatusType::NamespaceAlias
                    if !canonical_namespaces.contains(pe.namespace.as_str()) =>
                {
                    report
                        .orphan_namespace_aliases
                        .insert(pe.namespace.clone(), pe.prefix.clone());
                }
                _ => {}
            }
        }
        report
    }
}

fn unique<'a>(values: impl Iterator<Item = &'a str>, lower: bool) -> Vec<String> {
    values
        .map(|v| if lower { v.to_lowercase() } else { v.to_string() })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Integrity problems found in a single context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub duplicate_prefixes: BTreeSet<String>,
    pub duplicate_namespaces: BTreeSet<String>,
    /// prefix → namespace for prefix aliases with no canonical prefix.
    pub orphan_prefix_aliases: BTreeMap<String, String>,
    /// namespace → prefix for namespace aliases with no canonical namespace.
    pub orphan_namespace_aliases: BTreeMap<String, String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_prefixes.is_empty()
            && self.duplicate_namespaces.is_empty()
            && self.orphan_prefix_aliases.is_empty()
            && self.orphan_namespace_aliases.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for prefix in &self.duplicate_prefixes {
            messages.push(format!("multiple canonical records with prefix {prefix}"));
        }
        for namespace in &self.duplicate_namespaces {
            messages.push(format!("multiple canonical records with namespace {namespace}"));
        }
        for (prefix, namespace) in &self.orphan_prefix_aliases {
            messages.push(format!(
                "prefix alias {prefix} => {namespace} has no canonical prefix"
            ));
        }
        for (namespace, prefix) in &self.orphan_namespace_aliases {
            messages.push(format!(
                "namespace alias {prefix} => {namespace} has no canonical namespace"
            ));
        }
        messages
    }
}
