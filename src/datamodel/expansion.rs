use crate::error::PrefixMapError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// W3C CURIE-ish prefix syntax.
pub static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.]+$").expect("prefix regex compiles"));

/// Restricted namespace syntax. URLs with query strings or fragments mid-path
/// are meant for humans, not for use as RDF subjects, so they are rejected.
pub static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[\w.\-/]+[#/_:]$").expect("namespace regex compiles")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    /// Canonical in both directions; the canonical set of a context is bijective.
    Canonical,
    /// The prefix is an alias for an existing canonical prefix.
    PrefixAlias,
    /// The namespace is an alias for an existing canonical namespace.
    NamespaceAlias,
    /// Both prefix and namespace alias existing canonical entries.
    MultiAlias,
}

impl StatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusType::Canonical => "canonical",
            StatusType::PrefixAlias => "prefix_alias",
            StatusType::NamespaceAlias => "namespace_alias",
            StatusType::MultiAlias => "multi_alias",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusType {
    type Err = PrefixMapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "canonical" => Ok(StatusType::Canonical),
            "prefix_alias" => Ok(StatusType::PrefixAlias),
            "namespace_alias" => Ok(StatusType::NamespaceAlias),
            "multi_alias" => Ok(StatusType::MultiAlias),
            other => Err(PrefixMapError::InvalidStatus(other.to_string())),
        }
    }
}

/// A single prefix → namespace mapping inside a context (a SHACL
/// `PrefixDeclaration`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixExpansion {
    pub context: String,
    pub prefix: String,
    pub namespace: String,
    pub status: StatusType,
}

impl PrefixExpansion {
    pub fn new(
        context: impl Into<String>,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        status: StatusType,
    ) -> Self {
        Self {
            context: context.into(),
            prefix: prefix.into(),
            namespace: namespace.into(),
            status,
        }
    }

    /// Canonicality is relative to the owning context.
    pub fn canonical(&self) -> bool {
        self.status == StatusType::Canonical
    }

    /// Check prefix and namespace syntax, returning one message per failure.
    pub fn validate(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if !PREFIX_RE.is_match(&self.prefix) {
            messages.push(format!(
                "prefix {} does not match {}",
                self.prefix,
                PREFIX_RE.as_str()
            ));
        }
        if !NAMESPACE_RE.is_match(&self.namespace) {
            messages.push(format!(
                "namespace {} does not match {} (prefix: {})",
                self.namespace,
                NAMESPACE_RE.as_str(),
                self.prefix
            ));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_all_serialized_forms() {
        for status in [
            StatusType::Canonical,
            StatusType::PrefixAlias,
            StatusType::NamespaceAlias,
            StatusType::MultiAlias,
        ] {
            assert_eq!(status.as_str().parse::<StatusType>().unwrap(), status);
        }
        assert!(matches!(
            "preferred".parse::<StatusType>(),
            Err(PrefixMapError::InvalidStatus(ref s)) if s == "preferred"
        ));
    }

    #[test]
    fn validate_accepts_semantic_namespaces() {
        let pe = PrefixExpansion::new(
            "obo",
            "GO",
            "http://purl.obolibrary.org/obo/GO_",
            StatusType::Canonical,
        );
        assert!(pe.validate().is_empty());
        let hash = PrefixExpansion::new("ld", "owl", "http://www.w3.org/2002/07/owl#", StatusType::Canonical);
        assert!(hash.validate().is_empty());
    }

    #[test]
    fn validate_flags_query_urls_and_bad_prefixes() {
        let pe = PrefixExpansion::new(
            "x",
            "bad prefix",
            "https://example.org/search?q=",
            StatusType::Canonical,
        );
        let messages = pe.validate();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("prefix bad prefix"));
        assert!(messages[1].contains("(prefix: bad prefix)"));
    }

    #[test]
    fn namespace_must_end_with_separator() {
        let pe = PrefixExpansion::new("x", "ex", "http://example.org/ns", StatusType::Canonical);
        assert_eq!(pe.validate().len(), 1);
    }
}
