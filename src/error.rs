//! Typed failures that callers and binaries need to tell apart.
//!
//! Library functions return `anyhow::Result`; these variants ride inside the
//! `anyhow::Error` and can be recovered with `downcast_ref`. Binaries map them
//! to stable exit codes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefixMapError {
    #[error("unknown context '{name}'; known contexts: {}", known.join(", "))]
    UnknownContext { name: String, known: Vec<String> },

    #[error(
        "context '{name}' is registered but {} does not exist; run slurp-prefixmaps to generate it",
        path.display()
    )]
    MissingResource { name: String, path: PathBuf },

    #[error("invalid prefix expansion status '{0}'")]
    InvalidStatus(String),

    #[error("context '{context}' cannot normalize prefixes to both upper and lower case")]
    ConflictingCase { context: String },

    #[error("invalid context registry: {0}")]
    InvalidRegistry(String),

    #[error("data directory {} has no contexts.yaml", path.display())]
    InvalidDataDir { path: PathBuf },

    #[error("duplicate prefix '{prefix}' in extended prefix map")]
    DuplicatePrefix { prefix: String },

    #[error("duplicate URI prefix '{uri_prefix}' in extended prefix map")]
    DuplicateUriPrefix { uri_prefix: String },

    #[error("failed to fetch {location}: {message}")]
    Fetch { location: String, message: String },

    #[error("{source_name} payload no longer matches the expected shape:\n{details}")]
    RegistryDrift { source_name: String, details: String },
}

impl PrefixMapError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PrefixMapError::InvalidRegistry(_)
            | PrefixMapError::ConflictingCase { .. }
            | PrefixMapError::InvalidDataDir { .. } => 2,
            PrefixMapError::UnknownContext { .. } | PrefixMapError::MissingResource { .. } => 3,
            PrefixMapError::Fetch { .. } => 4,
            PrefixMapError::RegistryDrift { .. } | PrefixMapError::InvalidStatus(_) => 5,
            PrefixMapError::DuplicatePrefix { .. } | PrefixMapError::DuplicateUriPrefix { .. } => 1,
        }
    }
}

/// Exit code for an arbitrary error chain; untyped failures map to 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PrefixMapError>())
        .map(PrefixMapError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (PrefixMapError::InvalidRegistry("x".into()), 2),
            (
                PrefixMapError::UnknownContext {
                    name: "nope".into(),
                    known: vec![],
                },
                3,
            ),
            (
                PrefixMapError::Fetch {
                    location: "http://example.org".into(),
                    message: "timeout".into(),
                },
                4,
            ),
            (
                PrefixMapError::RegistryDrift {
                    source_name: "bioregistry".into(),
                    details: "missing uri_prefix".into(),
                },
                5,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.exit_code(), code);
        }
    }

    #[test]
    fn exit_code_survives_added_context() {
        let result: anyhow::Result<()> = Err(PrefixMapError::MissingResource {
            name: "obo".into(),
            path: PathBuf::from("/tmp/obo.csv"),
        }
        .into());
        let err = result.context("loading obo").unwrap_err();
        assert_eq!(exit_code_for(&err), 3);
        assert_eq!(exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
