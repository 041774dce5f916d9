//! Bundled context resources.
//!
//! The data directory holds one CSV file per generated context, the context
//! registry (`contexts.yaml`) describing where each context comes from, and
//! curated ETL inputs under `input/`. `ContextRegistry` is the validated view
//! of the registry file; `ContextStore` pairs it with the directory for
//! loading.

pub mod registry;
pub mod store;

pub use registry::{ContextRegistry, ContextSpec, SourceKind};
pub use store::ContextStore;

/// Registry file name inside the data directory.
pub const REGISTRY_FILE: &str = "contexts.yaml";

/// Extension of serialized contexts.
pub const CONTEXT_EXTENSION: &str = "csv";
