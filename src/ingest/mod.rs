//! Builders that turn upstream prefix sources into contexts.
//!
//! Each ingest takes an (usually empty) `Context` carrying the registry's
//! metadata and case policy, adds the expansions it parsed from the source
//! text, and returns it. Fetching the text is the job of `fetch`, so ingests
//! stay free of I/O and can be exercised against fixtures.

pub mod bioregistry;
pub mod curated;
pub mod fetch;
pub mod go;
pub mod jsonld;
pub mod w3id;

pub use bioregistry::{BioregistryOptions, from_bioregistry};
pub use curated::from_curated_yaml;
pub use fetch::{DEFAULT_TIMEOUT, Fetch, HttpFetcher, SourceReader, StaticFetcher};
pub use go::from_go_xrefs;
pub use jsonld::from_jsonld;
pub use w3id::from_w3id;
