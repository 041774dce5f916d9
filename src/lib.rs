//! Semantic prefix maps: bundled contexts, merging, and registry refresh.
//!
//! Contexts are loaded from a data directory (see [`find_data_dir`]) and can
//! be combined in precedence order or turned into a CURIE [`Converter`]. The
//! ETL runner regenerates the directory from upstream registries.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod curie;
pub mod data;
pub mod datamodel;
pub mod error;
pub mod etl_runner;
pub mod ingest;
pub mod io;
pub mod logging;
pub mod schema_loader;

pub use curie::{Converter, Record};
pub use data::{ContextRegistry, ContextSpec, ContextStore, REGISTRY_FILE, SourceKind};
pub use datamodel::{CaseNormalization, Context, IntegrityReport, PrefixExpansion, StatusType};
pub use error::{PrefixMapError, exit_code_for};
pub use etl_runner::{EtlReport, EtlRunner, EtlSummary};

/// Environment override for the data directory.
pub const ENV_DATA_DIR: &str = "PREFIXMAPS_DATA_DIR";
const DATA_SUBDIR: &str = "data";

fn is_data_dir(candidate: &Path) -> bool {
    candidate.join(REGISTRY_FILE).is_file()
}

fn data_dir_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_data_dir(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

// An explicit override must point at a data directory; it never falls through
// to discovery.
fn data_dir_from_env(value: &str) -> Result<Option<PathBuf>> {
    if value.is_empty() {
        return Ok(None);
    }
    match data_dir_from_hint(value) {
        Some(dir) => Ok(Some(dir)),
        None => Err(anyhow::Error::new(PrefixMapError::InvalidDataDir {
            path: PathBuf::from(value),
        })
        .context(format!("{ENV_DATA_DIR} is set"))),
    }
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        let candidate = dir.join(DATA_SUBDIR);
        if is_data_dir(&candidate) {
            return Some(candidate);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the bundled data directory.
///
/// Order: `PREFIXMAPS_DATA_DIR`, a `data/` directory found walking up from
/// the current executable, then the path recorded at build time. A non-empty
/// `PREFIXMAPS_DATA_DIR` that is not a data directory is an error.
pub fn find_data_dir() -> Result<PathBuf> {
    if let Ok(env_dir) = env::var(ENV_DATA_DIR) {
        if let Some(dir) = data_dir_from_env(&env_dir)? {
            return Ok(dir);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(dir) = search_upwards(exe_dir) {
                return Ok(dir);
            }
        }
    }

    if let Some(hint) = option_env!("PREFIXMAPS_DATA_HINT") {
        if let Some(dir) = data_dir_from_hint(hint) {
            return Ok(dir);
        }
    }

    bail!(
        "Unable to locate the prefixmaps data directory. Set {ENV_DATA_DIR} to a directory containing {REGISTRY_FILE}."
    );
}

/// Load a bundled context by name from the default store.
pub fn load_context(name: &str) -> Result<Context> {
    ContextStore::open_default()?.load_context(name)
}

/// Load and combine bundled contexts; earlier names take precedence.
pub fn load_multi_context<S: AsRef<str>>(names: &[S]) -> Result<Context> {
    ContextStore::open_default()?.load_multi_context(names)
}

/// Converter over one or more bundled contexts.
pub fn load_converter<S: AsRef<str>>(names: &[S]) -> Result<Converter> {
    ContextStore::open_default()?.load_converter(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn search_upwards_finds_nested_data_dir() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join(REGISTRY_FILE), "registry_version: x\n").unwrap();
        let deep = temp.path().join("target/debug/deps");
        fs::create_dir_all(&deep).unwrap();

        let found = search_upwards(&deep).expect("data dir");
        assert_eq!(found, fs::canonicalize(&data).unwrap());
    }

    #[test]
    fn env_override_must_be_a_data_dir() {
        let temp = TempDir::new().unwrap();
        let value = temp.path().to_str().unwrap();
        let err = data_dir_from_env(value).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrefixMapError>(),
            Some(PrefixMapError::InvalidDataDir { path }) if path == temp.path()
        ));
        assert_eq!(exit_code_for(&err), 2);
        assert!(format!("{err:#}").contains(value));

        assert!(data_dir_from_env("").unwrap().is_none());
        fs::write(temp.path().join(REGISTRY_FILE), "").unwrap();
        assert_eq!(
            data_dir_from_env(value).unwrap(),
            Some(fs::canonicalize(temp.path()).unwrap())
        );
    }

    #[test]
    fn hint_requires_registry_file() {
        let temp = TempDir::new().unwrap();
        assert!(data_dir_from_hint(temp.path().to_str().unwrap()).is_none());
        assert!(data_dir_from_hint("").is_none());
        fs::write(temp.path().join(REGISTRY_FILE), "").unwrap();
        assert!(data_dir_from_hint(temp.path().to_str().unwrap()).is_some());
    }
}
