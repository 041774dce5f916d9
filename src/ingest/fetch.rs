//! Reading source text from HTTP or the local data directory.

use crate::error::PrefixMapError;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Retrieves the body of a remote location.
pub trait Fetch {
    fn fetch_text(&self, location: &str) -> Result<String>;
}

impl<F: Fetch + ?Sized> Fetch for Box<F> {
    fn fetch_text(&self, location: &str) -> Result<String> {
        (**self).fetch_text(location)
    }
}

/// Blocking HTTP fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("prefixmaps/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(&self, location: &str) -> Result<String> {
        debug!("GET {location}");
        let response = self
            .agent
            .get(location)
            .set(
                "Accept",
                "application/json, application/ld+json, application/yaml, text/plain, */*",
            )
            .call();
        let fetch_error = |message: String| PrefixMapError::Fetch {
            location: location.to_string(),
            message,
        };
        match response {
            Ok(resp) => Ok(resp
                .into_string()
                .map_err(|err| fetch_error(format!("reading body: {err}")))?),
            Err(ureq::Error::Status(code, _)) => {
                Err(fetch_error(format!("HTTP status {code}")).into())
            }
            Err(ureq::Error::Transport(err)) => Err(fetch_error(err.to_string()).into()),
        }
    }
}

/// Canned responses keyed by location. Unknown locations fail as a fetch
/// error, so an empty instance doubles as an offline fetcher.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    responses: BTreeMap<String, String>,
}

impl StaticFetcher {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, location: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(location.into(), body.into());
        self
    }
}

impl Fetch for StaticFetcher {
    fn fetch_text(&self, location: &str) -> Result<String> {
        self.responses.get(location).cloned().ok_or_else(|| {
            PrefixMapError::Fetch {
                location: location.to_string(),
                message: "network access disabled and no local copy registered".to_string(),
            }
            .into()
        })
    }
}

/// Routes `http(s)://` locations to a fetcher and everything else to the
/// filesystem, relative to `base_dir`.
pub struct SourceReader {
    base_dir: PathBuf,
    fetcher: Box<dyn Fetch>,
}

impl SourceReader {
    pub fn new(base_dir: impl Into<PathBuf>, fetcher: impl Fetch + 'static) -> Self {
        Self {
            base_dir: base_dir.into(),
            fetcher: Box::new(fetcher),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn read(&self, location: &str) -> Result<String> {
        if is_remote(location) {
            return self.fetcher.fetch_text(location);
        }
        let candidate = Path::new(location);
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir.join(candidate)
        };
        debug!("reading {}", path.display());
        fs::read_to_string(&path).with_context(|| format!("reading source {}", path.display()))
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reader_routes_by_scheme() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("local.yaml"), "prefixes: {}\n")?;
        let reader = SourceReader::new(
            dir.path(),
            StaticFetcher::offline().with_response("https://example.org/a.json", "[]"),
        );
        assert_eq!(reader.read("local.yaml")?, "prefixes: {}\n");
        assert_eq!(reader.read("https://example.org/a.json")?, "[]");

        let err = reader.read("https://example.org/missing.json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrefixMapError>(),
            Some(PrefixMapError::Fetch { .. })
        ));
        assert!(reader.read("absent.yaml").is_err());
        Ok(())
    }
}
