//! Where baseline indexes and payloads come from.
//!
//! A [`BaselineSource`] fetches the baseline index document and individual
//! baseline SBOM payloads by their `path`. Sources are I/O only; caching
//! lives in [`BaselineCatalog`](super::BaselineCatalog).

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{BaselineConfig, BASELINE_INDEX_FILE};
use crate::error::{EnrichError, ErrorContext, FetchErrorKind, Result};
use crate::model::BaselineIndex;

/// Async access to a baseline index and its payloads.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    /// Fetch and parse the baseline index.
    ///
    /// A missing index is reported as a not-found fetch error so callers can
    /// tell it apart from transport failures.
    async fn fetch_index(&self) -> Result<BaselineIndex>;

    /// Fetch a raw baseline SBOM document by its index `path`.
    async fn fetch_payload(&self, path: &str) -> Result<Value>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Build the source a baseline configuration points at.
///
/// Returns `Ok(None)` when no baseline location is configured.
pub fn source_from_config(config: &BaselineConfig) -> Result<Option<Box<dyn BaselineSource>>> {
    if let Some(ref dir) = config.directory {
        return Ok(Some(Box::new(FileBaselineSource::new(dir))));
    }
    if let Some(ref url) = config.index_url {
        return http_source(url, config.timeout_secs);
    }
    Ok(None)
}

#[cfg(feature = "http")]
fn http_source(url: &str, timeout_secs: u64) -> Result<Option<Box<dyn BaselineSource>>> {
    let source = HttpBaselineSource::new(url, std::time::Duration::from_secs(timeout_secs))?;
    Ok(Some(Box::new(source)))
}

#[cfg(not(feature = "http"))]
fn http_source(url: &str, _timeout_secs: u64) -> Result<Option<Box<dyn BaselineSource>>> {
    Err(EnrichError::config(format!(
        "baseline index URL {url} requires the `http` feature"
    )))
}

// ============================================================================
// Filesystem
// ============================================================================

/// Baselines stored in a local directory holding `index.json`.
#[derive(Debug, Clone)]
pub struct FileBaselineSource {
    root: PathBuf,
}

impl FileBaselineSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an index `path` onto the root directory.
    ///
    /// Index paths are usually site-absolute (`/baseline-sboms/npm/react.json`),
    /// so a leading separator and a leading segment equal to the root's own
    /// directory name are both stripped. Parent-directory segments are refused.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches(['/', '\\']));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(EnrichError::validation(format!(
                "baseline path '{path}' escapes the baseline directory"
            )));
        }

        let direct = self.root.join(relative);
        if direct.exists() {
            return Ok(direct);
        }
        if let Some(root_name) = self.root.file_name() {
            if let Ok(rest) = relative.strip_prefix(root_name) {
                return Ok(self.root.join(rest));
            }
        }
        Ok(direct)
    }

    async fn read_json(&self, path: &Path) -> Result<Value> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EnrichError::fetch(
                    path.display().to_string(),
                    FetchErrorKind::NotFound(path.display().to_string()),
                )
            } else {
                EnrichError::io(path, e)
            }
        })?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }
}

#[async_trait]
impl BaselineSource for FileBaselineSource {
    async fn fetch_index(&self) -> Result<BaselineIndex> {
        let path = self.root.join(BASELINE_INDEX_FILE);
        let value = self.read_json(&path).await?;
        serde_json::from_value(value).context("reading baseline index")
    }

    async fn fetch_payload(&self, path: &str) -> Result<Value> {
        let resolved = self.resolve(path)?;
        self.read_json(&resolved).await
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Baselines served over HTTP; payload paths are resolved against the index URL.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpBaselineSource {
    client: reqwest::Client,
    index_url: reqwest::Url,
}

#[cfg(feature = "http")]
impl HttpBaselineSource {
    /// Create a source for the given index URL.
    pub fn new(index_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let index_url = reqwest::Url::parse(index_url)
            .map_err(|e| EnrichError::config(format!("invalid baseline index URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| {
                EnrichError::fetch(
                    "creating HTTP client",
                    FetchErrorKind::NetworkError(e.to_string()),
                )
            })?;
        Ok(Self { client, index_url })
    }

    async fn get_json(&self, url: reqwest::Url) -> Result<Value> {
        tracing::debug!("Fetching {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichError::fetch(
                url.to_string(),
                FetchErrorKind::NotFound(url.to_string()),
            ));
        }
        if !status.is_success() {
            return Err(EnrichError::fetch(
                url.to_string(),
                FetchErrorKind::Status {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("unknown").to_string(),
                },
            ));
        }

        response
            .json::<Value>()
            .await
            .with_context(|| format!("decoding {url}"))
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl BaselineSource for HttpBaselineSource {
    async fn fetch_index(&self) -> Result<BaselineIndex> {
        let value = self.get_json(self.index_url.clone()).await?;
        serde_json::from_value(value).context("reading baseline index")
    }

    async fn fetch_payload(&self, path: &str) -> Result<Value> {
        let url = self.index_url.join(path).map_err(|e| {
            EnrichError::fetch(
                path.to_string(),
                FetchErrorKind::InvalidResponse(format!("invalid baseline path: {e}")),
            )
        })?;
        self.get_json(url).await
    }

    fn describe(&self) -> String {
        self.index_url.to_string()
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// A fixed index and payload table, for hosts that embed their baselines.
#[derive(Debug, Clone, Default)]
pub struct StaticBaselineSource {
    index: Option<BaselineIndex>,
    payloads: HashMap<String, Value>,
}

impl StaticBaselineSource {
    #[must_use]
    pub fn new(index: BaselineIndex) -> Self {
        Self {
            index: Some(index),
            payloads: HashMap::new(),
        }
    }

    /// A source with no index at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_payload(mut self, path: impl Into<String>, payload: Value) -> Self {
        self.payloads.insert(path.into(), payload);
        self
    }
}

#[async_trait]
impl BaselineSource for StaticBaselineSource {
    async fn fetch_index(&self) -> Result<BaselineIndex> {
        self.index.clone().ok_or_else(|| {
            EnrichError::fetch(
                BASELINE_INDEX_FILE,
                FetchErrorKind::NotFound("no baseline index configured".to_string()),
            )
        })
    }

    async fn fetch_payload(&self, path: &str) -> Result<Value> {
        self.payloads
            .get(path)
            .cloned()
            .ok_or_else(|| EnrichError::fetch(path, FetchErrorKind::NotFound(path.to_string())))
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
