//! Unified error types for inventory-enrich.
//!
//! This module provides the error hierarchy for the library, with rich
//! context for debugging and user-facing messages. Most inference
//! operations never fail; errors surface from baseline I/O, configuration
//! and rule-file loading.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for inventory-enrich operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EnrichError {
    /// Errors while parsing JSON/YAML documents
    #[error("Failed to parse document: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while fetching baseline indexes or payloads
    #[error("Baseline fetch failed: {context}")]
    Fetch {
        context: String,
        #[source]
        source: FetchErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Invalid field value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Specific fetch error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchErrorKind {
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for inventory-enrich operations
pub type Result<T> = std::result::Result<T, EnrichError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl EnrichError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error with context
    pub fn fetch(context: impl Into<String>, source: FetchErrorKind) -> Self {
        Self::Fetch {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error came from baseline I/O.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Io { .. })
    }

    /// Whether a fetched resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Fetch {
                source: FetchErrorKind::NotFound(_),
                ..
            } => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for EnrichError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for EnrichError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<serde_yaml::Error> for EnrichError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse(
            "YAML deserialization",
            ParseErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for EnrichError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::fetch(
                "decoding response",
                FetchErrorKind::InvalidResponse(err.to_string()),
            )
        } else {
            Self::fetch("HTTP request", FetchErrorKind::NetworkError(err.to_string()))
        }
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings are chained, outermost first, so a failure deep in a
/// baseline fetch reads like `"resolving asset a-1: loading payload: ..."`.
///
/// # Example
///
/// ```ignore
/// use inventory_enrich::error::ErrorContext;
///
/// let payload = source
///     .fetch_payload(&baseline.path)
///     .await
///     .with_context(|| format!("loading baseline {}", baseline.name))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<EnrichError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: EnrichError, new_ctx: &str) -> EnrichError {
    match err {
        EnrichError::Parse {
            context: existing,
            source,
        } => EnrichError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        EnrichError::Fetch {
            context: existing,
            source,
        } => EnrichError::Fetch {
            context: chain_context(new_ctx, &existing),
            source,
        },
        EnrichError::Io {
            path,
            message,
            source,
        } => EnrichError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        EnrichError::Config(msg) => EnrichError::Config(chain_context(new_ctx, &msg)),
        EnrichError::Validation(msg) => EnrichError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
