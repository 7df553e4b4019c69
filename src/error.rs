//! Error types for the prefetch dependency resolver.

use thiserror::Error;

/// Errors raised while resolving a tree.
///
/// These never escape [`crate::resolver::Resolver::resolve`]; they are carried
/// on the resolution as a diagnostic instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Dependency '{id}' failed to resolve: {cause:#}")]
    Dependency { id: String, cause: anyhow::Error },

    #[error("Dependency id '{0}' was resolved more than once in a single run")]
    DuplicateId(String),
}

impl ResolveError {
    /// Dependency id the error is attached to.
    pub fn id(&self) -> &str {
        match self {
            ResolveError::Dependency { id, .. } | ResolveError::DuplicateId(id) => id,
        }
    }
}

/// Errors from the outer surfaces: configuration, manifests, CLI.
#[derive(Debug, Error)]
pub enum PrefetchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<config::ConfigError> for PrefetchError {
    fn from(err: config::ConfigError) -> Self {
        PrefetchError::Config(err.to_string())
    }
}
