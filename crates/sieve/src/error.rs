//! Error types for the sieve crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A boxed error raised by an adapter or a custom method.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`SieveProcessor::apply`](crate::SieveProcessor::apply)
/// when `throw_exceptions` is on.
#[derive(Debug, Error)]
pub enum SieveError {
    /// A filter or sort name matched no field and no custom method.
    #[error("{method} not found.")]
    MethodNotFound { method: String },

    /// A custom method exists under the name but cannot produce a query.
    #[error("{method} failed. Expected custom method return type '{expected}' but got '{actual}'.")]
    IncompatibleMethod {
        method: String,
        expected: String,
        actual: String,
    },

    /// Any other failure during processing, keeping the original as source.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl SieveError {
    /// A name that resolves to nothing.
    pub fn method_not_found(method: impl Into<String>) -> Self {
        SieveError::MethodNotFound {
            method: method.into(),
        }
    }

    /// A name that resolves to something other than what was expected.
    pub fn incompatible(
        method: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SieveError::IncompatibleMethod {
            method: method.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Wraps an arbitrary error, using its message as this error's message.
    pub fn wrap(source: BoxError) -> Self {
        SieveError::Failed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// The filter or sort name this error is about, if any.
    pub fn method(&self) -> Option<&str> {
        match self {
            SieveError::MethodNotFound { method }
            | SieveError::IncompatibleMethod { method, .. } => Some(method),
            SieveError::Failed { .. } => None,
        }
    }
}

/// Result type for sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;

/// Errors from locating or reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file exists and one was required.
    #[error("no sieve.config file found in {}", .dir.display())]
    NotFound { dir: PathBuf },

    /// The file extension is not one of `.json`, `.yaml`, `.yml`.
    #[error("unsupported config format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages() {
        assert_eq!(
            SieveError::method_not_found("missing").to_string(),
            "missing not found."
        );
        assert_eq!(
            SieveError::incompatible("custom", "function", "string").to_string(),
            "custom failed. Expected custom method return type 'function' but got 'string'."
        );
    }

    #[test]
    fn wrapped_error_keeps_source() {
        let inner: BoxError = "boom".into();
        let err = SieveError::wrap(inner);
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".into()));
        assert_eq!(err.method(), None);
    }

    #[test]
    fn method_name() {
        assert_eq!(SieveError::method_not_found("x").method(), Some("x"));
        assert_eq!(SieveError::incompatible("y", "a", "b").method(), Some("y"));
    }
}
