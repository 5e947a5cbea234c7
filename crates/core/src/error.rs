use thiserror::Error;

/// Result type for locator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for locator operations
#[derive(Error, Debug)]
pub enum Error {
    /// Recognition string cannot be used for a search
    #[error("Malformed recognition path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// The element tree could not be read
    #[error("Adapter failure: {0}")]
    AdapterFailure(String),

    /// No element matched before the timeout (or single pass) ran out
    #[error("No element matched '{recognition}' within {timeout_secs}s (searched for {elapsed_ms}ms)")]
    NotFound {
        recognition: String,
        timeout_secs: u64,
        elapsed_ms: u64,
    },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree snapshot or report (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    /// Creates a malformed path error
    pub fn malformed_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an adapter failure
    pub fn adapter(msg: impl Into<String>) -> Self {
        Self::AdapterFailure(msg.into())
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// True for errors that mean the element tree itself was unreachable
    pub fn is_adapter_failure(&self) -> bool {
        matches!(self, Self::AdapterFailure(_))
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
