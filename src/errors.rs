//! Watch Engine Error Hierarchy
//!
//! Errors are grouped by who is expected to handle them:
//! - [`UsageError`] is raised to the caller of the offending operation.
//! - [`CallbackError`] never reaches a caller; it is forwarded to the
//!   [`ErrorSink`](crate::ErrorSink) while the digest keeps draining.
//! - [`DivergenceError`] aborts a digest and is raised to the caller of
//!   `flush`/`deliver`.

use std::fmt;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid calls into the engine (fail fast)
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Listener, subscriber or async callback failures
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// Digest did not converge within the iteration ceiling
    #[error(transparent)]
    Divergence(#[from] DivergenceError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("Invalid watch expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: String },

    /// `flush` or `deliver` called while a digest is already running
    #[error("Digest already in progress")]
    ReentrantDigest,
}

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error("Callback `{label}` failed: {source}")]
    Failed {
        label: String,
        #[source]
        source: BoxError,
    },

    #[error("Callback `{label}` panicked: {message}")]
    Panicked { label: String, message: String },
}

impl CallbackError {
    pub fn label(&self) -> &str {
        match self {
            CallbackError::Failed { label, .. } => label,
            CallbackError::Panicked { label, .. } => label,
        }
    }
}

/// Raised when a digest keeps producing work past the iteration ceiling.
///
/// `trace` holds, oldest first, the labels of the callbacks invoked in the
/// last few iterations before the abort.
#[derive(Debug, thiserror::Error)]
pub struct DivergenceError {
    pub iterations: u32,
    pub trace: Vec<Vec<String>>,
}

impl fmt::Display for DivergenceError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "Digest did not settle after {} iterations. Last iterations:",
            self.iterations
        )?;
        for (offset, labels) in self.trace.iter().enumerate() {
            write!(f, " [{}: {}]", offset, labels.join(", "))?;
        }
        Ok(())
    }
}

impl Error {
    /// Label of the failing callback, if this is a callback error.
    pub fn callback_label(&self) -> Option<&str> {
        match self {
            Error::Callback(e) => Some(e.label()),
            _ => None,
        }
    }
}
