//! Error types surfaced by the stream engines.
//!
//! Every public fallible API returns [`anyhow::Result`]. When the failure comes
//! from the engine itself (rather than from a wrapped I/O or serde error) the
//! underlying error is a [`StreamError`], which callers can recover with
//! `err.downcast_ref::<StreamError>()` to tell usage violations apart.
//!
//! Deadline truncation is *not* an error. It is reported through
//! [`Correctness`](crate::stream::Correctness) instead.

use thiserror::Error;

/// Failures raised by the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A stage worker panicked, usually inside a caller-supplied closure.
    #[error("stage `{stage}` failed: {message}")]
    StageFailed { stage: String, message: String },

    /// The OS refused to start a stage worker thread.
    #[error("could not start stage `{stage}`: {message}")]
    Spawn { stage: String, message: String },

    /// The source does not provide a capability the operation needs.
    #[error("source does not support `{capability}`")]
    Unsupported { capability: &'static str },

    /// Explicit configuration was rejected.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The parallel worker pool could not be built.
    #[error("could not build worker pool: {0}")]
    ThreadPool(String),
}

impl StreamError {
    /// `true` for errors caused by the caller rather than by the environment.
    #[must_use]
    pub const fn is_usage_violation(&self) -> bool {
        matches!(
            self,
            Self::StageFailed { .. } | Self::Unsupported { .. } | Self::InvalidOptions(_)
        )
    }
}

/// Render a panic payload captured from a worker as a readable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
