//! Engine configuration.
//!
//! [`StreamOptions`] configures the sequential engine (stage queue capacity
//! and an optional timeout), [`ParallelOptions`] the parallel engine (worker
//! count). Both can be built in code or loaded from JSON:
//!
//! ```
//! use ironstream::options::{ParallelOptions, StreamOptions};
//! use std::time::Duration;
//!
//! # fn main() -> anyhow::Result<()> {
//! let opts = StreamOptions::from_json(r#"{ "buffer_size": 64, "timeout_ms": 250 }"#)?;
//! assert_eq!(opts.buffer_size, 64);
//! assert_eq!(opts.timeout, Some(Duration::from_millis(250)));
//!
//! let par = ParallelOptions::from_json(r#"{ "workers": 3 }"#)?;
//! assert_eq!(par.workers, 3);
//! # Ok(())
//! # }
//! ```
//!
//! JSON input is validated strictly. Options passed directly to
//! [`Stream::with_options`](crate::Stream::with_options) are instead
//! normalized: a zero buffer size falls back to [`DEFAULT_BUFFER_SIZE`].

use crate::error::StreamError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::warn;

/// Stage queue capacity used when none (or zero) is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Capacity of every stage queue.
    pub buffer_size: usize,
    /// Time budget measured from stream construction. `None` (or zero) means
    /// no deadline.
    #[serde(rename = "timeout_ms", with = "timeout_ms")]
    pub timeout: Option<Duration>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            timeout: None,
        }
    }
}

impl StreamOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parse and validate options from a JSON document.
    ///
    /// # Errors
    /// Fails on malformed JSON or with [`StreamError::InvalidOptions`] when
    /// `buffer_size` is zero.
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(json).context("parsing stream options")?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// [`StreamError::InvalidOptions`] when `buffer_size` is zero.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.buffer_size == 0 {
            return Err(StreamError::InvalidOptions(
                "buffer_size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn normalized(self) -> Self {
        if self.buffer_size == 0 {
            warn!(
                fallback = DEFAULT_BUFFER_SIZE,
                "non-positive buffer size, using default"
            );
            return Self {
                buffer_size: DEFAULT_BUFFER_SIZE,
                ..self
            };
        }
        self
    }

    /// Absolute deadline for a stream constructed now. A timeout too large to
    /// represent as an `Instant` means no deadline.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.timeout
            .filter(|t| !t.is_zero())
            .and_then(|t| Instant::now().checked_add(t))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelOptions {
    /// Number of concurrent workers, and so the number of partition ranges.
    pub workers: usize,
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
        }
    }
}

impl ParallelOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// # Errors
    /// Fails on malformed JSON or with [`StreamError::InvalidOptions`] when
    /// `workers` is zero.
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(json).context("parsing parallel options")?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// [`StreamError::InvalidOptions`] when `workers` is zero.
    pub fn validate(&self) -> Result<(), StreamError> {
        if self.workers == 0 {
            return Err(StreamError::InvalidOptions("workers must be positive".into()));
        }
        Ok(())
    }

    pub(crate) fn normalized(self) -> Self {
        if self.workers == 0 {
            warn!("zero workers requested, using one");
            return Self { workers: 1 };
        }
        self
    }
}

mod timeout_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(v: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => s.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis))
    }
}
