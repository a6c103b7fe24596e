use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_MAX_DIGEST_ITERATIONS;
use crate::constants::DEFAULT_QUIESCENCE_TIMEOUT_MS;
use crate::constants::DEFAULT_TRACE_DEPTH;
use crate::constants::DEFAULT_TRACE_ENTRIES_PER_ITERATION;
use crate::Error;
use crate::Result;

/// Configuration for the digest scheduler
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Maximum number of poll/drain iterations a single digest may run
    ///
    /// A digest that still has pending work after this many iterations is
    /// aborted with a divergence error and its remaining work is discarded.
    ///
    /// **Default**: 100
    #[serde(default = "default_max_digest_iterations")]
    pub max_digest_iterations: u32,

    /// Number of most recent iterations whose call trace is kept for the
    /// divergence error
    ///
    /// **Default**: 5
    #[serde(default = "default_trace_depth")]
    pub trace_depth: usize,

    /// Maximum callback labels recorded per traced iteration
    ///
    /// **Default**: 8
    #[serde(default = "default_trace_entries_per_iteration")]
    pub trace_entries_per_iteration: usize,

    /// Idle time (milliseconds) between two scheduled deliveries after which
    /// the iteration counter is reset
    ///
    /// Only affects `deliver()` chains; `flush()` always settles or aborts
    /// within one call.
    ///
    /// **Default**: 100
    #[serde(default = "default_quiescence_timeout_ms")]
    pub quiescence_timeout_ms: u64,

    /// Memoize compiled expression descriptors per expression text
    ///
    /// **Default**: true
    #[serde(default = "default_cache_expressions")]
    pub cache_expressions: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            max_digest_iterations: default_max_digest_iterations(),
            trace_depth: default_trace_depth(),
            trace_entries_per_iteration: default_trace_entries_per_iteration(),
            quiescence_timeout_ms: default_quiescence_timeout_ms(),
            cache_expressions: default_cache_expressions(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_digest_iterations == 0 {
            return Err(Error::Config(ConfigError::Message(
                "max_digest_iterations must be greater than 0".into(),
            )));
        }

        if self.trace_depth == 0 {
            return Err(Error::Config(ConfigError::Message(
                "trace_depth must be greater than 0".into(),
            )));
        }

        if self.trace_entries_per_iteration == 0 {
            return Err(Error::Config(ConfigError::Message(
                "trace_entries_per_iteration must be greater than 0".into(),
            )));
        }

        Ok(())
    }

    pub fn quiescence_timeout(&self) -> Duration {
        Duration::from_millis(self.quiescence_timeout_ms)
    }
}

fn default_max_digest_iterations() -> u32 {
    DEFAULT_MAX_DIGEST_ITERATIONS
}
fn default_trace_depth() -> usize {
    DEFAULT_TRACE_DEPTH
}
fn default_trace_entries_per_iteration() -> usize {
    DEFAULT_TRACE_ENTRIES_PER_ITERATION
}
// in ms
fn default_quiescence_timeout_ms() -> u64 {
    DEFAULT_QUIESCENCE_TIMEOUT_MS
}
fn default_cache_expressions() -> bool {
    true
}
