// -
// Digest limits

/// Iteration ceiling of a single digest before it is treated as divergent
pub(crate) const DEFAULT_MAX_DIGEST_ITERATIONS: u32 = 100;

/// Number of recent iterations kept in the divergence trace
pub(crate) const DEFAULT_TRACE_DEPTH: usize = 5;

/// Labels recorded per iteration in the divergence trace
pub(crate) const DEFAULT_TRACE_ENTRIES_PER_ITERATION: usize = 8;

/// Idle window (ms) after which chained deliveries stop counting toward the ceiling
pub(crate) const DEFAULT_QUIESCENCE_TIMEOUT_MS: u64 = 100;

// -
// Config sources

/// Environment variable prefix, e.g. `DWATCH__MAX_DIGEST_ITERATIONS`
pub(crate) const CONFIG_ENV_PREFIX: &str = "DWATCH";

/// Optional path to a TOML config file
pub(crate) const CONFIG_PATH_ENV: &str = "DWATCH_CONFIG_PATH";
