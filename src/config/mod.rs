//! Configuration management for the watch engine.
//!
//! Sources are merged with increasing priority:
//! 1. Default values (hardcoded)
//! 2. Config file passed to [`WatchConfig::load`], or named by `DWATCH_CONFIG_PATH`
//! 3. Environment variables (`DWATCH__<FIELD>`, highest priority)
//!

mod watch;
pub use watch::*;


//---
use std::env;

use config::Config;
use config::Environment;
use config::File;

use crate::constants::CONFIG_ENV_PREFIX;
use crate::constants::CONFIG_PATH_ENV;
use crate::Result;

impl WatchConfig {
    /// Load configuration from layered sources and validate it
    ///
    /// # Arguments
    /// * `override_path` - Optional TOML file applied on top of the defaults
    pub fn load(override_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        // 1. Explicit config file
        if let Some(path) = override_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 2. File named by the environment
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        // 3. Environment variables (highest priority)
        builder = builder.add_source(
            Environment::with_prefix(CONFIG_ENV_PREFIX)
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let config: WatchConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
