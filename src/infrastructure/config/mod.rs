use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::warn;
use validator::Validate;

use crate::domain::diagnostic_config::DiagnosticConfig;
use crate::domain::error::{AppError, Result};

/// Optional settings file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "dataset-probe.toml";

/// Prefix of environment overrides, e.g. `DATASET_PROBE_ARCHIVE_PATH`
pub const ENV_PREFIX: &str = "DATASET_PROBE_";

pub struct ConfigService {
    config_file: PathBuf,
    env_prefix: String,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            config_file: PathBuf::from(CONFIG_FILE_NAME),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = path.as_ref().to_path_buf();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Defaults, then the TOML file, then the environment
    pub fn load(&self) -> Result<DiagnosticConfig> {
        let config: DiagnosticConfig = Figment::from(Serialized::defaults(DiagnosticConfig::default()))
            .merge(Toml::file(&self.config_file))
            .merge(Env::prefixed(&self.env_prefix))
            .extract()?;

        config
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        Ok(config)
    }

    /// Like `load`, but a broken configuration falls back to the defaults
    /// so the diagnostic still runs.
    pub fn load_or_default(&self) -> DiagnosticConfig {
        match self.load() {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Invalid configuration, using defaults");
                DiagnosticConfig::default()
            }
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
