use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::log::{LogFormat, LogLevel};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    // Traffic shaping overrides
    #[envconfig(from = "FUSION_DEFAULT_TIMEOUT")]
    pub default_timeout: Option<String>,

    #[envconfig(from = "FUSION_CONFIG_FILE_PATH")]
    pub config_file_path: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }
        if let Some(default_timeout) = self.default_timeout.take() {
            debug!("[config-override] 'traffic_shaping.timeout' = {}", default_timeout);
            config = config.set_override("traffic_shaping.timeout", default_timeout)?;
        }

        Ok(config)
    }
}
