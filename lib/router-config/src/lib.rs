//! Configuration of the `hive-fusion` binary: which source schemas to compose, where to
//! reach them and how to log.

mod env_overrides;
pub mod log;
pub mod primitives;
pub mod source_schemas;
pub mod traffic_shaping;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::env_overrides::EnvVarOverridesError;
use crate::{
    env_overrides::EnvVarOverrides,
    log::LoggingConfig,
    primitives::file_path::with_start_path,
    source_schemas::{SourceSchemaConfig, SourceSchemasConfig},
    traffic_shaping::TrafficShapingConfig,
};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FusionConfig {
    #[serde(skip)]
    root_directory: PathBuf,

    /// The logger configuration.
    #[serde(default)]
    pub log: LoggingConfig,

    /// The source schemas to compose, in composition order.
    #[serde(default)]
    pub source_schemas: SourceSchemasConfig,

    /// Controls how sub-queries are sent to source schemas.
    #[serde(default)]
    pub traffic_shaping: TrafficShapingConfig,
}

impl FusionConfig {
    /// The directory relative paths of the configuration are resolved against.
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    pub fn source_schema(&self, name: &str) -> Option<&SourceSchemaConfig> {
        self.source_schemas.get(name)
    }

    /// The timeout of a sub-dispatch to `name`.
    pub fn timeout_for(&self, name: &str) -> Duration {
        self.source_schema(name)
            .and_then(|source| source.timeout)
            .unwrap_or(self.traffic_shaping.timeout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to get the current directory: {0}")]
    CurrentDirError(std::io::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "fusion.config.yaml",
    "fusion.config.yml",
    "fusion.config.json",
];

fn get_current_dir() -> Result<PathBuf, RouterConfigError> {
    std::env::current_dir().map_err(RouterConfigError::CurrentDirError)
}

/// Loads the configuration from `override_config_path`, `FUSION_CONFIG_FILE_PATH` or one of
/// the default file names in the working directory, then applies environment overrides.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<FusionConfig, RouterConfigError> {
    let mut env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();
    let mut config_root_path = get_current_dir()?;

    let config_path = override_config_path.or_else(|| env_overrides.config_file_path.take());
    if let Some(path_str) = config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(RouterConfigError::ConfigPathParseError)?;
        let parent_dir = path_buf.parent().map(Path::to_path_buf).unwrap_or_default();
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
        config_root_path = config_root_path.join(parent_dir);
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    let mut base_cfg = with_start_path(&config_root_path, || {
        config.build()?.try_deserialize::<FusionConfig>()
    })?;

    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}

/// Parses a YAML configuration; relative paths resolve against the working directory.
pub fn parse_yaml_config(config_raw: String) -> Result<FusionConfig, RouterConfigError> {
    let config_root_path = get_current_dir()?;
    let config = Config::builder();

    let mut base_cfg = with_start_path(&config_root_path, || {
        config
            .add_source(File::from_str(&config_raw, FileFormat::Yaml))
            .build()?
            .try_deserialize::<FusionConfig>()
    })
    .map_err(RouterConfigError::ConfigLoadError)?;

    base_cfg.root_directory = config_root_path;

    Ok(base_cfg)
}
