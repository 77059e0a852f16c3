use hive_fusion_config::log::LoggingConfig;
use tracing_subscriber::{EnvFilter, Layer};

use crate::logging::LoggingError;

/// Dependencies whose logs are noise unless asked for through an explicit filter.
static INTERNAL_CRATES: &[&str] = &["hyper", "hyper_util", "h2", "mio"];

pub fn filter_directives(config: &LoggingConfig) -> String {
    if let Some(filter) = &config.filter {
        return filter.clone();
    }

    let mut directives = vec![config.level.as_str().to_string()];
    directives.extend(
        INTERNAL_CRATES
            .iter()
            .map(|crate_name| format!("{}=off", crate_name)),
    );
    directives.join(",")
}

pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    let directives = filter_directives(config);
    EnvFilter::try_new(&directives)
        .map_err(|err| LoggingError::InvalidFilter(directives, err.to_string()))
}

pub type DynLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[cfg(test)]
mod tests {
    use hive_fusion_config::log::{LogLevel, LoggingConfig};
    use pretty_assertions::assert_eq;

    use super::{create_env_filter, filter_directives};

    #[test]
    fn level_silences_internal_crates() {
        let config = LoggingConfig {
            level: LogLevel::Warn,
            ..Default::default()
        };

        assert_eq!(
            filter_directives(&config),
            "warn,hyper=off,hyper_util=off,h2=off,mio=off"
        );
    }

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            level: LogLevel::Warn,
            filter: Some("hive_fusion_executor=trace".to_string()),
            ..Default::default()
        };

        assert_eq!(filter_directives(&config), "hive_fusion_executor=trace");
        assert!(create_env_filter(&config).is_ok());
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = LoggingConfig {
            filter: Some("hive_fusion=loud".to_string()),
            ..Default::default()
        };

        assert!(create_env_filter(&config).is_err());
    }
}
