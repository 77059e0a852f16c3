use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrafficShapingConfig {
    /// Limits the concurrent amount of requests/connections per source schema endpoint.
    #[serde(default = "default_max_connections_per_host")]
    pub max_connections_per_host: usize,

    /// Timeout for idle sockets being kept-alive.
    #[serde(
        default = "default_pool_idle_timeout",
        with = "humantime_serde"
    )]
    pub pool_idle_timeout: Duration,

    /// Default timeout of a single sub-dispatch. A source schema may set its own.
    ///
    /// Can also be set via the `FUSION_DEFAULT_TIMEOUT` environment variable.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for TrafficShapingConfig {
    fn default() -> Self {
        Self {
            max_connections_per_host: default_max_connections_per_host(),
            pool_idle_timeout: default_pool_idle_timeout(),
            timeout: default_timeout(),
        }
    }
}

fn default_max_connections_per_host() -> usize {
    100
}

fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(50)
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
