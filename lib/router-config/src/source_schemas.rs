use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::primitives::file_path::FilePath;

/// Source schemas by name. The order of the map is the composition order.
pub type SourceSchemasConfig = IndexMap<String, SourceSchemaConfig>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSchemaConfig {
    /// The SDL file of the source schema, relative to the configuration file.
    pub schema_path: FilePath,

    /// The GraphQL endpoint sub-queries are posted to. A source schema without an endpoint
    /// takes part in composition only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Overrides `traffic_shaping.timeout` for this source schema.
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}
