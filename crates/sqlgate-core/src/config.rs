//! Gateway configuration.
//!
//! Values only; how the file is located and when the schema gets refreshed is
//! the embedding service's business.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the file failed.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML did not parse.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Tunables for the SQL safety pipeline and its executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Per-statement timeout applied inside the read-only transaction.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,

    /// Hard row cap. No query fetches more than `max_rows + 1` rows.
    #[serde(default = "default_max_rows")]
    pub max_rows: u32,

    /// How often the external introspector rebuilds the schema snapshot.
    /// The pipeline itself never reads this.
    #[serde(default = "default_schema_refresh_secs")]
    pub schema_refresh_secs: u64,

    /// Column whose presence marks a table as tenant-scoped.
    #[serde(default = "default_tenant_column")]
    pub tenant_column: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            statement_timeout_ms: default_statement_timeout_ms(),
            max_rows: default_max_rows(),
            schema_refresh_secs: default_schema_refresh_secs(),
            tenant_column: default_tenant_column(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }
}

fn default_statement_timeout_ms() -> u64 {
    5_000
}

fn default_max_rows() -> u32 {
    100
}

fn default_schema_refresh_secs() -> u64 {
    300
}

fn default_tenant_column() -> String {
    "organizationId".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.statement_timeout_ms, 5_000);
        assert_eq!(config.max_rows, 100);
        assert_eq!(config.tenant_column, "organizationId");
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = r#"
max_rows: 50
tenant_column: org_id
"#;
        let config = GatewayConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.max_rows, 50);
        assert_eq!(config.tenant_column, "org_id");
        // untouched fields fall back to defaults
        assert_eq!(config.statement_timeout_ms, 5_000);
        assert_eq!(config.schema_refresh_secs, 300);
    }
}
