//! Runtime configuration for the reference repair services
//!
//! Built once at startup and handed to services at construction; nothing in
//! the crate reads process-wide state after that. Values can come from
//! defaults, a JSON file, and the `DEEPCOPY_DATABASE` environment variable.
use crate::services::DeepCopyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`DeepCopyConfig::database`]
pub const DATABASE_ENV_VAR: &str = "DEEPCOPY_DATABASE";

/// Configuration for copy processing and branch instantiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepCopyConfig {
    /// Store the branch handler reacts to; creation events from other stores
    /// are ignored
    pub database: String,

    /// Shared field holding the serialized presentation definition
    pub rendering_field: String,

    /// Field on a branch template that enables language version propagation
    /// when set to `"1"`
    pub propagate_versions_field: String,

    /// Pipeline started by the copy command
    pub pipeline_name: String,
}

impl Default for DeepCopyConfig {
    fn default() -> Self {
        Self {
            database: "master".to_string(),
            rendering_field: "__Renderings".to_string(),
            propagate_versions_field: "Create All Language Versions".to_string(),
            pipeline_name: "uiDeepCopyItems".to_string(),
        }
    }
}

impl DeepCopyConfig {
    /// Configuration bound to a specific store name
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeepCopyError> {
        let path = path.as_ref();
        let raw =
            std::fs::read_to_string(path).map_err(|e| DeepCopyError::config_io(path, e))?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate().map_err(DeepCopyError::invalid_config)?;
        Ok(config)
    }

    /// Apply `DEEPCOPY_DATABASE` when set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(database) = std::env::var(DATABASE_ENV_VAR) {
            if !database.trim().is_empty() {
                self.database = database;
            }
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database.trim().is_empty() {
            return Err("database cannot be empty".to_string());
        }

        if self.rendering_field.trim().is_empty() {
            return Err("rendering_field cannot be empty".to_string());
        }

        if self.propagate_versions_field.trim().is_empty() {
            return Err("propagate_versions_field cannot be empty".to_string());
        }

        if self.pipeline_name.trim().is_empty() {
            return Err("pipeline_name cannot be empty".to_string());
        }

        Ok(())
    }
}
