//! Optional per-run configuration: the type-name namespace and per-resource
//! metadata that the schema itself does not carry.
//!
//! ```json
//! {
//!   "namespace": "NewRelic::Observability",
//!   "resources": {
//!     "dashboard": {
//!       "description": "A New Relic dashboard",
//!       "primaryIdentifier": ["/properties/Guid"],
//!       "readOnlyProperties": ["/properties/Guid"],
//!       "handlers": { "create": ["newrelic:dashboards"] }
//!     }
//!   }
//! }
//! ```
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::ir::property_key;
use crate::path_de::{from_str_with_path, PathError};

pub const DEFAULT_NAMESPACE: &str = "NewRelic::Observability";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TranslateConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceConfig {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub primary_identifier: Vec<String>,
    #[serde(default)]
    pub read_only_properties: Vec<String>,
    /// Lifecycle name → permissions.
    #[serde(default)]
    pub handlers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid config {}: {source}", .path.display())]
    Parse { path: PathBuf, source: PathError },
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self { namespace: default_namespace(), resources: BTreeMap::new() }
    }
}

impl TranslateConfig {
    pub fn parse(src: &str) -> Result<Self, PathError> {
        from_str_with_path(src)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&src).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceConfig> {
        self.resources.get(name)
    }

    /// `<namespace>::<Resource>`, with the resource name capitalized.
    pub fn type_name(&self, resource: &str) -> String {
        format!("{}::{}", self.namespace, property_key(resource))
    }
}

fn default_namespace() -> String { DEFAULT_NAMESPACE.to_string() }

// ------------------------------- Tests ------------------------------------ //
