//! Configuration model for a translation run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RadifyError, Result};
use crate::types::ResourceKind;

/// User-supplied settings controlling a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateConfig {
    /// Radius application name.
    pub app_name: String,
    /// Radius environment name or ID, used as the environment parameter default.
    pub environment_name: String,
    /// Container images for project resources, keyed by resource name.
    pub image_mappings: BTreeMap<String, String>,
    /// Explicit kinds that bypass automatic classification, keyed by resource name.
    pub resource_overrides: BTreeMap<String, ResourceKind>,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            app_name: crate::constants::DEFAULT_APP_NAME.into(),
            environment_name: crate::constants::DEFAULT_ENVIRONMENT.into(),
            image_mappings: BTreeMap::new(),
            resource_overrides: BTreeMap::new(),
        }
    }
}

impl TranslateConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RadifyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| RadifyError::Config {
            message: format!("{}: {e}", path.display()),
        })
    }

    /// Replaces empty names with the defaults.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.app_name.trim().is_empty() {
            self.app_name = crate::constants::DEFAULT_APP_NAME.into();
        }
        if self.environment_name.trim().is_empty() {
            self.environment_name = crate::constants::DEFAULT_ENVIRONMENT.into();
        }
        self
    }
}
