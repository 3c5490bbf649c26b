//! Generator configuration, loadable from TOML.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::hooks::HookFailurePolicy;
use crate::profile::ProfileKind;

/// Default target package for emitted sources.
pub const DEFAULT_PACKAGE: &str = "com.example.api";

/// Settings consumed by one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Java package of the emitted sources.
    pub package: String,
    /// Actions without any response body return `void` instead of a wrapper.
    pub empty_response_return_void: bool,
    /// Trait name that marks actions answered out of band.
    pub deferred_response_trait: Option<String>,
    /// Target routing framework.
    pub profile: ProfileKind,
    /// Exception type every generated method declares in `throws`.
    pub method_throws: Option<String>,
    /// What to do when an extension hook fails.
    pub hook_failure_policy: HookFailurePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            empty_response_return_void: true,
            deferred_response_trait: None,
            profile: ProfileKind::default(),
            method_throws: None,
            hook_failure_policy: HookFailurePolicy::default(),
        }
    }
}

/// Failure to read or parse a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GeneratorConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// The deferred trait name, ignoring blank values.
    pub fn deferred_trait(&self) -> Option<&str> {
        self.deferred_response_trait
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Same settings, different profile. Used for multi-profile runs.
    pub fn for_profile(&self, profile: ProfileKind) -> Self {
        Self {
            profile,
            ..self.clone()
        }
    }
}
