//! Loading API descriptions from JSON or YAML documents.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::resource::ApiDescription;

/// Failure to turn a document into an [`ApiDescription`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read API description {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse API description as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse API description as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ApiDescription {
    /// Parse an API description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an API description from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a description from disk, choosing the format by extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML (which also
    /// accepts JSON input).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(
            path = %path.display(),
            bytes = contents.len(),
            format = if is_json { "json" } else { "yaml" },
            "Loading API description."
        );

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }
}
