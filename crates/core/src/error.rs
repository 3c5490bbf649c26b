//! Errors raised while generating interfaces.
//!
//! Every error carries an [`Origin`] pointing back at the input element that
//! caused it. None of them is recoverable inside a run: the caller gets the
//! error and no output.

use std::fmt;

use resgen_model::{HttpVerb, MediaType};
use thiserror::Error;

/// Failure raised by an extension hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where in the input an error was detected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    /// Full resource path (e.g. "/users/{id}").
    pub resource: String,
    pub verb: Option<HttpVerb>,
    pub media_type: Option<MediaType>,
}

impl Origin {
    pub fn resource(path: impl Into<String>) -> Self {
        Self {
            resource: path.into(),
            verb: None,
            media_type: None,
        }
    }

    pub fn with_verb(mut self, verb: HttpVerb) -> Self {
        self.verb = Some(verb);
        self
    }

    pub fn with_media_type(mut self, media_type: Option<&MediaType>) -> Self {
        self.media_type = media_type.cloned();
        self
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(verb) = self.verb {
            write!(f, "{verb} ")?;
        }
        f.write_str(if self.resource.is_empty() {
            "/"
        } else {
            &self.resource
        })?;
        if let Some(media_type) = &self.media_type {
            write!(f, " ({media_type})")?;
        }
        Ok(())
    }
}

/// What kind of generated name collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Interface,
    Method,
    ResponseFactory,
    /// A Java type name within one source file.
    Type,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameKind::Interface => "interface",
            NameKind::Method => "method",
            NameKind::ResponseFactory => "response factory",
            NameKind::Type => "type",
        })
    }
}

/// Error returned by a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Malformed or unbindable input, detected before synthesis.
    #[error("invalid API description at {origin}: {message}")]
    Validation { origin: Origin, message: String },

    /// Two generated elements in the same scope resolved to one name.
    #[error("{kind} name '{name}' at {origin} collides with an existing {kind} in {scope}")]
    NamingCollision {
        origin: Origin,
        kind: NameKind,
        name: String,
        scope: String,
    },

    /// Metadata that traversal order guarantees was missing. Engine defect.
    #[error("internal contract violated at {origin}: {message}")]
    ContractViolation { origin: Origin, message: String },

    /// An observer failed or removed metadata the engine still needs.
    #[error("extension hook '{hook}' failed on {element} at {origin}: {source}")]
    ExtensionHook {
        hook: String,
        element: String,
        origin: Origin,
        #[source]
        source: HookError,
    },
}

impl GenerateError {
    pub fn validation(origin: Origin, message: impl Into<String>) -> Self {
        GenerateError::Validation {
            origin,
            message: message.into(),
        }
    }

    /// The input location the error points at.
    pub fn origin(&self) -> &Origin {
        match self {
            GenerateError::Validation { origin, .. }
            | GenerateError::NamingCollision { origin, .. }
            | GenerateError::ContractViolation { origin, .. }
            | GenerateError::ExtensionHook { origin, .. } => origin,
        }
    }
}

/// Failure of a single routing-profile binding call.
///
/// Profiles do not know where in the tree they are; traversal attaches the
/// origin with [`BindError::at`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The profile has no way to express this input.
    #[error("{0}")]
    Unsupported(String),
    /// Enrichment found no metadata to enrich.
    #[error("expected {kind} metadata on {element}, found none")]
    MissingMetadata { kind: String, element: String },
}

impl BindError {
    pub fn at(self, origin: Origin) -> GenerateError {
        match self {
            BindError::Unsupported(message) => GenerateError::Validation { origin, message },
            missing @ BindError::MissingMetadata { .. } => GenerateError::ContractViolation {
                origin,
                message: missing.to_string(),
            },
        }
    }
}
