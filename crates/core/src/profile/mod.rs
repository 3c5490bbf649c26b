//! Routing profiles: how verbs, paths, media types, and parameters become
//! target-framework metadata.
//!
//! One traversal drives every profile through [`RoutingProfile`]. Each
//! binding call looks up the element's metadata by kind, creates it when
//! absent, and amends it otherwise. Calls that enrich metadata an earlier
//! call must have created report [`BindError::MissingMetadata`].

use std::fmt;
use std::str::FromStr;

use resgen_model::{HttpVerb, MediaType, ParamLocation};
use serde::Deserialize;

use crate::error::BindError;
use crate::ir::{
    Annotated, AnnotationKind, AttrValue, Envelope, ParameterBinding, ResourceInterface,
    ResourceMethod,
};

mod jaxrs;
mod spring;

pub use jaxrs::{JaxRsProfile, RESPONSE_WRAPPER_CLASS};
pub use spring::SpringMvcProfile;

/// Selector for the target framework.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// Variant A: Spring MVC annotations, `ResponseEntity` envelope.
    #[default]
    SpringMvc,
    /// Variant B: JAX-RS annotations, `ResponseWrapper` envelope.
    JaxRs,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 2] = [ProfileKind::SpringMvc, ProfileKind::JaxRs];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::SpringMvc => "spring-mvc",
            ProfileKind::JaxRs => "jax-rs",
        }
    }

    /// The stateless profile implementation for this kind.
    pub fn profile(self) -> &'static dyn RoutingProfile {
        static SPRING: SpringMvcProfile = SpringMvcProfile;
        static JAXRS: JaxRsProfile = JaxRsProfile;
        match self {
            ProfileKind::SpringMvc => &SPRING,
            ProfileKind::JaxRs => &JAXRS,
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring-mvc" | "spring" => Ok(ProfileKind::SpringMvc),
            "jax-rs" | "jaxrs" => Ok(ProfileKind::JaxRs),
            other => Err(format!(
                "unknown profile '{other}' (expected 'spring-mvc' or 'jax-rs')"
            )),
        }
    }
}

/// Element that routing metadata is attached to.
#[derive(Debug)]
pub enum RoutingTarget<'a> {
    Interface(&'a mut ResourceInterface),
    Method(&'a mut ResourceMethod),
}

/// Contract every target framework implements.
pub trait RoutingProfile: Send + Sync + fmt::Debug {
    fn kind(&self) -> ProfileKind;

    /// Whether actions with this verb can be routed at all.
    fn supports_verb(&self, verb: HttpVerb) -> bool;

    /// Whether parameters at this location can be bound.
    fn supports_location(&self, location: ParamLocation) -> bool;

    /// Attach base path (interfaces) or verb and optional sub-path (methods).
    fn bind_routing(
        &self,
        target: RoutingTarget<'_>,
        verb: Option<HttpVerb>,
        path: Option<&str>,
    ) -> Result<(), BindError>;

    /// Record the request media type of a method pass. `None` binds nothing.
    fn bind_consumes(
        &self,
        method: &mut ResourceMethod,
        media_type: Option<&MediaType>,
    ) -> Result<(), BindError>;

    /// Record the response media types of a method. Empty binds nothing.
    fn bind_produces(
        &self,
        method: &mut ResourceMethod,
        media_types: &[MediaType],
    ) -> Result<(), BindError>;

    /// Attach location metadata to a parameter binding.
    fn bind_parameter(
        &self,
        binding: &mut ParameterBinding,
        location: ParamLocation,
    ) -> Result<(), BindError>;

    /// Enrich an already-bound parameter with its default value.
    fn bind_default(
        &self,
        binding: &mut ParameterBinding,
        default_value: Option<&str>,
    ) -> Result<(), BindError>;

    /// Append the out-of-band response holder parameter; returns its name.
    fn bind_deferred_response(
        &self,
        method: &mut ResourceMethod,
        trait_name: &str,
    ) -> Result<String, BindError>;

    /// Envelope the synthesized wrapper types extend.
    fn envelope(&self) -> Envelope;

    /// Kinds that must survive on every interface once routing is bound.
    fn required_interface_metadata(&self) -> Vec<AnnotationKind>;

    /// Kinds that must survive on this method once routing is bound.
    fn required_method_metadata(&self, method: &ResourceMethod) -> Vec<AnnotationKind>;

    /// Top-level classes emitted next to the interfaces, in the same package.
    fn support_types(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Writes a media type list as an annotation array value.
pub(crate) fn media_type_values(media_types: &[MediaType]) -> AttrValue {
    AttrValue::Array(
        media_types
            .iter()
            .map(|m| AttrValue::Str(m.as_str().to_string()))
            .collect(),
    )
}

/// Shared check for enrichment calls.
pub(crate) fn missing(kind: &AnnotationKind, element: &impl Annotated) -> BindError {
    BindError::MissingMetadata {
        kind: kind.qualified_name(),
        element: element.describe(),
    }
}
