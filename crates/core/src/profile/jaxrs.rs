//! Variant B: JAX-RS.

use resgen_model::{HttpVerb, MediaType, ParamLocation};
use tracing::debug;

use super::{ProfileKind, RoutingProfile, RoutingTarget, media_type_values, missing};
use crate::error::BindError;
use crate::ir::{
    AnnotationKind, AttrValue, Envelope, EnvelopeFlavor, JavaType, ParameterBinding,
    ResourceMethod,
};
use crate::naming::variable_name;

const ASYNC_RESPONSE: &str = "javax.ws.rs.container.AsyncResponse";

/// Name of the support class every JAX-RS wrapper type extends.
pub const RESPONSE_WRAPPER_CLASS: &str = "ResponseWrapper";

/// `@Path` interfaces, verb-annotated methods, `ResponseWrapper` wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaxRsProfile;

impl JaxRsProfile {
    /// Annotation for a location; `None` for the unannotated entity.
    fn location_kind(location: ParamLocation) -> Option<AnnotationKind> {
        match location {
            ParamLocation::Path => Some(AnnotationKind::PathParam),
            ParamLocation::Query => Some(AnnotationKind::QueryParam),
            ParamLocation::Header => Some(AnnotationKind::HeaderParam),
            ParamLocation::Form => Some(AnnotationKind::FormParam),
            ParamLocation::Cookie => Some(AnnotationKind::CookieParam),
            ParamLocation::Body => None,
        }
    }

    fn require_verb(method: &ResourceMethod) -> Result<(), BindError> {
        let kind = AnnotationKind::Verb(method.verb);
        if method.metadata.contains(&kind) {
            Ok(())
        } else {
            Err(missing(&kind, method))
        }
    }
}

impl RoutingProfile for JaxRsProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::JaxRs
    }

    fn supports_verb(&self, verb: HttpVerb) -> bool {
        verb != HttpVerb::Trace
    }

    fn supports_location(&self, _location: ParamLocation) -> bool {
        true
    }

    fn bind_routing(
        &self,
        target: RoutingTarget<'_>,
        verb: Option<HttpVerb>,
        path: Option<&str>,
    ) -> Result<(), BindError> {
        match target {
            RoutingTarget::Interface(interface) => {
                let base = path.filter(|p| !p.is_empty()).unwrap_or("/");
                interface
                    .metadata
                    .entry(AnnotationKind::Path)
                    .set("value", AttrValue::Str(base.to_string()));
            }
            RoutingTarget::Method(method) => {
                let verb = verb.ok_or_else(|| {
                    BindError::Unsupported(format!("{} has no HTTP verb", method.name))
                })?;
                if !self.supports_verb(verb) {
                    return Err(BindError::Unsupported(format!(
                        "the jax-rs profile has no annotation for {verb}"
                    )));
                }
                method.metadata.entry(AnnotationKind::Verb(verb));
                if let Some(sub_path) = path.filter(|p| !p.is_empty()) {
                    method
                        .metadata
                        .entry(AnnotationKind::Path)
                        .set("value", AttrValue::Str(sub_path.to_string()));
                }
            }
        }
        Ok(())
    }

    fn bind_consumes(
        &self,
        method: &mut ResourceMethod,
        media_type: Option<&MediaType>,
    ) -> Result<(), BindError> {
        let Some(media_type) = media_type else {
            return Ok(());
        };
        Self::require_verb(method)?;
        if method.consumes.contains(media_type) {
            return Ok(());
        }
        method.consumes.push(media_type.clone());
        method
            .metadata
            .entry(AnnotationKind::Consumes)
            .push("value", AttrValue::Str(media_type.as_str().to_string()));
        Ok(())
    }

    fn bind_produces(
        &self,
        method: &mut ResourceMethod,
        media_types: &[MediaType],
    ) -> Result<(), BindError> {
        if media_types.is_empty() {
            return Ok(());
        }
        Self::require_verb(method)?;
        method
            .metadata
            .entry(AnnotationKind::Produces)
            .set("value", media_type_values(media_types));
        method.produces = media_types.to_vec();
        Ok(())
    }

    fn bind_parameter(
        &self,
        binding: &mut ParameterBinding,
        location: ParamLocation,
    ) -> Result<(), BindError> {
        if let Some(kind) = Self::location_kind(location) {
            let wire_name = binding.wire_name.clone();
            binding
                .metadata
                .entry(kind)
                .set("value", AttrValue::Str(wire_name));
        }
        binding.location = Some(location);
        Ok(())
    }

    fn bind_default(
        &self,
        binding: &mut ParameterBinding,
        default_value: Option<&str>,
    ) -> Result<(), BindError> {
        let Some(location) = binding.location else {
            return Err(BindError::MissingMetadata {
                kind: "parameter location".to_string(),
                element: format!("parameter '{}'", binding.wire_name),
            });
        };
        let Some(kind) = Self::location_kind(location) else {
            if default_value.is_some() {
                debug!(parameter = %binding.wire_name, "Ignoring default value on request entity.");
            }
            return Ok(());
        };
        if !binding.metadata.contains(&kind) {
            return Err(missing(&kind, binding));
        }
        if let Some(value) = default_value {
            binding
                .metadata
                .entry(AnnotationKind::DefaultValue)
                .set("value", AttrValue::Str(value.to_string()));
            binding.default_value = Some(value.to_string());
        }
        Ok(())
    }

    fn bind_deferred_response(
        &self,
        method: &mut ResourceMethod,
        trait_name: &str,
    ) -> Result<String, BindError> {
        let name = variable_name(trait_name);
        let mut holder = ParameterBinding::injected(
            name.clone(),
            JavaType::qualified(ASYNC_RESPONSE),
            Some(format!("Resumed asynchronously ({trait_name}).")),
        );
        holder.metadata.entry(AnnotationKind::Suspended);
        method.parameters.push(holder);
        Ok(name)
    }

    fn envelope(&self) -> Envelope {
        Envelope {
            flavor: EnvelopeFlavor::ResponseWrapper,
            superclass: JavaType::local(RESPONSE_WRAPPER_CLASS),
            status_type: JavaType::local("int"),
            headers_type: JavaType::qualified("javax.ws.rs.core.MultivaluedMap")
                .with_args(vec![JavaType::string(), JavaType::object()]),
        }
    }

    fn required_interface_metadata(&self) -> Vec<AnnotationKind> {
        vec![AnnotationKind::Path]
    }

    fn required_method_metadata(&self, method: &ResourceMethod) -> Vec<AnnotationKind> {
        vec![AnnotationKind::Verb(method.verb)]
    }

    fn support_types(&self) -> &'static [&'static str] {
        &[RESPONSE_WRAPPER_CLASS]
    }
}
