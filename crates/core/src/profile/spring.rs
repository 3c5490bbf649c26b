//! Variant A: Spring MVC.

use resgen_model::{HttpVerb, MediaType, ParamLocation};
use tracing::debug;

use super::{ProfileKind, RoutingProfile, RoutingTarget, media_type_values, missing};
use crate::error::BindError;
use crate::ir::{
    Annotation, AnnotationKind, AttrValue, Envelope, EnvelopeFlavor, JavaType, ParameterBinding,
    ResourceMethod,
};
use crate::naming::variable_name;

const REQUEST_METHOD: &str = "org.springframework.web.bind.annotation.RequestMethod";
const DEFERRED_RESULT: &str = "org.springframework.web.context.request.async.DeferredResult";

/// `@RestController` interfaces, `@RequestMapping` methods, `ResponseEntity` wrappers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpringMvcProfile;

impl SpringMvcProfile {
    fn location_kind(location: ParamLocation) -> Result<AnnotationKind, BindError> {
        match location {
            ParamLocation::Path => Ok(AnnotationKind::PathVariable),
            ParamLocation::Query | ParamLocation::Form => Ok(AnnotationKind::RequestParam),
            ParamLocation::Header => Ok(AnnotationKind::RequestHeader),
            ParamLocation::Body => Ok(AnnotationKind::RequestBody),
            ParamLocation::Cookie => Err(BindError::Unsupported(
                "the spring-mvc profile cannot bind cookie parameters".to_string(),
            )),
        }
    }

    fn mapping(method: &mut ResourceMethod) -> Result<&mut Annotation, BindError> {
        if !method.metadata.contains(&AnnotationKind::RequestMapping) {
            return Err(missing(&AnnotationKind::RequestMapping, method));
        }
        Ok(method.metadata.entry(AnnotationKind::RequestMapping))
    }
}

impl RoutingProfile for SpringMvcProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::SpringMvc
    }

    fn supports_verb(&self, _verb: HttpVerb) -> bool {
        true
    }

    fn supports_location(&self, location: ParamLocation) -> bool {
        location != ParamLocation::Cookie
    }

    fn bind_routing(
        &self,
        target: RoutingTarget<'_>,
        verb: Option<HttpVerb>,
        path: Option<&str>,
    ) -> Result<(), BindError> {
        match target {
            RoutingTarget::Interface(interface) => {
                interface.metadata.entry(AnnotationKind::RestController);
                let base = path.filter(|p| !p.is_empty()).unwrap_or("/");
                interface
                    .metadata
                    .entry(AnnotationKind::RequestMapping)
                    .set("value", AttrValue::Str(base.to_string()));
            }
            RoutingTarget::Method(method) => {
                let verb = verb.ok_or_else(|| {
                    BindError::Unsupported(format!("{} has no HTTP verb", method.name))
                })?;
                let mapping = method.metadata.entry(AnnotationKind::RequestMapping);
                if let Some(sub_path) = path.filter(|p| !p.is_empty()) {
                    mapping.set("value", AttrValue::Str(sub_path.to_string()));
                }
                mapping.set(
                    "method",
                    AttrValue::Constant {
                        owner: JavaType::qualified(REQUEST_METHOD),
                        name: verb.as_str().to_string(),
                    },
                );
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
        Self::mapping(method)?.set(
            "consumes",
            AttrValue::Str(media_type.as_str().to_string()),
        );
        if !method.consumes.contains(media_type) {
            method.consumes.push(media_type.clone());
        }
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
        Self::mapping(method)?.set("produces", media_type_values(media_types));
        method.produces = media_types.to_vec();
        Ok(())
    }

    fn bind_parameter(
        &self,
        binding: &mut ParameterBinding,
        location: ParamLocation,
    ) -> Result<(), BindError> {
        let kind = Self::location_kind(location)?;
        let wire_name = binding.wire_name.clone();
        let required = binding.required;
        let annotation = binding.metadata.entry(kind);
        if location != ParamLocation::Body {
            annotation.set("value", AttrValue::Str(wire_name));
        }
        if !required && location != ParamLocation::Body {
            annotation.set("required", AttrValue::Bool(false));
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
        let kind = Self::location_kind(location)?;
        if !binding.metadata.contains(&kind) {
            return Err(missing(&kind, binding));
        }
        let Some(value) = default_value else {
            return Ok(());
        };

        match location {
            ParamLocation::Query | ParamLocation::Form | ParamLocation::Header => {
                binding
                    .metadata
                    .entry(kind)
                    .set("defaultValue", AttrValue::Str(value.to_string()));
                binding.default_value = Some(value.to_string());
            }
            ParamLocation::Path | ParamLocation::Body | ParamLocation::Cookie => {
                debug!(
                    parameter = %binding.wire_name,
                    location = %location,
                    "Ignoring default value the location cannot carry."
                );
            }
        }
        Ok(())
    }

    fn bind_deferred_response(
        &self,
        method: &mut ResourceMethod,
        trait_name: &str,
    ) -> Result<String, BindError> {
        let name = variable_name(trait_name);
        let holder = ParameterBinding::injected(
            name.clone(),
            JavaType::qualified(DEFERRED_RESULT).with_args(vec![JavaType::object()]),
            Some(format!("Completed asynchronously ({trait_name}).")),
        );
        method.parameters.push(holder);
        Ok(name)
    }

    fn envelope(&self) -> Envelope {
        Envelope {
            flavor: EnvelopeFlavor::ResponseEntity,
            superclass: JavaType::qualified("org.springframework.http.ResponseEntity")
                .with_args(vec![JavaType::object()]),
            status_type: JavaType::qualified("org.springframework.http.HttpStatus"),
            headers_type: JavaType::qualified("org.springframework.util.MultiValueMap")
                .with_args(vec![JavaType::string(), JavaType::string()]),
        }
    }

    fn required_interface_metadata(&self) -> Vec<AnnotationKind> {
        vec![AnnotationKind::RestController, AnnotationKind::RequestMapping]
    }

    fn required_method_metadata(&self, _method: &ResourceMethod) -> Vec<AnnotationKind> {
        vec![AnnotationKind::RequestMapping]
    }
}
