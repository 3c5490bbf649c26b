//! Depth-first walk over the resource tree.
//!
//! Each resource becomes one interface; each (action, request body) pass
//! becomes one method. Naming, profile binding, and response synthesis are
//! driven from here, and hooks are notified once an element is finished.

use std::collections::{HashMap, HashSet};

use resgen_model::{
    Action, ApiDescription, ApiResource, BodyVariant, MediaType, ParamLocation, Parameter,
};
use tracing::{debug, trace};

use crate::config::GeneratorConfig;
use crate::emit::interface_imports;
use crate::error::{BindError, GenerateError, NameKind, Origin};
use crate::hooks::{ExtensionHookRegistry, InterfaceContext, MethodContext};
use crate::ir::{
    GeneratedApi, JavaType, ParameterBinding, ResourceInterface, ResourceMethod, ReturnShape,
};
use crate::naming;
use crate::profile::{RoutingProfile, RoutingTarget};
use crate::synth;

/// Join a parent path and a relative segment with exactly one `/` between them.
pub fn join_path(parent: &str, relative: &str) -> String {
    let relative = relative.trim();
    if relative.is_empty() {
        return parent.to_string();
    }
    format!(
        "{}/{}",
        parent.trim_end_matches('/'),
        relative.trim_start_matches('/')
    )
}

/// Template variables of a path in order of appearance (`/a/{x}/{y}` → `["x", "y"]`).
pub fn template_variables(path: &str) -> Vec<&str> {
    let mut vars = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = after[..end].trim();
        if !name.is_empty() && !vars.contains(&name) {
            vars.push(name);
        }
        rest = &after[end + 1..];
    }
    vars
}

/// State of one generation run. Not shared between runs.
#[derive(Debug)]
pub struct ResourceTraversal<'a> {
    config: &'a GeneratorConfig,
    profile: &'a dyn RoutingProfile,
    hooks: &'a ExtensionHookRegistry,
    interface_names: HashSet<String>,
    interfaces: Vec<ResourceInterface>,
}

impl<'a> ResourceTraversal<'a> {
    pub fn new(
        config: &'a GeneratorConfig,
        profile: &'a dyn RoutingProfile,
        hooks: &'a ExtensionHookRegistry,
    ) -> Self {
        Self {
            config,
            profile,
            hooks,
            interface_names: profile
                .support_types()
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            interfaces: Vec::new(),
        }
    }

    /// Visit every resource once, in input order, parents before children.
    pub fn run(mut self, api: &ApiDescription) -> Result<GeneratedApi, GenerateError> {
        for resource in &api.resources {
            self.visit(resource, "", &[])?;
        }
        Ok(GeneratedApi {
            profile: self.profile.kind(),
            interfaces: self.interfaces,
        })
    }

    fn visit(
        &mut self,
        resource: &ApiResource,
        parent_path: &str,
        inherited: &[&Parameter],
    ) -> Result<(), GenerateError> {
        let path = join_path(parent_path, &resource.relative_uri);
        let origin = Origin::resource(&path);

        // Nearest declaration wins.
        let mut uri_parameters: Vec<&Parameter> = inherited
            .iter()
            .copied()
            .filter(|p| !resource.uri_parameters.iter().any(|own| own.name == p.name))
            .collect();
        uri_parameters.extend(resource.uri_parameters.iter());

        let name = naming::interface_name(&path);
        if !self.interface_names.insert(name.clone()) {
            return Err(GenerateError::NamingCollision {
                origin,
                kind: NameKind::Interface,
                name,
                scope: "the generated API".to_string(),
            });
        }

        let mut interface = ResourceInterface::new(name, path.clone());
        interface.description = resource
            .description
            .clone()
            .or_else(|| resource.display_name.clone());
        self.profile
            .bind_routing(RoutingTarget::Interface(&mut interface), None, Some(&path))
            .map_err(|e| e.at(origin.clone()))?;
        debug!(resource = %path, interface = %interface.name, "Building interface.");

        for action in &resource.actions {
            self.build_action(&mut interface, resource, action, &path, &uri_parameters)?;
        }

        let ctx = InterfaceContext {
            resource,
            path: &path,
        };
        self.hooks.notify_interface(
            &mut interface,
            &ctx,
            &self.profile.required_interface_metadata(),
            &origin,
        )?;
        check_type_names(&interface, &origin)?;
        self.interfaces.push(interface);

        for child in &resource.resources {
            self.visit(child, &path, &uri_parameters)?;
        }
        Ok(())
    }

    fn build_action(
        &self,
        interface: &mut ResourceInterface,
        resource: &ApiResource,
        action: &Action,
        path: &str,
        uri_parameters: &[&Parameter],
    ) -> Result<(), GenerateError> {
        let passes: Vec<Option<&BodyVariant>> = if action.body.is_empty() {
            vec![None]
        } else {
            action.body.iter().map(Some).collect()
        };
        let disambiguate = passes.len() > 1;
        let body_media_types: Vec<MediaType> =
            action.body.iter().map(|b| b.media_type.clone()).collect();
        let response_media_types: Vec<MediaType> =
            action.response_media_types().into_iter().cloned().collect();

        for body in passes {
            let body_media_type = body.map(|b| &b.media_type);
            let origin = Origin::resource(path)
                .with_verb(action.verb)
                .with_media_type(body_media_type);

            let name = naming::method_name(action, body_media_type.filter(|_| disambiguate));
            if interface.method(&name).is_some() {
                return Err(GenerateError::NamingCollision {
                    origin,
                    kind: NameKind::Method,
                    name,
                    scope: interface.name.clone(),
                });
            }

            let mut method = self.build_method(
                name,
                action,
                body,
                path,
                uri_parameters,
                &response_media_types,
                &origin,
            )?;

            let ctx = MethodContext {
                resource,
                path,
                action,
                body_media_type,
                body_media_types: &body_media_types,
                response_media_types: &response_media_types,
            };
            let required = self.profile.required_method_metadata(&method);
            self.hooks
                .notify_method(&mut method, &ctx, &required, &origin)?;
            interface.methods.push(method);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_method(
        &self,
        name: String,
        action: &Action,
        body: Option<&BodyVariant>,
        path: &str,
        uri_parameters: &[&Parameter],
        response_media_types: &[MediaType],
        origin: &Origin,
    ) -> Result<ResourceMethod, GenerateError> {
        let profile = self.profile;
        let bind_err = |e: BindError| e.at(origin.clone());

        let mut method = ResourceMethod::new(name, action.verb, path.to_string());
        method.description = action.description.clone();
        trace!(method = %method.name, origin = %origin, "Building method.");

        profile
            .bind_routing(RoutingTarget::Method(&mut method), Some(action.verb), None)
            .map_err(bind_err)?;
        profile
            .bind_consumes(&mut method, body.map(|b| &b.media_type))
            .map_err(bind_err)?;
        profile
            .bind_produces(&mut method, response_media_types)
            .map_err(bind_err)?;

        // Path parameters: template variables first, then declarations the path does not name.
        let variables = template_variables(path);
        let mut path_parameters: Vec<Parameter> = variables
            .iter()
            .map(|var| {
                uri_parameters
                    .iter()
                    .find(|p| p.name == *var)
                    .map(|p| (*p).clone())
                    .unwrap_or_else(|| {
                        let mut implicit = Parameter::new(*var, ParamLocation::Path);
                        implicit.required = true;
                        implicit
                    })
            })
            .collect();
        path_parameters.extend(
            uri_parameters
                .iter()
                .filter(|p| !variables.contains(&p.name.as_str()))
                .map(|p| (*p).clone()),
        );

        let declared = path_parameters
            .iter()
            .map(|p| (p, ParamLocation::Path))
            .chain(action.parameters.iter().map(|p| (p, p.location)))
            .chain(
                body.into_iter()
                    .flat_map(|b| &b.form_parameters)
                    .map(|p| (p, ParamLocation::Form)),
            );

        for (parameter, location) in declared {
            let mut binding = ParameterBinding::from_parameter(parameter, location);
            profile
                .bind_parameter(&mut binding, location)
                .map_err(bind_err)?;
            profile
                .bind_default(&mut binding, parameter.default.as_deref())
                .map_err(bind_err)?;
            push_parameter(&mut method, binding, origin)?;
        }

        if let Some(body) = body.filter(|b| !b.media_type.is_form()) {
            let mut entity = ParameterBinding::entity(JavaType::for_schema(body.schema.as_deref()));
            profile
                .bind_parameter(&mut entity, ParamLocation::Body)
                .map_err(bind_err)?;
            push_parameter(&mut method, entity, origin)?;
        }

        if let Some(throws) = self.config.method_throws.as_deref().map(str::trim)
            && !throws.is_empty()
        {
            method.throws.push(JavaType::qualified(throws));
        }

        method.return_shape = match self.config.deferred_trait() {
            Some(trait_name) if action.has_trait(trait_name) => {
                let holder = profile
                    .bind_deferred_response(&mut method, trait_name)
                    .map_err(bind_err)?;
                check_unique_parameters(&method, origin)?;
                ReturnShape::Deferred { holder }
            }
            _ if response_media_types.is_empty() && self.config.empty_response_return_void => {
                ReturnShape::Void
            }
            _ => ReturnShape::Wrapper(Box::new(synth::synthesize(
                &method.name,
                action,
                profile.envelope(),
                origin,
            )?)),
        };

        Ok(method)
    }
}

fn push_parameter(
    method: &mut ResourceMethod,
    binding: ParameterBinding,
    origin: &Origin,
) -> Result<(), GenerateError> {
    method.parameters.push(binding);
    check_unique_parameters(method, origin)
}

fn check_unique_parameters(method: &ResourceMethod, origin: &Origin) -> Result<(), GenerateError> {
    let mut seen = HashSet::new();
    for parameter in &method.parameters {
        if !seen.insert(parameter.name.as_str()) {
            return Err(GenerateError::validation(
                origin.clone(),
                format!(
                    "parameter name '{}' is used twice in {}",
                    parameter.name, method.name
                ),
            ));
        }
    }
    Ok(())
}

/// Every simple type name in one interface source must resolve to a single type.
///
/// Nested wrapper classes may not repeat the interface name, schema types may
/// not be shadowed by a generated type, and nothing local may share a simple
/// name with an import.
fn check_type_names(interface: &ResourceInterface, origin: &Origin) -> Result<(), GenerateError> {
    let collision = |origin: Origin, name: &str, scope: String| GenerateError::NamingCollision {
        origin,
        kind: NameKind::Type,
        name: name.to_string(),
        scope,
    };

    let mut declared: Vec<(&str, Origin)> = vec![(interface.name.as_str(), origin.clone())];
    let mut referenced: Vec<(&str, Origin)> = Vec::new();
    for method in &interface.methods {
        let method_origin = origin.clone().with_verb(method.verb);
        if let Some(wrapper) = method.wrapper() {
            if declared.iter().any(|(name, _)| *name == wrapper.name) {
                return Err(collision(method_origin, &wrapper.name, interface.name.clone()));
            }
            declared.push((wrapper.name.as_str(), method_origin.clone()));
        }
        for ty in method
            .parameters
            .iter()
            .map(|p| &p.java_type)
            .chain(&method.throws)
        {
            local_type_names(ty, &mut |name| referenced.push((name, method_origin.clone())));
        }
    }

    for (name, at) in &referenced {
        if declared.iter().any(|(other, _)| other == name) {
            return Err(collision(
                at.clone(),
                name,
                format!("{} (generated type shadows the referenced type)", interface.name),
            ));
        }
    }

    let imports = interface_imports(interface);
    let mut imported: HashMap<&str, &str> = HashMap::new();
    for qualified in &imports {
        let qualified = qualified.as_str();
        let simple = qualified.rsplit('.').next().unwrap_or(qualified);
        if let Some(previous) = imported.insert(simple, qualified) {
            return Err(collision(
                origin.clone(),
                simple,
                format!("{} (imports {previous} and {qualified})", interface.name),
            ));
        }
    }
    for (name, at) in declared.iter().chain(&referenced) {
        if let Some(qualified) = imported.get(name) {
            return Err(collision(
                at.clone(),
                name,
                format!("{} (imports {qualified})", interface.name),
            ));
        }
    }
    Ok(())
}

fn local_type_names<'t>(ty: &'t JavaType, found: &mut impl FnMut(&'t str)) {
    if ty.package.is_none() {
        found(&ty.name);
    }
    for arg in &ty.args {
        local_type_names(arg, found);
    }
}
