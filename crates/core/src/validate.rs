//! Whole-tree validation that runs before any interface is built.

use std::collections::HashSet;

use resgen_model::{ApiDescription, ApiResource, MediaType, ParamLocation};

use crate::error::{GenerateError, Origin};
use crate::profile::RoutingProfile;
use crate::synth::resolve_status;
use crate::traversal::join_path;

/// Check everything the active profile must be able to bind.
///
/// Fails on the first problem, in traversal order.
pub fn validate(api: &ApiDescription, profile: &dyn RoutingProfile) -> Result<(), GenerateError> {
    for resource in &api.resources {
        validate_resource(resource, "", profile)?;
    }
    Ok(())
}

fn validate_resource(
    resource: &ApiResource,
    parent_path: &str,
    profile: &dyn RoutingProfile,
) -> Result<(), GenerateError> {
    let path = join_path(parent_path, &resource.relative_uri);

    let mut verbs = HashSet::new();
    for action in &resource.actions {
        let origin = Origin::resource(&path).with_verb(action.verb);

        if !verbs.insert(action.verb) {
            return Err(GenerateError::validation(
                origin,
                format!("{} is declared more than once", action.verb),
            ));
        }
        if !profile.supports_verb(action.verb) {
            return Err(GenerateError::validation(
                origin,
                format!("the {} profile cannot route {}", profile.kind(), action.verb),
            ));
        }

        check_locations(
            action.parameters.iter().map(|p| (&p.name, p.location)),
            &origin,
            profile,
        )?;

        let mut body_types: HashSet<&MediaType> = HashSet::new();
        for variant in &action.body {
            let origin = origin.clone().with_media_type(Some(&variant.media_type));
            if !body_types.insert(&variant.media_type) {
                return Err(GenerateError::validation(
                    origin,
                    "request body media type is declared more than once",
                ));
            }
            check_locations(
                variant.form_parameters.iter().map(|p| (&p.name, ParamLocation::Form)),
                &origin,
                profile,
            )?;
        }

        let mut statuses = HashSet::new();
        for response in &action.responses {
            let Some(status) = resolve_status(&response.status) else {
                return Err(GenerateError::validation(
                    origin,
                    format!("unknown HTTP status code '{}'", response.status),
                ));
            };
            if !statuses.insert(status) {
                return Err(GenerateError::validation(
                    origin,
                    format!("response {} is declared more than once", status.as_u16()),
                ));
            }
        }
    }

    for child in &resource.resources {
        validate_resource(child, &path, profile)?;
    }
    Ok(())
}

fn check_locations<'a>(
    params: impl Iterator<Item = (&'a String, ParamLocation)>,
    origin: &Origin,
    profile: &dyn RoutingProfile,
) -> Result<(), GenerateError> {
    for (name, location) in params {
        if !profile.supports_location(location) {
            return Err(GenerateError::validation(
                origin.clone(),
                format!(
                    "parameter '{name}' uses location '{location}', which the {} profile cannot bind",
                    profile.kind()
                ),
            ));
        }
    }
    Ok(())
}
