//! Response wrapper synthesis.
//!
//! One wrapper per method: the three private constructor shapes of the
//! envelope plus one static factory per distinct (status, media type) pair.

use std::collections::HashSet;

use http::StatusCode;
use resgen_model::{Action, MediaType};

use crate::error::{GenerateError, NameKind, Origin};
use crate::ir::{ConstructorShape, Envelope, ResponseVariant, ResponseWrapperType};
use crate::naming::{response_factory_name, response_type_name};

/// Resolve a declared status token to a known HTTP status.
///
/// Only numeric tokens naming a registered status are accepted; `"200"`
/// resolves, `"OK"`, `"2xx"`, and `"799"` do not.
pub fn resolve_status(token: &str) -> Option<StatusCode> {
    let code = token.trim().parse::<u16>().ok()?;
    let status = StatusCode::from_u16(code).ok()?;
    status.canonical_reason().map(|_| status)
}

/// Build the wrapper type returned by `method_name` for `action`.
///
/// Every status token is resolved before any factory is built, so an
/// unresolvable token fails the whole wrapper.
pub fn synthesize(
    method_name: &str,
    action: &Action,
    envelope: Envelope,
    origin: &Origin,
) -> Result<ResponseWrapperType, GenerateError> {
    let statuses = action
        .responses
        .iter()
        .map(|response| {
            resolve_status(&response.status).ok_or_else(|| {
                GenerateError::validation(
                    origin.clone(),
                    format!("unknown HTTP status code '{}'", response.status),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let name = response_type_name(method_name);
    let mut wrapper = ResponseWrapperType {
        name,
        envelope,
        constructors: ConstructorShape::ALL.to_vec(),
        variants: Vec::new(),
    };

    let mut seen_pairs: HashSet<(StatusCode, Option<&MediaType>)> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    for (response, status) in action.responses.iter().zip(statuses) {
        let media_types: Vec<Option<&MediaType>> = if response.body.is_empty() {
            vec![None]
        } else {
            response.body.iter().map(|b| Some(&b.media_type)).collect()
        };

        for media_type in media_types {
            if !seen_pairs.insert((status, media_type)) {
                continue;
            }
            let factory_name = response_factory_name(status, media_type);
            if !seen_names.insert(factory_name.clone()) {
                return Err(GenerateError::NamingCollision {
                    origin: origin.clone().with_media_type(media_type),
                    kind: NameKind::ResponseFactory,
                    name: factory_name,
                    scope: wrapper.name.clone(),
                });
            }
            wrapper.variants.push(ResponseVariant {
                status,
                media_type: media_type.cloned(),
                factory_name,
            });
        }
    }

    Ok(wrapper)
}
