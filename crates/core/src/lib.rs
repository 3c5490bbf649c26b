//! Interface generation engine.
//!
//! Walks an [`ApiDescription`] and builds one annotated Java interface per
//! resource for a chosen routing profile. The engine produces a structural
//! model ([`GeneratedApi`]); [`emit`] renders it to source text.
//!
//! ```text
//! ApiDescription ──validate──▶ ResourceTraversal ──▶ GeneratedApi ──emit──▶ *.java
//!                                 │  naming / synth / profile
//!                                 └─ ExtensionHookRegistry
//! ```

use rayon::prelude::*;
use resgen_model::ApiDescription;
use tracing::info;

pub mod config;
pub mod emit;
pub mod error;
pub mod hooks;
pub mod ir;
pub mod naming;
pub mod profile;
pub mod synth;
pub mod traversal;
pub mod validate;


pub use config::{ConfigError, GeneratorConfig};
pub use error::{GenerateError, NameKind, Origin};
pub use hooks::{
    ExtensionHookRegistry, GeneratorExtension, HookFailurePolicy, InterfaceContext, MethodContext,
};
pub use ir::GeneratedApi;
pub use profile::{ProfileKind, RoutingProfile};
pub use traversal::ResourceTraversal;

/// Generate the interfaces of `api` for the profile selected in `config`.
///
/// Validation runs over the whole tree first; any error aborts the run and
/// no partial output is returned.
pub fn generate(
    api: &ApiDescription,
    config: &GeneratorConfig,
    hooks: &ExtensionHookRegistry,
) -> Result<GeneratedApi, GenerateError> {
    let profile = config.profile.profile();
    info!(
        profile = %config.profile,
        resources = api.resources.len(),
        hooks = hooks.len(),
        "Generating interfaces."
    );

    validate::validate(api, profile)?;
    let generated = ResourceTraversal::new(config, profile, hooks).run(api)?;

    info!(
        profile = %config.profile,
        interfaces = generated.interfaces.len(),
        "Generated interfaces."
    );
    Ok(generated)
}

/// Run one isolated generation per profile, in parallel.
///
/// The input model and hooks are shared read-only; each run owns its
/// traversal state. Results come back in the order of `profiles`.
pub fn generate_profiles(
    api: &ApiDescription,
    config: &GeneratorConfig,
    profiles: &[ProfileKind],
    hooks: &ExtensionHookRegistry,
) -> Vec<(ProfileKind, Result<GeneratedApi, GenerateError>)> {
    profiles
        .par_iter()
        .map(|&kind| (kind, generate(api, &config.for_profile(kind), hooks)))
        .collect()
}
