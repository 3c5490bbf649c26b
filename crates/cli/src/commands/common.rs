use std::path::{Path, PathBuf};

use clap::Args;
use resgen_core::{
    ExtensionHookRegistry, GeneratedApi, GeneratorConfig, ProfileKind, generate_profiles,
};
use resgen_model::ApiDescription;
use tracing::debug;

/// Options shared by every command that runs the generator.
#[derive(Args, Debug, Clone, Default)]
pub struct GeneratorArgs {
    /// API description (JSON, or YAML for any other extension)
    #[arg(value_name = "API_FILE")]
    pub input: PathBuf,

    /// TOML file with generator settings; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target profile(s): spring-mvc, jax-rs
    #[arg(long = "profile", value_name = "PROFILE", value_delimiter = ',')]
    pub profiles: Vec<ProfileKind>,

    /// Run every profile
    #[arg(long = "all-profiles", conflicts_with = "profiles")]
    pub all_profiles: bool,

    /// Java package of the generated sources
    #[arg(long, value_name = "PACKAGE")]
    pub package: Option<String>,

    /// Trait name marking actions answered through an injected response holder
    #[arg(long = "deferred-trait", value_name = "TRAIT")]
    pub deferred_trait: Option<String>,

    /// Generate response wrappers even for actions without response bodies
    #[arg(long = "no-empty-void")]
    pub no_empty_void: bool,

    /// Exception type every generated method declares
    #[arg(long = "method-throws", value_name = "TYPE")]
    pub method_throws: Option<String>,
}

impl GeneratorArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<GeneratorConfig, String> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_path(path).map_err(|e| e.to_string())?,
            None => GeneratorConfig::default(),
        };
        if let Some(package) = &self.package {
            config.package.clone_from(package);
        }
        if let Some(name) = &self.deferred_trait {
            config.deferred_response_trait = Some(name.clone());
        }
        if self.no_empty_void {
            config.empty_response_return_void = false;
        }
        if let Some(throws) = &self.method_throws {
            config.method_throws = Some(throws.clone());
        }
        if let Some(first) = self.profiles.first() {
            config.profile = *first;
        }
        Ok(config)
    }

    /// Profiles to run, deduplicated, in the order given.
    pub fn selected_profiles(&self, config: &GeneratorConfig) -> Vec<ProfileKind> {
        if self.all_profiles {
            return ProfileKind::ALL.to_vec();
        }
        let mut selected = Vec::new();
        for kind in &self.profiles {
            if !selected.contains(kind) {
                selected.push(*kind);
            }
        }
        if selected.is_empty() {
            selected.push(config.profile);
        }
        selected
    }
}

/// Load the input and run every selected profile.
///
/// Fails if any profile fails; callers never see partial output.
pub fn run_generator(
    args: &GeneratorArgs,
) -> Result<(GeneratorConfig, Vec<(ProfileKind, GeneratedApi)>), String> {
    let config = args.resolve_config()?;
    let api = load_api(&args.input)?;
    let profiles = args.selected_profiles(&config);
    let hooks = ExtensionHookRegistry::new().with_policy(config.hook_failure_policy);

    let mut generated = Vec::with_capacity(profiles.len());
    for (kind, result) in generate_profiles(&api, &config, &profiles, &hooks) {
        let api = result.map_err(|e| format!("{kind}: {e}"))?;
        generated.push((kind, api));
    }
    Ok((config, generated))
}

fn load_api(path: &Path) -> Result<ApiDescription, String> {
    debug!(path = %path.display(), "Loading API description.");
    ApiDescription::from_path(path).map_err(|e| e.to_string())
}
