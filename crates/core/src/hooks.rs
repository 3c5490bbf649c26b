//! Extension hooks notified after each interface and method is built.
//!
//! Hooks run synchronously in registration order. They may add metadata but
//! must leave in place the metadata kinds the active profile requires; the
//! registry checks this after every call.

use std::fmt;

use resgen_model::{Action, ApiResource, MediaType};
use serde::Deserialize;
use tracing::{trace, warn};

use crate::error::{GenerateError, HookError, Origin};
use crate::ir::{Annotated, AnnotationKind, ResourceInterface, ResourceMethod};

/// Observer of generated elements.
///
/// Both callbacks default to doing nothing, so an extension implements only
/// what it needs.
pub trait GeneratorExtension: Send + Sync {
    /// Name used in error messages and logs.
    fn name(&self) -> &str;

    fn on_create_interface(
        &self,
        _interface: &mut ResourceInterface,
        _ctx: &InterfaceContext<'_>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    fn on_add_method(
        &self,
        _method: &mut ResourceMethod,
        _ctx: &MethodContext<'_>,
    ) -> Result<(), HookError> {
        Ok(())
    }
}

/// Input context of a finished interface.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceContext<'a> {
    pub resource: &'a ApiResource,
    /// Full resource path.
    pub path: &'a str,
}

/// Input context of a finished method.
#[derive(Debug, Clone, Copy)]
pub struct MethodContext<'a> {
    pub resource: &'a ApiResource,
    pub path: &'a str,
    pub action: &'a Action,
    /// Request-body media type of this pass, `None` for the no-body pass.
    pub body_media_type: Option<&'a MediaType>,
    /// Every request-body media type the action declares.
    pub body_media_types: &'a [MediaType],
    /// Distinct response media types of the action.
    pub response_media_types: &'a [MediaType],
}

/// Reaction to a failing hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookFailurePolicy {
    /// Abort the run on the first failure.
    #[default]
    FailFast,
    /// Undo the failing hook's changes, log a warning, and keep going.
    SkipAndContinue,
}

/// Ordered list of extensions plus the failure policy.
#[derive(Default)]
pub struct ExtensionHookRegistry {
    hooks: Vec<Box<dyn GeneratorExtension>>,
    policy: HookFailurePolicy,
}

impl fmt::Debug for ExtensionHookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionHookRegistry")
            .field(
                "hooks",
                &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

impl ExtensionHookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: HookFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn register(&mut self, hook: impl GeneratorExtension + 'static) -> &mut Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn policy(&self) -> HookFailurePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn notify_interface(
        &self,
        interface: &mut ResourceInterface,
        ctx: &InterfaceContext<'_>,
        required: &[AnnotationKind],
        origin: &Origin,
    ) -> Result<(), GenerateError> {
        self.notify(interface, required, origin, |hook, element| {
            hook.on_create_interface(element, ctx)
        })
    }

    pub(crate) fn notify_method(
        &self,
        method: &mut ResourceMethod,
        ctx: &MethodContext<'_>,
        required: &[AnnotationKind],
        origin: &Origin,
    ) -> Result<(), GenerateError> {
        self.notify(method, required, origin, |hook, element| {
            hook.on_add_method(element, ctx)
        })
    }

    fn notify<T, F>(
        &self,
        element: &mut T,
        required: &[AnnotationKind],
        origin: &Origin,
        call: F,
    ) -> Result<(), GenerateError>
    where
        T: Annotated + Clone,
        F: Fn(&dyn GeneratorExtension, &mut T) -> Result<(), HookError>,
    {
        for hook in &self.hooks {
            let snapshot = match self.policy {
                HookFailurePolicy::SkipAndContinue => Some(element.clone()),
                HookFailurePolicy::FailFast => None,
            };

            trace!(hook = hook.name(), element = %element.describe(), "Running extension hook.");
            let outcome = call(hook.as_ref(), element).and_then(|()| {
                match required.iter().find(|kind| !element.metadata().contains(kind)) {
                    Some(kind) => Err(format!(
                        "removed required {} metadata",
                        kind.qualified_name()
                    )
                    .into()),
                    None => Ok(()),
                }
            });

            let Err(source) = outcome else {
                continue;
            };

            match snapshot {
                Some(previous) => {
                    warn!(
                        hook = hook.name(),
                        element = %element.describe(),
                        origin = %origin,
                        error = %source,
                        "Extension hook failed; skipping it for this element."
                    );
                    *element = previous;
                }
                None => {
                    return Err(GenerateError::ExtensionHook {
                        hook: hook.name().to_string(),
                        element: element.describe(),
                        origin: origin.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ir::AttrValue;

    struct Recorder {
        label: &'static str,
        seen: &'static Mutex<Vec<String>>,
    }

    impl GeneratorExtension for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn on_create_interface(
            &self,
            interface: &mut ResourceInterface,
            _ctx: &InterfaceContext<'_>,
        ) -> Result<(), HookError> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, interface.name));
            interface
                .metadata
                .entry(AnnotationKind::Custom("com.acme.Audited".into()))
                .set("by", AttrValue::Str(self.label.into()));
            Ok(())
        }
    }

    struct Stripper;

    impl GeneratorExtension for Stripper {
        fn name(&self) -> &str {
            "stripper"
        }

        fn on_create_interface(
            &self,
            interface: &mut ResourceInterface,
            _ctx: &InterfaceContext<'_>,
        ) -> Result<(), HookError> {
            interface.metadata.remove(&AnnotationKind::Path);
            Ok(())
        }
    }

    struct Failing;

    impl GeneratorExtension for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_create_interface(
            &self,
            interface: &mut ResourceInterface,
            _ctx: &InterfaceContext<'_>,
        ) -> Result<(), HookError> {
            interface.description = Some("half-done".into());
            Err("boom".into())
        }
    }

    fn routed_interface() -> ResourceInterface {
        let mut interface = ResourceInterface::new("Users".into(), "/users".into());
        interface
            .metadata
            .entry(AnnotationKind::Path)
            .set("value", AttrValue::Str("/users".into()));
        interface
    }

    fn run(registry: &ExtensionHookRegistry, interface: &mut ResourceInterface) -> Result<(), GenerateError> {
        let resource = ApiResource::new("/users");
        let ctx = InterfaceContext {
            resource: &resource,
            path: "/users",
        };
        registry.notify_interface(
            interface,
            &ctx,
            &[AnnotationKind::Path],
            &Origin::resource("/users"),
        )
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        static SEEN: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let mut registry = ExtensionHookRegistry::new();
        registry
            .register(Recorder {
                label: "first",
                seen: &SEEN,
            })
            .register(Recorder {
                label: "second",
                seen: &SEEN,
            });

        let mut interface = routed_interface();
        run(&registry, &mut interface).unwrap();

        assert_eq!(*SEEN.lock().unwrap(), ["first:Users", "second:Users"]);
        let audited = interface
            .metadata
            .get(&AnnotationKind::Custom("com.acme.Audited".into()))
            .unwrap();
        assert_eq!(audited.get("by"), Some(&AttrValue::Str("second".into())));
    }

    #[test]
    fn test_failure_aborts_by_default() {
        let mut registry = ExtensionHookRegistry::new();
        registry.register(Failing);

        let err = run(&registry, &mut routed_interface()).unwrap_err();
        match err {
            GenerateError::ExtensionHook { hook, element, .. } => {
                assert_eq!(hook, "failing");
                assert_eq!(element, "interface 'Users'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_removing_required_metadata_is_a_hook_error() {
        let mut registry = ExtensionHookRegistry::new();
        registry.register(Stripper);

        let err = run(&registry, &mut routed_interface()).unwrap_err();
        assert!(err.to_string().contains("removed required javax.ws.rs.Path metadata"));
    }

    #[test]
    fn test_skip_and_continue_restores_element() {
        static SEEN: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let mut registry = ExtensionHookRegistry::new().with_policy(HookFailurePolicy::SkipAndContinue);
        registry.register(Failing).register(Stripper).register(Recorder {
            label: "after",
            seen: &SEEN,
        });

        let mut interface = routed_interface();
        run(&registry, &mut interface).unwrap();

        assert_eq!(interface.description, None);
        assert!(interface.metadata.contains(&AnnotationKind::Path));
        assert_eq!(*SEEN.lock().unwrap(), ["after:Users"]);
    }

    #[test]
    fn test_debug_lists_hook_names() {
        let mut registry = ExtensionHookRegistry::new();
        registry.register(Stripper);
        assert!(format!("{registry:?}").contains("stripper"));
        assert_eq!(registry.len(), 1);
    }
}
