//! Input model for resgen: the API description loaded from JSON or YAML.
//!
//! The engine in `resgen-core` only ever reads these types.

mod loader;
mod resource;
mod verb;

pub use loader::LoadError;
pub use resource::{
    Action, ApiDescription, ApiResource, BodyVariant, MediaType, ParamType, Parameter, Response,
    ResponseBody,
};
pub use verb::{HttpVerb, ParamLocation, UnknownVerb};
