//! Generated entities: interfaces, methods, parameters, and response wrappers.
//!
//! Ownership is strict tree containment. A [`GeneratedApi`] owns its
//! interfaces, an interface owns its methods, a method owns its parameter
//! bindings and at most one [`ResponseWrapperType`].
//!
//! Routing metadata lives in a [`Metadata`] map on each element, keyed by
//! [`AnnotationKind`], so profiles find what they attached earlier without
//! scanning.

use std::collections::{BTreeMap, BTreeSet};

use http::StatusCode;
use resgen_model::{HttpVerb, MediaType, ParamLocation, ParamType, Parameter};

use crate::naming::{is_valid_identifier, variable_name};
use crate::profile::ProfileKind;

// =============================================================================
// Types
// =============================================================================

/// Reference to a Java type, optionally generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JavaType {
    /// Package (or enclosing type) to import from; `None` for same-package types.
    pub package: Option<String>,
    pub name: String,
    pub args: Vec<JavaType>,
}

impl JavaType {
    /// Build from a fully qualified name such as `java.util.Date`.
    pub fn qualified(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((package, name)) => Self {
                package: Some(package.to_string()),
                name: name.to_string(),
                args: Vec::new(),
            },
            None => Self::local(qualified),
        }
    }

    /// A type in the generated package (or nested in the current file).
    pub fn local(name: &str) -> Self {
        Self {
            package: None,
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<JavaType>) -> Self {
        self.args = args;
        self
    }

    pub fn object() -> Self {
        Self::qualified("java.lang.Object")
    }

    pub fn string() -> Self {
        Self::qualified("java.lang.String")
    }

    /// Source form without package: `ResponseEntity<Object>`.
    pub fn simple(&self) -> String {
        if self.args.is_empty() {
            self.name.clone()
        } else {
            let args: Vec<_> = self.args.iter().map(JavaType::simple).collect();
            format!("{}<{}>", self.name, args.join(", "))
        }
    }

    /// Add the imports this type needs (skipping `java.lang`).
    pub fn collect_imports(&self, imports: &mut BTreeSet<String>) {
        if let Some(package) = &self.package
            && package != "java.lang"
        {
            imports.insert(format!("{package}.{}", self.name));
        }
        for arg in &self.args {
            arg.collect_imports(imports);
        }
    }

    /// Target type for a declared parameter type.
    pub fn for_param_type(param_type: ParamType) -> Self {
        match param_type {
            ParamType::String | ParamType::Unknown => Self::string(),
            ParamType::Integer => Self::qualified("java.lang.Long"),
            ParamType::Number => Self::qualified("java.lang.Double"),
            ParamType::Boolean => Self::qualified("java.lang.Boolean"),
            ParamType::Date => Self::qualified("java.util.Date"),
            ParamType::File => Self::qualified("java.io.InputStream"),
        }
    }

    /// Target type for a request-body schema reference.
    ///
    /// A schema that names a type (`User`) is used as-is; inline schemas map to `Object`.
    pub fn for_schema(schema: Option<&str>) -> Self {
        match schema.map(str::trim) {
            Some(name)
                if is_valid_identifier(name)
                    && name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) =>
            {
                Self::local(name)
            }
            _ => Self::object(),
        }
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Kind of routing metadata attached to a generated element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationKind {
    // Spring MVC
    RestController,
    RequestMapping,
    PathVariable,
    RequestParam,
    RequestHeader,
    RequestBody,
    // JAX-RS
    Path,
    Verb(HttpVerb),
    Consumes,
    Produces,
    PathParam,
    QueryParam,
    HeaderParam,
    FormParam,
    CookieParam,
    DefaultValue,
    Suspended,
    /// Anything added by an extension hook, by fully qualified name.
    Custom(String),
}

impl AnnotationKind {
    /// Fully qualified annotation type.
    pub fn qualified_name(&self) -> String {
        let fixed = match self {
            AnnotationKind::RestController => {
                "org.springframework.web.bind.annotation.RestController"
            }
            AnnotationKind::RequestMapping => {
                "org.springframework.web.bind.annotation.RequestMapping"
            }
            AnnotationKind::PathVariable => "org.springframework.web.bind.annotation.PathVariable",
            AnnotationKind::RequestParam => "org.springframework.web.bind.annotation.RequestParam",
            AnnotationKind::RequestHeader => {
                "org.springframework.web.bind.annotation.RequestHeader"
            }
            AnnotationKind::RequestBody => "org.springframework.web.bind.annotation.RequestBody",
            AnnotationKind::Path => "javax.ws.rs.Path",
            AnnotationKind::Verb(verb) => return format!("javax.ws.rs.{}", verb.as_str()),
            AnnotationKind::Consumes => "javax.ws.rs.Consumes",
            AnnotationKind::Produces => "javax.ws.rs.Produces",
            AnnotationKind::PathParam => "javax.ws.rs.PathParam",
            AnnotationKind::QueryParam => "javax.ws.rs.QueryParam",
            AnnotationKind::HeaderParam => "javax.ws.rs.HeaderParam",
            AnnotationKind::FormParam => "javax.ws.rs.FormParam",
            AnnotationKind::CookieParam => "javax.ws.rs.CookieParam",
            AnnotationKind::DefaultValue => "javax.ws.rs.DefaultValue",
            AnnotationKind::Suspended => "javax.ws.rs.container.Suspended",
            AnnotationKind::Custom(name) => return name.clone(),
        };
        fixed.to_string()
    }

    pub fn java_type(&self) -> JavaType {
        JavaType::qualified(&self.qualified_name())
    }
}

/// Annotation attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    /// Enum constant such as `RequestMethod.GET`.
    Constant { owner: JavaType, name: String },
    Array(Vec<AttrValue>),
}

/// One attached annotation with its attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    attributes: Vec<(String, AttrValue)>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    /// Insert or replace an attribute.
    pub fn set(&mut self, name: &str, value: AttrValue) -> &mut Self {
        match self.position(name) {
            Some(index) => self.attributes[index].1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    /// Append to an array attribute, creating it if needed.
    pub fn push(&mut self, name: &str, value: AttrValue) -> &mut Self {
        let Some(index) = self.position(name) else {
            self.attributes
                .push((name.to_string(), AttrValue::Array(vec![value])));
            return self;
        };
        let existing = &mut self.attributes[index].1;
        if let AttrValue::Array(items) = existing {
            items.push(value);
        } else {
            let previous = std::mem::replace(existing, AttrValue::Array(Vec::new()));
            *existing = AttrValue::Array(vec![previous, value]);
        }
        self
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|(key, _)| key == name)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }
}

/// Metadata map of one generated element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata(BTreeMap<AnnotationKind, Annotation>);

impl Metadata {
    pub fn get(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.0.get(kind)
    }

    pub fn get_mut(&mut self, kind: &AnnotationKind) -> Option<&mut Annotation> {
        self.0.get_mut(kind)
    }

    /// Existing annotation of this kind, or a fresh one.
    pub fn entry(&mut self, kind: AnnotationKind) -> &mut Annotation {
        self.0
            .entry(kind)
            .or_insert_with_key(|kind| Annotation::new(kind.clone()))
    }

    pub fn contains(&self, kind: &AnnotationKind) -> bool {
        self.0.contains_key(kind)
    }

    pub fn remove(&mut self, kind: &AnnotationKind) -> Option<Annotation> {
        self.0.remove(kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An element that carries routing metadata.
pub trait Annotated {
    fn metadata(&self) -> &Metadata;
    fn metadata_mut(&mut self) -> &mut Metadata;
    /// Short human description for error messages ("method 'getJson'").
    fn describe(&self) -> String;
}

// =============================================================================
// Elements
// =============================================================================

/// Everything one run produced for one profile.
#[derive(Debug, Clone)]
pub struct GeneratedApi {
    pub profile: ProfileKind,
    pub interfaces: Vec<ResourceInterface>,
}

impl GeneratedApi {
    pub fn interface(&self, name: &str) -> Option<&ResourceInterface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Interface generated for the resource at `path`.
    pub fn interface_for_path(&self, path: &str) -> Option<&ResourceInterface> {
        self.interfaces.iter().find(|i| i.path == path)
    }
}

/// Generated interface for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInterface {
    pub name: String,
    /// Full resource path, used as the base path.
    pub path: String,
    pub description: Option<String>,
    pub methods: Vec<ResourceMethod>,
    pub metadata: Metadata,
}

impl ResourceInterface {
    pub fn new(name: String, path: String) -> Self {
        Self {
            name,
            path,
            description: None,
            methods: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&ResourceMethod> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Generated method for one (action, request media type) pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMethod {
    pub name: String,
    pub verb: HttpVerb,
    pub path: String,
    pub description: Option<String>,
    pub consumes: Vec<MediaType>,
    pub produces: Vec<MediaType>,
    pub parameters: Vec<ParameterBinding>,
    pub return_shape: ReturnShape,
    pub throws: Vec<JavaType>,
    pub metadata: Metadata,
}

impl ResourceMethod {
    pub fn new(name: String, verb: HttpVerb, path: String) -> Self {
        Self {
            name,
            verb,
            path,
            description: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            parameters: Vec::new(),
            return_shape: ReturnShape::Void,
            throws: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterBinding> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The synthesized wrapper, when the method returns one.
    pub fn wrapper(&self) -> Option<&ResponseWrapperType> {
        match &self.return_shape {
            ReturnShape::Wrapper(wrapper) => Some(&**wrapper),
            ReturnShape::Void | ReturnShape::Deferred { .. } => None,
        }
    }
}

/// What a generated method returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnShape {
    Void,
    Wrapper(Box<ResponseWrapperType>),
    /// Returns nothing; the named parameter is the out-of-band response holder.
    Deferred { holder: String },
}

impl ReturnShape {
    pub fn is_void(&self) -> bool {
        !matches!(self, ReturnShape::Wrapper(_))
    }
}

/// One method parameter with its routing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    /// Java identifier.
    pub name: String,
    /// Name on the wire, as declared.
    pub wire_name: String,
    /// `None` for parameters the engine injects (the deferred-response holder).
    pub location: Option<ParamLocation>,
    pub java_type: JavaType,
    pub required: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub metadata: Metadata,
}

impl ParameterBinding {
    /// Binding skeleton for a declared parameter; metadata is left to the profile.
    pub fn from_parameter(parameter: &Parameter, location: ParamLocation) -> Self {
        Self {
            name: variable_name(&parameter.name),
            wire_name: parameter.name.clone(),
            location: Some(location),
            java_type: JavaType::for_param_type(parameter.param_type),
            required: parameter.required || location == ParamLocation::Path,
            default_value: None,
            description: parameter.description.clone(),
            metadata: Metadata::default(),
        }
    }

    /// The request entity parameter of a non-form body pass.
    pub fn entity(java_type: JavaType) -> Self {
        Self {
            name: "entity".to_string(),
            wire_name: "entity".to_string(),
            location: Some(ParamLocation::Body),
            java_type,
            required: true,
            default_value: None,
            description: None,
            metadata: Metadata::default(),
        }
    }

    /// A parameter injected by the engine rather than declared in the input.
    pub fn injected(name: String, java_type: JavaType, description: Option<String>) -> Self {
        Self {
            wire_name: name.clone(),
            name,
            location: None,
            java_type,
            required: true,
            default_value: None,
            description,
            metadata: Metadata::default(),
        }
    }
}

/// Per-method response type with one static factory per (status, media type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseWrapperType {
    pub name: String,
    pub envelope: Envelope,
    pub constructors: Vec<ConstructorShape>,
    pub variants: Vec<ResponseVariant>,
}

impl ResponseWrapperType {
    pub fn variant(&self, factory_name: &str) -> Option<&ResponseVariant> {
        self.variants.iter().find(|v| v.factory_name == factory_name)
    }
}

/// Private constructor shapes of a wrapper, mirroring the envelope's own constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorShape {
    Status,
    StatusBody,
    StatusBodyHeaders,
}

impl ConstructorShape {
    pub const ALL: [ConstructorShape; 3] = [
        ConstructorShape::Status,
        ConstructorShape::StatusBody,
        ConstructorShape::StatusBodyHeaders,
    ];
}

/// One static factory of a wrapper type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseVariant {
    pub status: StatusCode,
    pub media_type: Option<MediaType>,
    pub factory_name: String,
}

impl ResponseVariant {
    /// Factories take a body argument exactly when a media type is declared.
    pub fn takes_body(&self) -> bool {
        self.media_type.is_some()
    }
}

/// Response envelope surface a wrapper type extends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub flavor: EnvelopeFlavor,
    pub superclass: JavaType,
    pub status_type: JavaType,
    pub headers_type: JavaType,
}

/// How constructor bodies and status values are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeFlavor {
    /// Spring `ResponseEntity`: `super(body, headers, status)`, `HttpStatus.valueOf(code)`.
    ResponseEntity,
    /// JAX-RS `ResponseWrapper` support class: numeric status, static `build` helper.
    ResponseWrapper,
}

// =============================================================================
// Annotated impls
// =============================================================================

impl Annotated for ResourceInterface {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn describe(&self) -> String {
        format!("interface '{}'", self.name)
    }
}

impl Annotated for ResourceMethod {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn describe(&self) -> String {
        format!("method '{}'", self.name)
    }
}

impl Annotated for ParameterBinding {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    fn describe(&self) -> String {
        format!("parameter '{}'", self.wire_name)
    }
}
