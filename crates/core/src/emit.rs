//! Java source emission via the Emit trait.
//!
//! The engine never produces text; this module turns a finished
//! [`GeneratedApi`] into one source file per interface plus the support
//! classes the profile needs.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::ir::{
    Annotation, AttrValue, ConstructorShape, EnvelopeFlavor, GeneratedApi, JavaType,
    ParameterBinding, ResourceInterface, ResourceMethod, ResponseVariant, ResponseWrapperType,
    ReturnShape,
};
use crate::profile::{ProfileKind, RESPONSE_WRAPPER_CLASS};

const INDENT: &str = "    ";

/// Trait for emitting Java source from generated entities.
pub trait Emit {
    fn emit(&self) -> String;
}

/// One rendered source file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub relative_path: PathBuf,
    pub contents: String,
}

/// Render every interface of `api` plus the profile's support sources.
pub fn render_sources(api: &GeneratedApi, package: &str) -> Vec<SourceFile> {
    let mut files: Vec<SourceFile> = api
        .interfaces
        .iter()
        .map(|interface| SourceFile {
            relative_path: source_path(package, &interface.name),
            contents: render_interface(interface, package),
        })
        .collect();

    if api.profile == ProfileKind::JaxRs {
        files.push(SourceFile {
            relative_path: source_path(package, RESPONSE_WRAPPER_CLASS),
            contents: format!("{}{}", package_header(package), RESPONSE_WRAPPER_SOURCE),
        });
    }
    files
}

fn source_path(package: &str, type_name: &str) -> PathBuf {
    let mut path: PathBuf = package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect();
    path.push(format!("{type_name}.java"));
    path
}

fn package_header(package: &str) -> String {
    if package.is_empty() {
        String::new()
    } else {
        format!("package {package};\n\n")
    }
}

// =============================================================================
// Literals and annotations
// =============================================================================

fn java_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

impl Emit for AttrValue {
    fn emit(&self) -> String {
        match self {
            AttrValue::Str(s) => java_string(s),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Constant { owner, name } => format!("{}.{name}", owner.simple()),
            AttrValue::Array(items) if items.len() == 1 => items[0].emit(),
            AttrValue::Array(items) => {
                let items: Vec<_> = items.iter().map(Emit::emit).collect();
                format!("{{ {} }}", items.join(", "))
            }
        }
    }
}

impl Emit for Annotation {
    fn emit(&self) -> String {
        let name = self.kind.java_type().simple();
        let attributes: Vec<(&str, &AttrValue)> = self.attributes().collect();
        match attributes.as_slice() {
            [] => format!("@{name}"),
            [("value", value)] => format!("@{name}({})", value.emit()),
            _ => {
                let rendered: Vec<_> = attributes
                    .iter()
                    .map(|(key, value)| format!("{key} = {}", value.emit()))
                    .collect();
                format!("@{name}({})", rendered.join(", "))
            }
        }
    }
}

impl Emit for ParameterBinding {
    fn emit(&self) -> String {
        let mut out = String::new();
        for annotation in self.metadata.iter() {
            out.push_str(&annotation.emit());
            out.push(' ');
        }
        out.push_str(&format!("{} {}", self.java_type.simple(), self.name));
        out
    }
}

// =============================================================================
// Imports
// =============================================================================

fn collect_attr_imports(value: &AttrValue, imports: &mut BTreeSet<String>) {
    match value {
        AttrValue::Constant { owner, .. } => owner.collect_imports(imports),
        AttrValue::Array(items) => {
            for item in items {
                collect_attr_imports(item, imports);
            }
        }
        AttrValue::Str(_) | AttrValue::Bool(_) => {}
    }
}

fn collect_annotation_imports<'a>(
    annotations: impl Iterator<Item = &'a Annotation>,
    imports: &mut BTreeSet<String>,
) {
    for annotation in annotations {
        annotation.kind.java_type().collect_imports(imports);
        for (_, value) in annotation.attributes() {
            collect_attr_imports(value, imports);
        }
    }
}

/// Qualified names a rendered interface imports.
pub(crate) fn interface_imports(interface: &ResourceInterface) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    collect_annotation_imports(interface.metadata.iter(), &mut imports);
    for method in &interface.methods {
        collect_annotation_imports(method.metadata.iter(), &mut imports);
        for parameter in &method.parameters {
            collect_annotation_imports(parameter.metadata.iter(), &mut imports);
            parameter.java_type.collect_imports(&mut imports);
        }
        for throws in &method.throws {
            throws.collect_imports(&mut imports);
        }
        if let Some(wrapper) = method.wrapper() {
            wrapper.envelope.superclass.collect_imports(&mut imports);
            wrapper.envelope.status_type.collect_imports(&mut imports);
            wrapper.envelope.headers_type.collect_imports(&mut imports);
        }
    }
    imports
}

// =============================================================================
// Interfaces and methods
// =============================================================================

/// Text safe to place inside a `/** ... */` comment.
fn doc_text(text: &str) -> String {
    text.replace("*/", "* /")
}

fn javadoc(out: &mut String, indent: &str, description: Option<&str>, params: &[(&str, &str)]) {
    let lines: Vec<&str> = description
        .map(|d| d.trim().lines().collect())
        .unwrap_or_default();
    if lines.is_empty() && params.is_empty() {
        return;
    }
    out.push_str(&format!("{indent}/**\n"));
    for line in &lines {
        let text = doc_text(line.trim_end());
        if text.is_empty() {
            out.push_str(&format!("{indent} *\n"));
        } else {
            out.push_str(&format!("{indent} * {text}\n"));
        }
    }
    if !lines.is_empty() && !params.is_empty() {
        out.push_str(&format!("{indent} *\n"));
    }
    for (name, doc) in params {
        out.push_str(&format!("{indent} * @param {name} {}\n", doc_text(doc)));
    }
    out.push_str(&format!("{indent} */\n"));
}

/// Render a complete interface source file.
pub fn render_interface(interface: &ResourceInterface, package: &str) -> String {
    let mut out = package_header(package);

    let imports = interface_imports(interface);
    for import in &imports {
        out.push_str(&format!("import {import};\n"));
    }
    if !imports.is_empty() {
        out.push('\n');
    }

    javadoc(&mut out, "", interface.description.as_deref(), &[]);
    for annotation in interface.metadata.iter() {
        out.push_str(&annotation.emit());
        out.push('\n');
    }
    out.push_str(&format!("public interface {} {{\n", interface.name));

    for method in &interface.methods {
        out.push('\n');
        out.push_str(&method.emit());
        if let Some(wrapper) = method.wrapper() {
            out.push('\n');
            out.push_str(&wrapper.emit());
        }
    }

    out.push_str("}\n");
    out
}

impl Emit for ResourceMethod {
    fn emit(&self) -> String {
        let mut out = String::new();
        let param_docs: Vec<(&str, &str)> = self
            .parameters
            .iter()
            .filter_map(|p| p.description.as_deref().map(|d| (p.name.as_str(), d)))
            .collect();
        javadoc(&mut out, INDENT, self.description.as_deref(), &param_docs);

        for annotation in self.metadata.iter() {
            out.push_str(&format!("{INDENT}{}\n", annotation.emit()));
        }

        let return_type = match &self.return_shape {
            ReturnShape::Wrapper(wrapper) => wrapper.name.clone(),
            ReturnShape::Void | ReturnShape::Deferred { .. } => "void".to_string(),
        };
        let params: Vec<_> = self.parameters.iter().map(Emit::emit).collect();
        let throws = if self.throws.is_empty() {
            String::new()
        } else {
            let names: Vec<_> = self.throws.iter().map(JavaType::simple).collect();
            format!(" throws {}", names.join(", "))
        };
        out.push_str(&format!(
            "{INDENT}{return_type} {}({}){throws};\n",
            self.name,
            params.join(", ")
        ));
        out
    }
}

// =============================================================================
// Response wrappers
// =============================================================================

impl ResponseWrapperType {
    fn constructor(&self, shape: ConstructorShape) -> String {
        let envelope = &self.envelope;
        let status = format!("{} status", envelope.status_type.simple());
        let headers = format!("{} headers", envelope.headers_type.simple());
        let (params, call) = match (envelope.flavor, shape) {
            (EnvelopeFlavor::ResponseEntity, ConstructorShape::Status) => {
                (status, "super(status);".to_string())
            }
            (EnvelopeFlavor::ResponseEntity, ConstructorShape::StatusBody) => (
                format!("{status}, Object entity"),
                "super(entity, status);".to_string(),
            ),
            (EnvelopeFlavor::ResponseEntity, ConstructorShape::StatusBodyHeaders) => (
                format!("{status}, Object entity, {headers}"),
                "super(entity, headers, status);".to_string(),
            ),
            (EnvelopeFlavor::ResponseWrapper, ConstructorShape::Status) => {
                (status, "super(build(status, null, null));".to_string())
            }
            (EnvelopeFlavor::ResponseWrapper, ConstructorShape::StatusBody) => (
                format!("{status}, Object entity"),
                "super(build(status, entity, null));".to_string(),
            ),
            (EnvelopeFlavor::ResponseWrapper, ConstructorShape::StatusBodyHeaders) => (
                format!("{status}, Object entity, {headers}"),
                "super(build(status, entity, headers));".to_string(),
            ),
        };
        let inner = INDENT.repeat(2);
        let body = INDENT.repeat(3);
        format!(
            "{inner}private {}({params}) {{\n{body}{call}\n{inner}}}\n",
            self.name
        )
    }

    fn factory(&self, variant: &ResponseVariant) -> String {
        let status = match self.envelope.flavor {
            EnvelopeFlavor::ResponseEntity => format!(
                "{}.valueOf({})",
                self.envelope.status_type.simple(),
                variant.status.as_u16()
            ),
            EnvelopeFlavor::ResponseWrapper => variant.status.as_u16().to_string(),
        };
        let (params, args) = if variant.takes_body() {
            ("Object entity", format!("{status}, entity"))
        } else {
            ("", status)
        };
        let inner = INDENT.repeat(2);
        let body = INDENT.repeat(3);
        let mut out = String::new();
        if let Some(media_type) = &variant.media_type {
            out.push_str(&format!(
                "{inner}/** {} {} */\n",
                variant.status.as_u16(),
                doc_text(media_type.as_str())
            ));
        }
        out.push_str(&format!(
            "{inner}public static {name} {}({params}) {{\n{body}return new {name}({args});\n{inner}}}\n",
            variant.factory_name,
            name = self.name,
        ));
        out
    }
}

impl Emit for ResponseWrapperType {
    fn emit(&self) -> String {
        let mut out = format!(
            "{INDENT}class {} extends {} {{\n",
            self.name,
            self.envelope.superclass.simple()
        );
        for shape in &self.constructors {
            out.push('\n');
            out.push_str(&self.constructor(*shape));
        }
        for variant in &self.variants {
            out.push('\n');
            out.push_str(&self.factory(variant));
        }
        out.push_str(&format!("{INDENT}}}\n"));
        out
    }
}

const RESPONSE_WRAPPER_SOURCE: &str = r#"import java.lang.annotation.Annotation;
import java.net.URI;
import java.util.Date;
import java.util.Locale;
import java.util.Map;
import java.util.Set;
import javax.ws.rs.core.EntityTag;
import javax.ws.rs.core.GenericType;
import javax.ws.rs.core.Link;
import javax.ws.rs.core.MediaType;
import javax.ws.rs.core.MultivaluedMap;
import javax.ws.rs.core.NewCookie;
import javax.ws.rs.core.Response;

/**
 * Base type of generated response wrappers. Every call is forwarded to the
 * built response, so the runtime sees the declared status and headers.
 */
public class ResponseWrapper extends Response {

    private final Response delegate;

    protected ResponseWrapper(Response delegate) {
        this.delegate = delegate;
    }

    protected static Response build(int status, Object entity, MultivaluedMap<String, Object> headers) {
        Response.ResponseBuilder builder = Response.status(status);
        if (entity != null) {
            builder.entity(entity);
        }
        if (headers != null) {
            headers.forEach((name, values) -> values.forEach(value -> builder.header(name, value)));
        }
        return builder.build();
    }

    @Override
    public int getStatus() {
        return delegate.getStatus();
    }

    @Override
    public StatusType getStatusInfo() {
        return delegate.getStatusInfo();
    }

    @Override
    public Object getEntity() {
        return delegate.getEntity();
    }

    @Override
    public <T> T readEntity(Class<T> entityType) {
        return delegate.readEntity(entityType);
    }

    @Override
    public <T> T readEntity(GenericType<T> entityType) {
        return delegate.readEntity(entityType);
    }

    @Override
    public <T> T readEntity(Class<T> entityType, Annotation[] annotations) {
        return delegate.readEntity(entityType, annotations);
    }

    @Override
    public <T> T readEntity(GenericType<T> entityType, Annotation[] annotations) {
        return delegate.readEntity(entityType, annotations);
    }

    @Override
    public boolean hasEntity() {
        return delegate.hasEntity();
    }

    @Override
    public boolean bufferEntity() {
        return delegate.bufferEntity();
    }

    @Override
    public void close() {
        delegate.close();
    }

    @Override
    public MediaType getMediaType() {
        return delegate.getMediaType();
    }

    @Override
    public Locale getLanguage() {
        return delegate.getLanguage();
    }

    @Override
    public int getLength() {
        return delegate.getLength();
    }

    @Override
    public Set<String> getAllowedMethods() {
        return delegate.getAllowedMethods();
    }

    @Override
    public Map<String, NewCookie> getCookies() {
        return delegate.getCookies();
    }

    @Override
    public EntityTag getEntityTag() {
        return delegate.getEntityTag();
    }

    @Override
    public Date getDate() {
        return delegate.getDate();
    }

    @Override
    public Date getLastModified() {
        return delegate.getLastModified();
    }

    @Override
    public URI getLocation() {
        return delegate.getLocation();
    }

    @Override
    public Set<Link> getLinks() {
        return delegate.getLinks();
    }

    @Override
    public boolean hasLink(String relation) {
        return delegate.hasLink(relation);
    }

    @Override
    public Link getLink(String relation) {
        return delegate.getLink(relation);
    }

    @Override
    public Link.Builder getLinkBuilder(String relation) {
        return delegate.getLinkBuilder(relation);
    }

    @Override
    public MultivaluedMap<String, Object> getMetadata() {
        return delegate.getMetadata();
    }

    @Override
    public MultivaluedMap<String, String> getStringHeaders() {
        return delegate.getStringHeaders();
    }

    @Override
    public String getHeaderString(String name) {
        return delegate.getHeaderString(name);
    }
}
"#;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use http::StatusCode;
    use resgen_model::{HttpVerb, MediaType};

    use super::*;
    use crate::ir::AnnotationKind;
    use crate::profile::RoutingProfile;

    fn wrapper(profile: &dyn RoutingProfile) -> ResponseWrapperType {
        ResponseWrapperType {
            name: "GetResponse".into(),
            envelope: profile.envelope(),
            constructors: ConstructorShape::ALL.to_vec(),
            variants: vec![
                ResponseVariant {
                    status: StatusCode::OK,
                    media_type: Some(MediaType::new("application/json")),
                    factory_name: "withJsonOK".into(),
                },
                ResponseVariant {
                    status: StatusCode::NOT_FOUND,
                    media_type: None,
                    factory_name: "withNotFound".into(),
                },
            ],
        }
    }

    #[test]
    fn test_annotation_forms() {
        let mut annotation = Annotation::new(AnnotationKind::RestController);
        assert_eq!(annotation.emit(), "@RestController");

        annotation = Annotation::new(AnnotationKind::PathParam);
        annotation.set("value", AttrValue::Str("id".into()));
        assert_eq!(annotation.emit(), "@PathParam(\"id\")");

        annotation = Annotation::new(AnnotationKind::RequestParam);
        annotation
            .set("value", AttrValue::Str("q".into()))
            .set("required", AttrValue::Bool(false));
        assert_eq!(annotation.emit(), "@RequestParam(value = \"q\", required = false)");
    }

    #[test]
    fn test_array_values() {
        let value = AttrValue::Array(vec![
            AttrValue::Str("application/json".into()),
            AttrValue::Str("text/\"x\"".into()),
        ]);
        assert_eq!(value.emit(), r#"{ "application/json", "text/\"x\"" }"#);
    }

    #[test]
    fn test_spring_wrapper_uses_declared_status() {
        let source = wrapper(ProfileKind::SpringMvc.profile()).emit();
        assert!(source.contains("class GetResponse extends ResponseEntity<Object> {"));
        assert!(source.contains("private GetResponse(HttpStatus status) {"));
        assert!(source.contains("super(entity, headers, status);"));
        assert!(source.contains("public static GetResponse withJsonOK(Object entity) {"));
        assert!(source.contains("return new GetResponse(HttpStatus.valueOf(200), entity);"));
        assert!(source.contains("public static GetResponse withNotFound() {"));
        assert!(source.contains("return new GetResponse(HttpStatus.valueOf(404));"));
        assert!(!source.contains("HttpStatus.OK"));
    }

    #[test]
    fn test_jaxrs_wrapper_uses_build_helper() {
        let source = wrapper(ProfileKind::JaxRs.profile()).emit();
        assert!(source.contains("class GetResponse extends ResponseWrapper {"));
        assert!(source.contains("super(build(status, entity, null));"));
        assert!(source.contains("return new GetResponse(404);"));
    }

    #[test]
    fn test_interface_source() {
        let mut method = ResourceMethod::new("get".into(), HttpVerb::Get, "/users".into());
        method.description = Some("List users.".into());
        method
            .metadata
            .entry(AnnotationKind::Verb(HttpVerb::Get));
        method.return_shape = ReturnShape::Wrapper(Box::new(wrapper(ProfileKind::JaxRs.profile())));
        method
            .throws
            .push(JavaType::qualified("java.io.IOException"));

        let mut interface = ResourceInterface::new("Users".into(), "/users".into());
        interface
            .metadata
            .entry(AnnotationKind::Path)
            .set("value", AttrValue::Str("/users".into()));
        interface.methods.push(method);

        let source = render_interface(&interface, "com.acme");
        assert!(source.starts_with("package com.acme;\n\n"));
        assert!(source.contains("import java.io.IOException;\n"));
        assert!(source.contains("import javax.ws.rs.GET;\n"));
        assert!(source.contains("import javax.ws.rs.core.MultivaluedMap;\n"));
        assert!(source.contains("@Path(\"/users\")\npublic interface Users {\n"));
        assert!(source.contains("    /**\n     * List users.\n     */\n"));
        assert!(source.contains("    GetResponse get() throws IOException;\n"));
        assert!(source.ends_with("}\n"));
    }

    #[test]
    fn test_render_sources_paths() {
        let api = GeneratedApi {
            profile: ProfileKind::JaxRs,
            interfaces: vec![ResourceInterface::new("Root".into(), "/".into())],
        };
        let files = render_sources(&api, "com.acme.api");
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.clone()).collect();
        assert_eq!(
            paths,
            [
                PathBuf::from("com/acme/api/Root.java"),
                PathBuf::from("com/acme/api/ResponseWrapper.java"),
            ]
        );
        assert!(files[1].contents.starts_with("package com.acme.api;\n\nimport"));
    }

    #[test]
    fn test_wildcard_media_type_keeps_factory_comment_closed() {
        let mut wrapper = wrapper(ProfileKind::SpringMvc.profile());
        wrapper.variants = vec![ResponseVariant {
            status: StatusCode::OK,
            media_type: Some(MediaType::new("*/*")),
            factory_name: "withOK".into(),
        }];
        let source = wrapper.emit();
        assert!(source.contains("        /** 200 * /* */\n"));
        let comment_line = source.lines().find(|l| l.contains("/** 200")).unwrap();
        assert_eq!(comment_line.matches("*/").count(), 1);
        assert!(comment_line.ends_with("*/"));
    }

    #[test]
    fn test_response_wrapper_support_class_is_a_response() {
        let api = GeneratedApi {
            profile: ProfileKind::JaxRs,
            interfaces: Vec::new(),
        };
        let files = render_sources(&api, "com.acme");
        let support = &files[0].contents;
        assert!(support.contains("public class ResponseWrapper extends Response {"));
        assert!(support.contains("import javax.ws.rs.core.Response;\n"));
        assert!(support.contains("public int getStatus() {\n        return delegate.getStatus();"));
        assert!(support.contains("public MultivaluedMap<String, Object> getMetadata() {"));
        assert!(support.contains("public String getHeaderString(String name) {"));
    }
}
