//! End-to-end generation over a small store API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::StatusCode;
use resgen_core::error::BindError;
use resgen_core::ir::{AnnotationKind, AttrValue, JavaType, ParameterBinding, ReturnShape};
use resgen_core::{
    ExtensionHookRegistry, GenerateError, GeneratorConfig, NameKind, Origin, ProfileKind, emit,
    generate, generate_profiles,
};
use resgen_model::{ApiDescription, HttpVerb, MediaType, ParamLocation, Parameter};

const STORE: &str = include_str!("fixtures/store.json");

fn store() -> ApiDescription {
    ApiDescription::from_json(STORE).unwrap()
}

fn config(profile: ProfileKind) -> GeneratorConfig {
    GeneratorConfig {
        profile,
        ..GeneratorConfig::default()
    }
}

fn run(
    api: &ApiDescription,
    config: &GeneratorConfig,
) -> Result<resgen_core::GeneratedApi, GenerateError> {
    generate(api, config, &ExtensionHookRegistry::new())
}

#[test]
fn test_interfaces_in_depth_first_order() {
    let generated = run(&store(), &config(ProfileKind::SpringMvc)).unwrap();
    let names: Vec<_> = generated.interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Users", "UsersId", "UsersUserIdOrders", "Orders"]);
}

#[test]
fn test_resource_without_actions_yields_empty_interface() {
    let generated = run(&store(), &config(ProfileKind::JaxRs)).unwrap();
    let interface = generated.interface_for_path("/users/{id}").unwrap();
    assert!(interface.methods.is_empty());
    assert_eq!(interface.path, "/users/{id}");
    let path = interface.metadata.get(&AnnotationKind::Path).unwrap();
    assert_eq!(path.get("value"), Some(&AttrValue::Str("/users/{id}".into())));
}

#[test]
fn test_get_with_body_and_bodiless_responses() {
    let generated = run(&store(), &config(ProfileKind::SpringMvc)).unwrap();
    let get = generated.interface("Users").unwrap().method("get").unwrap();

    let wrapper = get.wrapper().unwrap();
    assert_eq!(wrapper.name, "GetResponse");
    assert_eq!(wrapper.variants.len(), 2);
    let ok = wrapper.variant("withJsonOK").unwrap();
    assert!(ok.takes_body());
    assert_eq!(ok.status, StatusCode::OK);
    let not_found = wrapper.variant("withNotFound").unwrap();
    assert!(!not_found.takes_body());
    assert_eq!(not_found.status, StatusCode::NOT_FOUND);

    assert_eq!(get.produces, [MediaType::new("application/json")]);
    assert_eq!(get.description.as_deref(), Some("List users."));
}

#[test]
fn test_declared_parameters_bind_with_defaults() {
    let generated = run(&store(), &config(ProfileKind::SpringMvc)).unwrap();
    let get = generated.interface("Users").unwrap().method("get").unwrap();

    let limit = get.parameter("limit").unwrap();
    assert_eq!(limit.location, Some(ParamLocation::Query));
    assert_eq!(limit.java_type.simple(), "Long");
    assert_eq!(limit.default_value.as_deref(), Some("20"));
    let annotation = limit.metadata.get(&AnnotationKind::RequestParam).unwrap();
    assert_eq!(annotation.get("defaultValue"), Some(&AttrValue::Str("20".into())));

    let request_id = get.parameter("xRequestId").unwrap();
    assert_eq!(request_id.wire_name, "X-Request-Id");
    assert!(request_id.metadata.contains(&AnnotationKind::RequestHeader));
}

#[test]
fn test_post_with_two_body_media_types() {
    let generated = run(&store(), &config(ProfileKind::JaxRs)).unwrap();
    let users = generated.interface("Users").unwrap();

    let json = users.method("postJson").unwrap();
    let xml = users.method("postXml").unwrap();
    for method in [json, xml] {
        assert_eq!(method.verb, HttpVerb::Post);
        assert_eq!(method.path, "/users");
        assert!(method.metadata.contains(&AnnotationKind::Verb(HttpVerb::Post)));
        let entity = method.parameter("entity").unwrap();
        assert_eq!(entity.java_type, JavaType::local("User"));
        // 201 without a body: void under the default configuration.
        assert_eq!(method.return_shape, ReturnShape::Void);
    }
    assert_eq!(json.consumes, [MediaType::new("application/json")]);
    assert_eq!(xml.consumes, [MediaType::new("application/xml")]);
    assert!(users.method("post").is_none());
}

#[test]
fn test_bodiless_action_gets_wrapper_when_void_disabled() {
    let mut config = config(ProfileKind::SpringMvc);
    config.empty_response_return_void = false;
    let generated = run(&store(), &config).unwrap();
    let post = generated.interface("Users").unwrap().method("postJson").unwrap();

    let wrapper = post.wrapper().unwrap();
    assert_eq!(wrapper.variants.len(), 1);
    assert_eq!(wrapper.variants[0].factory_name, "withCreated");
    assert_eq!(wrapper.variants[0].status, StatusCode::CREATED);
}

#[test]
fn test_uri_parameters_inherit_and_template_vars_bind() {
    let generated = run(&store(), &config(ProfileKind::JaxRs)).unwrap();
    let get = generated
        .interface("UsersUserIdOrders")
        .unwrap()
        .method("get")
        .unwrap();

    let user_id = get.parameter("userId").unwrap();
    assert_eq!(user_id.location, Some(ParamLocation::Path));
    assert_eq!(user_id.java_type.simple(), "Long");
    assert!(user_id.required);
    assert_eq!(user_id.description.as_deref(), Some("Owner."));
    assert!(user_id.metadata.contains(&AnnotationKind::PathParam));
}

#[test]
fn test_deferred_response() {
    let mut config = config(ProfileKind::JaxRs);
    config.deferred_response_trait = Some("async-callback".into());
    let generated = run(&store(), &config).unwrap();
    let get = generated.interface("Orders").unwrap().method("get").unwrap();

    assert!(get.return_shape.is_void());
    assert!(get.wrapper().is_none());
    assert_eq!(
        get.return_shape,
        ReturnShape::Deferred {
            holder: "asyncCallback".into()
        }
    );
    assert_eq!(get.parameters.len(), 1);
    let holder = get.parameter("asyncCallback").unwrap();
    assert_eq!(holder.location, None);
    assert!(holder.metadata.contains(&AnnotationKind::Suspended));
}

#[test]
fn test_deferred_trait_not_configured_keeps_wrapper() {
    let generated = run(&store(), &config(ProfileKind::JaxRs)).unwrap();
    let get = generated.interface("Orders").unwrap().method("get").unwrap();
    assert!(get.wrapper().is_some());
    assert!(get.parameters.is_empty());
}

#[test]
fn test_form_body_binds_form_parameters() {
    let generated = run(&store(), &config(ProfileKind::SpringMvc)).unwrap();
    let put = generated.interface("Orders").unwrap().method("put").unwrap();

    assert_eq!(put.parameters.len(), 1);
    let note = put.parameter("note").unwrap();
    assert_eq!(note.location, Some(ParamLocation::Form));
    assert!(note.required);
    assert!(put.parameter("entity").is_none());
    assert_eq!(
        put.consumes,
        [MediaType::new("application/x-www-form-urlencoded")]
    );
}

#[test]
fn test_method_throws_from_config() {
    let mut config = config(ProfileKind::SpringMvc);
    config.method_throws = Some("java.io.IOException".into());
    let generated = run(&store(), &config).unwrap();
    for interface in &generated.interfaces {
        for method in &interface.methods {
            assert_eq!(method.throws, [JavaType::qualified("java.io.IOException")]);
        }
    }
}

#[test]
fn test_method_name_collision_is_reported() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/items",
            "actions": [
              { "verb": "get", "name": "fetch" },
              { "verb": "delete", "name": "fetch" }
            ]
          }]
        }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::SpringMvc)).unwrap_err();
    match err {
        GenerateError::NamingCollision {
            origin,
            kind,
            name,
            scope,
        } => {
            assert_eq!(kind, NameKind::Method);
            assert_eq!(name, "fetch");
            assert_eq!(scope, "Items");
            assert_eq!(origin.verb, Some(HttpVerb::Delete));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_media_types_with_same_subtype_collide() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/items",
            "actions": [{
              "verb": "post",
              "body": [{ "mediaType": "application/json" }, { "mediaType": "text/json" }]
            }]
          }]
        }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::JaxRs)).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::NamingCollision {
            kind: NameKind::Method,
            ..
        }
    ));
    assert_eq!(err.origin().media_type, Some(MediaType::new("text/json")));
}

#[test]
fn test_interface_name_collision_is_reported() {
    let api = ApiDescription::from_json(
        r#"{ "resources": [{ "path": "/api-keys" }, { "path": "/api_keys" }] }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::SpringMvc)).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::NamingCollision {
            kind: NameKind::Interface,
            ..
        }
    ));
}

#[test]
fn test_wrapper_named_like_its_interface_is_reported() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/get-response",
            "actions": [{
              "verb": "get",
              "responses": [{ "status": 200, "body": [{ "mediaType": "application/json" }] }]
            }]
          }]
        }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::SpringMvc)).unwrap_err();
    match err {
        GenerateError::NamingCollision {
            origin,
            kind,
            name,
            scope,
        } => {
            assert_eq!(kind, NameKind::Type);
            assert_eq!(name, "GetResponse");
            assert_eq!(scope, "GetResponse");
            assert_eq!(origin.verb, Some(HttpVerb::Get));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_schema_type_shadowed_by_import_is_reported() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/routes",
            "actions": [{
              "verb": "post",
              "body": [{ "mediaType": "application/json", "schema": "Path" }]
            }]
          }]
        }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::JaxRs)).unwrap_err();
    match &err {
        GenerateError::NamingCollision { kind, name, scope, .. } => {
            assert_eq!(*kind, NameKind::Type);
            assert_eq!(name, "Path");
            assert!(scope.contains("javax.ws.rs.Path"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.origin().verb, Some(HttpVerb::Post));

    // Spring imports no `Path`, so the same schema binds there.
    let generated = run(&api, &config(ProfileKind::SpringMvc)).unwrap();
    let post = generated.interface("Routes").unwrap().method("post").unwrap();
    assert_eq!(post.parameter("entity").unwrap().java_type, JavaType::local("Path"));
}

#[test]
fn test_interface_named_like_support_class_is_reported() {
    let api =
        ApiDescription::from_json(r#"{ "resources": [{ "path": "/response-wrapper" }] }"#).unwrap();

    let err = run(&api, &config(ProfileKind::JaxRs)).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::NamingCollision {
            kind: NameKind::Interface,
            ..
        }
    ));
    assert!(run(&api, &config(ProfileKind::SpringMvc)).is_ok());
}

#[test]
fn test_wildcard_response_renders_closed_comments() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/files",
            "actions": [{
              "verb": "get",
              "responses": [{ "status": 200, "body": [{ "mediaType": "*/*" }] }]
            }]
          }]
        }"#,
    )
    .unwrap();

    let generated = run(&api, &config(ProfileKind::SpringMvc)).unwrap();
    let files = emit::render_sources(&generated, "com.example.api");
    let source = &files[0].contents;
    assert!(source.contains("/** 200 * /* */"));
    for line in source.lines().filter(|l| l.contains("/**")) {
        assert_eq!(line.matches("*/").count(), 1, "unbalanced comment: {line}");
    }
}

#[test]
fn test_unknown_status_fails_validation() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/items",
            "actions": [{ "verb": "get", "responses": [{ "status": "2xx" }] }]
          }]
        }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::SpringMvc)).unwrap_err();
    assert!(matches!(err, GenerateError::Validation { .. }));
    assert_eq!(err.origin().resource, "/items");
    assert_eq!(err.origin().verb, Some(HttpVerb::Get));
}

#[test]
fn test_duplicate_parameter_names_fail_validation() {
    let api = ApiDescription::from_json(
        r#"{
          "resources": [{
            "path": "/items/{id}",
            "actions": [{ "verb": "get", "parameters": [{ "name": "id", "in": "query" }] }]
          }]
        }"#,
    )
    .unwrap();

    let err = run(&api, &config(ProfileKind::JaxRs)).unwrap_err();
    assert!(err.to_string().contains("parameter name 'id' is used twice"));
}

#[test]
fn test_default_on_unbound_parameter_is_contract_violation() {
    let param = Parameter::new("limit", ParamLocation::Query);
    let mut binding = ParameterBinding::from_parameter(&param, ParamLocation::Query);

    for kind in ProfileKind::ALL {
        let err = kind
            .profile()
            .bind_default(&mut binding, Some("10"))
            .unwrap_err();
        assert!(matches!(err, BindError::MissingMetadata { .. }));
        let err = err.at(Origin::resource("/items").with_verb(HttpVerb::Get));
        assert!(matches!(err, GenerateError::ContractViolation { .. }));
    }
}

#[test]
fn test_profiles_run_in_parallel_and_keep_order() {
    let api = ApiDescription::from_json(
        r#"{ "resources": [{ "path": "/debug", "actions": [{ "verb": "trace" }] }] }"#,
    )
    .unwrap();

    let results = generate_profiles(
        &api,
        &GeneratorConfig::default(),
        &ProfileKind::ALL,
        &ExtensionHookRegistry::new(),
    );

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, ProfileKind::SpringMvc);
    assert!(results[0].1.is_ok());
    assert_eq!(results[1].0, ProfileKind::JaxRs);
    assert!(matches!(results[1].1, Err(GenerateError::Validation { .. })));
}

#[test]
fn test_generation_is_deterministic() {
    let api = store();
    let config = config(ProfileKind::SpringMvc);
    let first = emit::render_sources(&run(&api, &config).unwrap(), &config.package);
    let second = emit::render_sources(&run(&api, &config).unwrap(), &config.package);
    assert_eq!(first, second);
}

#[test]
fn test_rendered_spring_source() {
    let config = config(ProfileKind::SpringMvc);
    let generated = run(&store(), &config).unwrap();
    let files = emit::render_sources(&generated, &config.package);

    assert_eq!(files.len(), 4);
    let users = files
        .iter()
        .find(|f| f.relative_path.ends_with("Users.java"))
        .unwrap();
    assert!(users.relative_path.starts_with("com/example/api"));
    let source = &users.contents;
    assert!(source.contains("import org.springframework.web.bind.annotation.RestController;"));
    assert!(source.contains("@RequestMapping(\"/users\")\npublic interface Users {"));
    assert!(source.contains("@RequestMapping(method = RequestMethod.GET, produces = \"application/json\")"));
    assert!(source.contains(
        "GetResponse get(@RequestParam(value = \"limit\", required = false, defaultValue = \"20\") Long limit"
    ));
    assert!(source.contains("void postJson(@RequestBody User entity);"));
    assert!(source.contains("return new GetResponse(HttpStatus.valueOf(404));"));
}

#[test]
fn test_rendered_jaxrs_sources_include_support_class() {
    let config = config(ProfileKind::JaxRs);
    let generated = run(&store(), &config).unwrap();
    let files = emit::render_sources(&generated, &config.package);

    assert_eq!(files.len(), 5);
    assert!(
        files
            .iter()
            .any(|f| f.relative_path.ends_with("ResponseWrapper.java"))
    );
    let orders = files
        .iter()
        .find(|f| f.relative_path.ends_with("Orders.java"))
        .unwrap();
    assert!(orders.contents.contains("@PUT\n"));
    assert!(orders.contents.contains("@Consumes(\"application/x-www-form-urlencoded\")"));
    assert!(orders.contents.contains("void put(@FormParam(\"note\") String note);"));
}
