//! Identifier derivation for generated interfaces, methods, and factories.
//!
//! Every function here is pure: equal input gives equal output, in any
//! process, on any run. Outputs are valid Java identifiers.

use std::collections::HashSet;
use std::sync::LazyLock;

use http::StatusCode;
use resgen_model::{Action, MediaType};

/// Java reserved words and literals that cannot be used as identifiers.
pub static JAVA_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "abstract",
        "assert",
        "boolean",
        "break",
        "byte",
        "case",
        "catch",
        "char",
        "class",
        "const",
        "continue",
        "default",
        "do",
        "double",
        "else",
        "enum",
        "extends",
        "final",
        "finally",
        "float",
        "for",
        "goto",
        "if",
        "implements",
        "import",
        "instanceof",
        "int",
        "interface",
        "long",
        "native",
        "new",
        "package",
        "private",
        "protected",
        "public",
        "return",
        "short",
        "static",
        "strictfp",
        "super",
        "switch",
        "synchronized",
        "this",
        "throw",
        "throws",
        "transient",
        "try",
        "void",
        "volatile",
        "while",
        "true",
        "false",
        "null",
        "var",
        "record",
        "yield",
    ]
    .into_iter()
    .collect()
});

/// Name used for the resource at the root path.
const ROOT_INTERFACE_NAME: &str = "Root";

/// Suffix used when a media type has no usable characters at all.
const ANY_MEDIA_INFIX: &str = "Any";

/// Interface name for a resource, from the segments of its full path.
///
/// `/users/{id}` becomes `UsersId`; the root path becomes `Root`.
pub fn interface_name(resource_path: &str) -> String {
    let name = java_friendly_name(resource_path);
    if name.is_empty() {
        return ROOT_INTERFACE_NAME.to_string();
    }
    guard_identifier(name)
}

/// Method name for one pass over an action.
///
/// The base is the action's explicit name when it has one, otherwise the
/// lower-case verb. A media type appends its sanitized subtype (`postJson`).
pub fn method_name(action: &Action, media_type: Option<&MediaType>) -> String {
    let base = action
        .name
        .as_deref()
        .map(variable_name)
        .filter(|name| !name.is_empty() && name != "_empty")
        .unwrap_or_else(|| action.verb.as_lower().to_string());

    match media_type {
        Some(media_type) => guard_identifier(format!("{base}{}", media_type_infix(media_type))),
        None => guard_identifier(base),
    }
}

/// Factory name for one (status, media type) pair of a response table.
///
/// `404` without a body gives `withNotFound`; `200` with `application/json`
/// gives `withJsonOK`.
pub fn response_factory_name(status: StatusCode, media_type: Option<&MediaType>) -> String {
    let infix = media_type.map(media_type_infix).unwrap_or_default();
    let status_name = status
        .canonical_reason()
        .map(java_friendly_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Status{}", status.as_u16()));
    format!("with{infix}{status_name}")
}

/// Name of the wrapper type returned by a method (`getJson` → `GetJsonResponse`).
pub fn response_type_name(method_name: &str) -> String {
    format!("{}Response", capitalize_first(method_name))
}

/// Lower-camel variable name for parameters and injected holders.
///
/// - Splits on any non-alphanumeric character and joins as camelCase
/// - Prepends `_` if the result starts with a digit
/// - Prepends `_` to reserved words
pub fn variable_name(name: &str) -> String {
    let friendly = java_friendly_name(name);
    if friendly.is_empty() {
        return "_empty".to_string();
    }
    guard_identifier(lowercase_first(&friendly))
}

/// Media type suffix: the subtype with any `x-` prefix removed (`Json`, `WwwFormUrlencoded`).
pub fn media_type_infix(media_type: &MediaType) -> String {
    let subtype = media_type.subtype().to_ascii_lowercase();
    let subtype = subtype.strip_prefix("x-").unwrap_or(&subtype);
    let infix = java_friendly_name(subtype);
    if !infix.is_empty() {
        return infix;
    }
    let whole = java_friendly_name(media_type.as_str());
    if whole.is_empty() {
        ANY_MEDIA_INFIX.to_string()
    } else {
        whole
    }
}

/// Split on anything that is not an ASCII letter or digit and capitalize each word.
///
/// `/users/{user_id}` → `UsersUserId`, `application/vnd.api+json` → `ApplicationVndApiJson`.
pub fn java_friendly_name(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect()
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Make an already-sanitized name safe: no leading digit, no reserved word.
fn guard_identifier(name: String) -> String {
    if name.chars().next().is_some_and(|c| c.is_ascii_digit())
        || JAVA_RESERVED_WORDS.contains(name.as_str())
    {
        format!("_{name}")
    } else {
        name
    }
}

/// Whether `name` is a valid Java identifier that is not a reserved word.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !JAVA_RESERVED_WORDS.contains(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use resgen_model::HttpVerb;

    fn action(verb: HttpVerb) -> Action {
        Action::new(verb)
    }

    #[test]
    fn test_interface_name() {
        assert_eq!(interface_name("/users/{id}"), "UsersId");
        assert_eq!(interface_name("/users/{user_id}/orders"), "UsersUserIdOrders");
        assert_eq!(interface_name("/"), "Root");
        assert_eq!(interface_name(""), "Root");
        assert_eq!(interface_name("/2fa"), "_2fa");
        assert_eq!(interface_name("/api-keys"), "ApiKeys");
    }

    #[test]
    fn test_method_name_from_verb() {
        assert_eq!(method_name(&action(HttpVerb::Get), None), "get");
        assert_eq!(method_name(&action(HttpVerb::Delete), None), "delete");
        assert_eq!(
            method_name(
                &action(HttpVerb::Post),
                Some(&MediaType::new("application/json"))
            ),
            "postJson"
        );
        assert_eq!(
            method_name(
                &action(HttpVerb::Post),
                Some(&MediaType::new("application/x-www-form-urlencoded"))
            ),
            "postWwwFormUrlencoded"
        );
    }

    #[test]
    fn test_method_name_from_explicit_name() {
        let mut named = action(HttpVerb::Get);
        named.name = Some("list-users".into());
        assert_eq!(method_name(&named, None), "listUsers");

        named.name = Some("class".into());
        assert_eq!(method_name(&named, None), "_class");

        named.name = Some("---".into());
        assert_eq!(method_name(&named, None), "get");
    }

    #[test]
    fn test_media_suffix_never_empty() {
        let plain = method_name(&action(HttpVerb::Put), None);
        let any = method_name(&action(HttpVerb::Put), Some(&MediaType::new("*/*")));
        assert_ne!(plain, any);
        assert_eq!(any, "putAny");
    }

    #[test]
    fn test_response_factory_name() {
        assert_eq!(
            response_factory_name(StatusCode::OK, Some(&MediaType::new("application/json"))),
            "withJsonOK"
        );
        assert_eq!(
            response_factory_name(StatusCode::NOT_FOUND, None),
            "withNotFound"
        );
        assert_eq!(
            response_factory_name(StatusCode::CREATED, Some(&MediaType::new("text/xml"))),
            "withXmlCreated"
        );
        let unnamed = StatusCode::from_u16(299).unwrap();
        assert_eq!(response_factory_name(unnamed, None), "withStatus299");
    }

    #[test]
    fn test_response_type_name() {
        assert_eq!(response_type_name("getJson"), "GetJsonResponse");
        assert_eq!(response_type_name("_class"), "_classResponse");
    }

    #[test]
    fn test_variable_name() {
        assert_eq!(variable_name("async-callback"), "asyncCallback");
        assert_eq!(variable_name("X-Request-Id"), "xRequestId");
        assert_eq!(variable_name("user_id"), "userId");
        assert_eq!(variable_name("9lives"), "_9lives");
        assert_eq!(variable_name("new"), "_new");
        assert_eq!(variable_name(""), "_empty");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("getJson"));
        assert!(is_valid_identifier("_9"));
        assert!(!is_valid_identifier("9a"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier("static"));
        assert!(!is_valid_identifier(""));
    }
}
