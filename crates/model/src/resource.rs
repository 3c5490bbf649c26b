//! API description structs for serde deserialization.
//!
//! The shape mirrors a RAML-style resource tree: resources nest, each
//! resource carries actions keyed by verb, actions carry request-body
//! variants and a response table keyed by status code.

use serde::{Deserialize, Deserializer};

use crate::verb::{HttpVerb, ParamLocation};

/// Root of an API description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDescription {
    pub title: Option<String>,
    pub base_uri: Option<String>,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

/// A node in the resource tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    /// Path segment relative to the parent resource (e.g. "/users/{id}").
    #[serde(rename = "path")]
    pub relative_uri: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// Declared URI template parameters; always bound at `path`.
    #[serde(default)]
    pub uri_parameters: Vec<Parameter>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

/// An HTTP verb attached to a resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub verb: HttpVerb,
    /// Explicit operation name overriding the verb-derived method name.
    pub name: Option<String>,
    pub description: Option<String>,
    /// Declared trait names.
    #[serde(default, rename = "is")]
    pub traits: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request-body variants in declaration order.
    #[serde(default)]
    pub body: Vec<BodyVariant>,
    /// Response table in declaration order.
    #[serde(default)]
    pub responses: Vec<Response>,
}

/// One request-body media type of an action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyVariant {
    pub media_type: MediaType,
    pub schema: Option<String>,
    /// Form fields; always bound at `form`.
    #[serde(default)]
    pub form_parameters: Vec<Parameter>,
}

/// One entry of an action's response table.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Status-code token exactly as declared ("200", "404").
    #[serde(deserialize_with = "status_token")]
    pub status: String,
    pub description: Option<String>,
    /// Media-type variants; empty means no body.
    #[serde(default)]
    pub body: Vec<ResponseBody>,
}

/// One media-type variant of a response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub media_type: MediaType,
    pub schema: Option<String>,
}

/// A named request parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "in")]
    pub location: ParamLocation,
    #[serde(default)]
    pub required: bool,
    pub default: Option<String>,
    #[serde(default, rename = "type")]
    pub param_type: ParamType,
    pub description: Option<String>,
}

/// Declared scalar type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Date,
    File,
    #[serde(other)]
    Unknown,
}

/// A media type such as `application/json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after `/`, without parameters (`json` for `application/json; charset=utf-8`).
    pub fn subtype(&self) -> &str {
        let essence = self.0.split(';').next().unwrap_or_default().trim();
        essence.split_once('/').map_or(essence, |(_, sub)| sub)
    }

    /// Whether the body is carried as form fields rather than an entity.
    pub fn is_form(&self) -> bool {
        let essence = self.0.split(';').next().unwrap_or_default().trim();
        essence.eq_ignore_ascii_case("application/x-www-form-urlencoded")
            || essence.eq_ignore_ascii_case("multipart/form-data")
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Parameter {
    /// Shorthand used by builders and tests.
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            default: None,
            param_type: ParamType::String,
            description: None,
        }
    }
}

impl Action {
    pub fn new(verb: HttpVerb) -> Self {
        Self {
            verb,
            name: None,
            description: None,
            traits: Vec::new(),
            parameters: Vec::new(),
            body: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// Whether the action declares the named trait.
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t == name)
    }

    /// Distinct response media types across all responses, first occurrence wins.
    pub fn response_media_types(&self) -> Vec<&MediaType> {
        let mut unique: Vec<&MediaType> = Vec::new();
        for body in self.responses.iter().flat_map(|r| &r.body) {
            if !unique.contains(&&body.media_type) {
                unique.push(&body.media_type);
            }
        }
        unique
    }
}

impl ApiResource {
    pub fn new(relative_uri: impl Into<String>) -> Self {
        Self {
            relative_uri: relative_uri.into(),
            ..Self::default()
        }
    }
}

/// Accept status codes written either as strings or as bare integers.
fn status_token<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Token {
        Int(i64),
        Str(String),
    }

    Ok(match Token::deserialize(deserializer)? {
        Token::Int(code) => code.to_string(),
        Token::Str(token) => token,
    })
}
