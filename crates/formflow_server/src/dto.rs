//! Request and response bodies of the HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn empty_object() -> Value {
    Value::Object(Map::new())
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub yaml: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTemplate {
    pub id: String,
    pub yaml: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateObjectRequest {
    pub doc: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ObjectResponse {
    pub id: String,
    pub doc: Value,
}

/// Operations stay raw so malformed ones become a patch error, not a 400 from
/// the extractor.
#[derive(Debug, Deserialize)]
pub struct ApplyPatchRequest {
    pub patch: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "empty_object")]
    pub initial: Value,
}

#[derive(Debug, Deserialize)]
pub struct RenameConversationRequest {
    pub title: String,
}
