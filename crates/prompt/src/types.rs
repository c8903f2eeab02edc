//! Prompt types.

use serde::{Deserialize, Serialize};

/// An answer prompt loaded from YAML.
///
/// ```yaml
/// id: answer.strict
/// title: Strict grounded answer
/// apiVersion: "1.0"
/// template: |
///   Context:
///   {{context}}
///
///   Question:
///   {{question}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Handlebars template with `context` and `question` slots
    pub template: String,
}

/// Values substituted into an answer prompt.
#[derive(Debug, Clone, Serialize)]
pub struct PromptSlots<'a> {
    pub context: &'a str,
    pub question: &'a str,
}
