//! Wire types shared by the HTTP and MCP surfaces.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ExtractParams {
    /// Article title, e.g. "Influenza".
    pub title: Option<String>,
    /// Short lead or abstract preceding the body.
    pub summary: Option<String>,
    /// Article body. HTML markup is stripped before extraction.
    #[serde(alias = "combinedText")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectionPayload {
    pub category: String,
    pub fragments: Vec<String>,
}

/// Structured form of an extraction result, for clients that need a fixed schema
/// instead of one key per category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractSectionsResponse {
    pub sections: Vec<SectionPayload>,
    pub when_to_see_a_doctor: String,
    pub notes: String,
    /// Present when no usable text was supplied or a fallback was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub name: String,
    pub keywords: Vec<String>,
    pub weight: f64,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
