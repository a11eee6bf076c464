use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchTemplatesParams {
    /// Free-text query. Any template sharing at least one character with it matches.
    pub query: String,
    /// Maximum number of results to return (default from server config, max: 100).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTemplatesParams {
    /// Category such as "meeting" or "academic" (case-insensitive). Omit or leave empty for all.
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SelectTemplateParams {
    /// Catalog ID of the template to open.
    pub template_id: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct PlaceholderParams {
    /// Placeholder ID as reported in the rendering (document order, starting at 0).
    pub placeholder_id: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EditPlaceholderParams {
    /// Placeholder ID as reported in the rendering.
    pub placeholder_id: usize,
    /// New content for the placeholder. May be empty.
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub badge_class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Query is empty; nothing is shown.
    Idle,
    /// Query is non-empty and nothing matched.
    NoResults,
    Results,
    /// The result list was dismissed.
    Hidden,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchTemplatesResponse {
    pub query: String,
    pub status: SearchStatus,
    pub results: Vec<TemplateSummary>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateListResponse {
    pub category: Option<String>,
    pub templates: Vec<TemplateSummary>,
    /// Set when the category has no templates.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub key: String,
    pub badge_class: String,
    pub template_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentView {
    Literal {
        text: String,
    },
    Placeholder {
        id: usize,
        name: String,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BlockView {
    /// One of "subject", "separator", "paragraph".
    pub kind: String,
    pub segments: Vec<SegmentView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    Found,
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemplateDetailResponse {
    pub status: DetailStatus,
    pub template: Option<TemplateSummary>,
    pub edit_mode: bool,
    pub focused_placeholder: Option<usize>,
    pub blocks: Vec<BlockView>,
    /// Heading and message shown when the stored template could not be loaded.
    pub title: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CopyTemplateResponse {
    /// Plain text that was placed (or attempted to be placed) on the clipboard.
    pub text: String,
    /// `true` when the primary clipboard path succeeded ("Copied!").
    pub acknowledged: bool,
    /// One of "system", "fallback", "failed".
    pub method: String,
}
