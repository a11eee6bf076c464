use serde::{Deserialize, Serialize};

const BADGE_CLASS_PREFIX: &str = "badge-";

/// A single email template (e.g., "Parent-Teacher Meeting Request").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    /// Catalog-unique identifier
    pub id: u64,
    /// Short display title
    pub title: String,
    /// Category such as "meeting" or "academic"
    pub category: String,
    /// One-sentence summary
    pub description: String,
    /// Email subject line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Paragraphs separated by blank lines, may contain `[Placeholder]` tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl TemplateRecord {
    pub fn badge_class(&self) -> String {
        badge_class(&self.category)
    }
}

pub fn badge_class(category: &str) -> String {
    format!("{BADGE_CLASS_PREFIX}{}", category.to_lowercase())
}

/// Ordered template catalog as loaded from the catalog JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub templates: Vec<TemplateRecord>,
}

impl Catalog {
    pub fn get(&self, id: u64) -> Option<&TemplateRecord> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// A distinct category seen in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Lower-cased category key
    pub key: String,
    pub badge_class: String,
    pub template_count: usize,
}
