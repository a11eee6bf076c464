/// Catalog search and category browsing.
///
/// Matching is deliberately permissive: a template matches a non-empty query when any
/// single character of the lower-cased query occurs anywhere in its lower-cased
/// title, description, and category joined by spaces. This is not substring matching.
/// A query containing a space therefore matches every template.
use crate::model::{Catalog, TemplateRecord};

/// Templates whose category equals `category` case-insensitively, in catalog order.
/// An empty category returns the whole catalog.
pub fn filter_by_category<'a>(catalog: &'a Catalog, category: &str) -> Vec<&'a TemplateRecord> {
    if category.is_empty() {
        return catalog.templates.iter().collect();
    }
    let wanted = category.to_lowercase();
    catalog
        .templates
        .iter()
        .filter(|t| t.category.to_lowercase() == wanted)
        .collect()
}

/// Templates matching `query`, title-prefix matches first.
///
/// An empty query returns the whole catalog in its original order.
pub fn search<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a TemplateRecord> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return catalog.templates.iter().collect();
    }

    let mut results: Vec<&TemplateRecord> = catalog
        .templates
        .iter()
        .filter(|t| shares_character(&haystack(t), &query))
        .collect();

    // sort_by_key is stable, so catalog order survives within both groups
    results.sort_by_key(|t| !t.title.to_lowercase().starts_with(&query));
    results
}

fn haystack(record: &TemplateRecord) -> String {
    format!(
        "{} {} {}",
        record.title.to_lowercase(),
        record.description.to_lowercase(),
        record.category.to_lowercase()
    )
}

fn shares_character(haystack: &str, query: &str) -> bool {
    query.chars().any(|c| haystack.contains(c))
}

/// What the search dropdown shows for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// Empty query: nothing to show.
    Idle,
    /// Non-empty query without matches ("No templates found").
    NoResults,
    Results(Vec<&'a TemplateRecord>),
}

impl<'a> SearchOutcome<'a> {
    pub fn from_results(query: &str, results: Vec<&'a TemplateRecord>) -> Self {
        if !results.is_empty() {
            Self::Results(results)
        } else if query.is_empty() {
            Self::Idle
        } else {
            Self::NoResults
        }
    }
}

/// What the "browse all" view shows for a category filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome<'a> {
    Templates(Vec<&'a TemplateRecord>),
    /// Nothing in this category ("No templates found in this category.").
    EmptyCategory,
}

/// Listing-page state: the current query and whether its result list is showing.
#[derive(Debug, Clone, Default)]
pub struct ListingSession {
    query: String,
    visible: bool,
}

impl ListingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Keystroke: store the query and run the search.
    pub fn on_input<'a>(&mut self, catalog: &'a Catalog, query: &str, limit: usize) -> SearchOutcome<'a> {
        self.query = query.to_string();
        self.visible = true;
        self.run(catalog, limit)
    }

    /// Focus: re-run the stored query so a dismissed list comes back.
    pub fn on_focus<'a>(&mut self, catalog: &'a Catalog, limit: usize) -> SearchOutcome<'a> {
        if self.query.is_empty() {
            return SearchOutcome::Idle;
        }
        self.visible = true;
        self.run(catalog, limit)
    }

    /// Click outside the results: hide them but keep the query.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    /// Category sort control.
    pub fn browse<'a>(&self, catalog: &'a Catalog, category: &str) -> BrowseOutcome<'a> {
        let templates = filter_by_category(catalog, category);
        if templates.is_empty() {
            BrowseOutcome::EmptyCategory
        } else {
            BrowseOutcome::Templates(templates)
        }
    }

    fn run<'a>(&self, catalog: &'a Catalog, limit: usize) -> SearchOutcome<'a> {
        if self.query.is_empty() {
            return SearchOutcome::Idle;
        }
        let mut results = search(catalog, &self.query);
        results.truncate(limit);
        SearchOutcome::from_results(&self.query, results)
    }
}
