/// MCP server for browsing, customizing, and copying email templates.
///
/// Listing tools:
/// - `search_templates`, `resume_search`, `dismiss_search`: search dropdown
/// - `list_templates`, `list_categories`: browse view and category filter
/// - `select_template`: store a selection and open it
///
/// Detail tools:
/// - `open_selected_template`: load the stored selection
/// - `enable_edit_mode`, `disable_edit_mode`, `focus_placeholder`, `edit_placeholder`
/// - `copy_template`: flatten the rendering and place it on the clipboard
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::{self, LOAD_ERROR_MESSAGE};
use crate::clipboard::{copy_to_clipboard, Clipboard};
use crate::config::Config;
use crate::detail::{DetailSession, NOT_FOUND_MESSAGE, NOT_FOUND_TITLE};
use crate::error::AppError;
use crate::model::{Catalog, TemplateRecord};
use crate::render::{extract_plain_text, Rendering, Segment};
use crate::search::{BrowseOutcome, ListingSession, SearchOutcome};
use crate::store::SelectionStore;
use template_common::mcp_api::{
    BlockView, CategoryInfo, CategoryListResponse, CopyTemplateResponse, DetailStatus,
    EditPlaceholderParams, ListTemplatesParams, PlaceholderParams, SearchStatus,
    SearchTemplatesParams, SearchTemplatesResponse, SegmentView, SelectTemplateParams,
    TemplateDetailResponse, TemplateListResponse, TemplateSummary,
};

const NO_RESULTS_MESSAGE: &str = "No templates found";
const EMPTY_CATEGORY_MESSAGE: &str = "No templates found in this category.";

#[derive(Clone)]
pub struct EmailTemplatesServer {
    /// `None` when the catalog failed to load; catalog tools then report the load error.
    catalog: Option<Arc<Catalog>>,
    listing: Arc<RwLock<ListingSession>>,
    detail: Arc<RwLock<DetailSession>>,
    store: Arc<SelectionStore>,
    clipboard: Arc<Clipboard>,
    config: Arc<Config>,
    tool_router: ToolRouter<EmailTemplatesServer>,
}

impl EmailTemplatesServer {
    pub fn new(
        catalog: Option<Catalog>,
        store: SelectionStore,
        clipboard: Clipboard,
        config: Config,
    ) -> Self {
        Self {
            catalog: catalog.map(Arc::new),
            listing: Arc::new(RwLock::new(ListingSession::new())),
            detail: Arc::new(RwLock::new(DetailSession::NotFound)),
            store: Arc::new(store),
            clipboard: Arc::new(clipboard),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    /// A handle for a new client: shares the catalog, selection store, and clipboard,
    /// but starts with its own listing and detail sessions.
    pub fn with_fresh_sessions(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            listing: Arc::new(RwLock::new(ListingSession::new())),
            detail: Arc::new(RwLock::new(DetailSession::NotFound)),
            store: Arc::clone(&self.store),
            clipboard: Arc::clone(&self.clipboard),
            config: Arc::clone(&self.config),
            tool_router: self.tool_router.clone(),
        }
    }

    fn catalog(&self) -> Result<&Catalog, String> {
        self.catalog
            .as_deref()
            .ok_or_else(|| LOAD_ERROR_MESSAGE.to_string())
    }

    /// Detail-page load: read the stored selection and rebuild the rendering.
    async fn open_detail(&self) -> TemplateDetailResponse {
        let stored = self.store.load().await;
        let session = DetailSession::open(stored);
        let response = to_detail_response(&session);
        *self.detail.write().await = session;
        response
    }

    async fn with_rendering<F>(&self, apply: F) -> Result<TemplateDetailResponse, String>
    where
        F: FnOnce(&mut Rendering) -> Result<(), AppError>,
    {
        let mut detail = self.detail.write().await;
        let rendering = detail
            .rendering_mut()
            .ok_or_else(|| format!("{NOT_FOUND_TITLE}: {NOT_FOUND_MESSAGE}"))?;
        apply(rendering).map_err(|e| e.to_string())?;
        Ok(to_detail_response(&detail))
    }
}

#[tool_router]
impl EmailTemplatesServer {
    #[tool(description = "Search email templates as you type. Any template sharing at least one character with the query matches; templates whose title starts with the query are listed first.")]
    async fn search_templates(
        &self,
        Parameters(params): Parameters<SearchTemplatesParams>,
    ) -> Result<Json<SearchTemplatesResponse>, String> {
        let catalog = self.catalog()?;
        let limit = self.config.effective_limit(params.limit);

        let mut listing = self.listing.write().await;
        let outcome = listing.on_input(catalog, &params.query, limit);
        Ok(Json(to_search_response(&params.query, outcome)))
    }

    #[tool(description = "Show the results for the last search query again (for example after they were dismissed).")]
    async fn resume_search(&self) -> Result<Json<SearchTemplatesResponse>, String> {
        let catalog = self.catalog()?;
        let limit = self.config.effective_limit(None);

        let mut listing = self.listing.write().await;
        let outcome = listing.on_focus(catalog, limit);
        let query = listing.query().to_string();
        Ok(Json(to_search_response(&query, outcome)))
    }

    #[tool(description = "Hide the current search results. The query is kept and can be resumed.")]
    async fn dismiss_search(&self) -> Result<Json<SearchTemplatesResponse>, String> {
        let mut listing = self.listing.write().await;
        if listing.is_visible() {
            listing.dismiss();
            info!(query = listing.query(), "search results dismissed");
        }
        Ok(Json(SearchTemplatesResponse {
            query: listing.query().to_string(),
            status: SearchStatus::Hidden,
            results: Vec::new(),
            message: None,
        }))
    }

    #[tool(description = "List all email templates, optionally only those in one category (e.g. 'meeting', 'academic'; case-insensitive).")]
    async fn list_templates(
        &self,
        Parameters(params): Parameters<ListTemplatesParams>,
    ) -> Result<Json<TemplateListResponse>, String> {
        let catalog = self.catalog()?;
        let category = params.category.unwrap_or_default().trim().to_string();

        let listing = self.listing.read().await;
        let (templates, message): (Vec<TemplateSummary>, Option<String>) =
            match listing.browse(catalog, &category) {
                BrowseOutcome::Templates(found) => {
                    (found.into_iter().map(to_summary).collect(), None)
                }
                BrowseOutcome::EmptyCategory => {
                    (Vec::new(), Some(EMPTY_CATEGORY_MESSAGE.to_string()))
                }
            };

        Ok(Json(TemplateListResponse {
            category: (!category.is_empty()).then_some(category),
            templates,
            message,
        }))
    }

    #[tool(description = "List the template categories with their badge class and template count.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        let catalog = self.catalog()?;
        let categories = catalog::categories(catalog)
            .into_iter()
            .map(|c| CategoryInfo {
                key: c.key,
                badge_class: c.badge_class,
                template_count: c.template_count,
            })
            .collect();
        Ok(Json(CategoryListResponse { categories }))
    }

    #[tool(description = "Select a template by ID. The selection is stored and the template is opened for editing.")]
    async fn select_template(
        &self,
        Parameters(params): Parameters<SelectTemplateParams>,
    ) -> Result<Json<TemplateDetailResponse>, String> {
        let catalog = self.catalog()?;
        let record = catalog
            .get(params.template_id)
            .ok_or_else(|| AppError::NotFound(params.template_id).to_string())?;

        self.store
            .save(record)
            .await
            .map_err(|e| format!("failed to store selection: {e}"))?;

        Ok(Json(self.open_detail().await))
    }

    #[tool(description = "Open the most recently selected template. Reports 'Template Not Found' when nothing usable is stored.")]
    async fn open_selected_template(&self) -> Result<Json<TemplateDetailResponse>, String> {
        Ok(Json(self.open_detail().await))
    }

    #[tool(description = "Enter edit mode. The first placeholder receives focus, which clears its bracketed text on first touch.")]
    async fn enable_edit_mode(&self) -> Result<Json<TemplateDetailResponse>, String> {
        let response = self
            .with_rendering(|rendering| {
                rendering.activate_editing();
                Ok(())
            })
            .await?;
        info!(focused = ?response.focused_placeholder, "edit mode enabled");
        Ok(Json(response))
    }

    #[tool(description = "Leave edit mode. Placeholder contents are kept.")]
    async fn disable_edit_mode(&self) -> Result<Json<TemplateDetailResponse>, String> {
        let response = self
            .with_rendering(|rendering| {
                rendering.deactivate_editing();
                Ok(())
            })
            .await?;
        Ok(Json(response))
    }

    #[tool(description = "Focus a placeholder. An untouched placeholder still showing its [bracketed] text is cleared on its first focus.")]
    async fn focus_placeholder(
        &self,
        Parameters(params): Parameters<PlaceholderParams>,
    ) -> Result<Json<TemplateDetailResponse>, String> {
        let response = self
            .with_rendering(|rendering| rendering.focus(params.placeholder_id))
            .await?;
        Ok(Json(response))
    }

    #[tool(description = "Replace the content of a placeholder with the given text.")]
    async fn edit_placeholder(
        &self,
        Parameters(params): Parameters<EditPlaceholderParams>,
    ) -> Result<Json<TemplateDetailResponse>, String> {
        let response = self
            .with_rendering(|rendering| rendering.edit(params.placeholder_id, &params.text))
            .await?;
        Ok(Json(response))
    }

    #[tool(description = "Copy the customized template as plain text to the clipboard. The text is also returned.")]
    async fn copy_template(&self) -> Result<Json<CopyTemplateResponse>, String> {
        // Release the session lock before the clipboard runs; the copy may block.
        let (id, text) = {
            let detail = self.detail.read().await;
            let DetailSession::Found { rendering, record } = &*detail else {
                return Err(format!("{NOT_FOUND_TITLE}: {NOT_FOUND_MESSAGE}"));
            };
            (record.id, extract_plain_text(rendering))
        };

        let outcome = copy_to_clipboard(Arc::clone(&self.clipboard), text).await;
        info!(
            id,
            method = outcome.method.as_str(),
            chars = outcome.text.chars().count(),
            "template copied"
        );

        Ok(Json(CopyTemplateResponse {
            acknowledged: outcome.acknowledged(),
            method: outcome.method.as_str().to_string(),
            text: outcome.text,
        }))
    }
}

fn to_summary(record: &TemplateRecord) -> TemplateSummary {
    TemplateSummary {
        id: record.id,
        title: record.title.clone(),
        description: record.description.clone(),
        category: record.category.clone(),
        badge_class: record.badge_class(),
    }
}

fn to_search_response(query: &str, outcome: SearchOutcome<'_>) -> SearchTemplatesResponse {
    let (status, results, message): (SearchStatus, Vec<TemplateSummary>, Option<String>) =
        match outcome {
            SearchOutcome::Idle => (SearchStatus::Idle, Vec::new(), None),
            SearchOutcome::NoResults => (
                SearchStatus::NoResults,
                Vec::new(),
                Some(NO_RESULTS_MESSAGE.to_string()),
            ),
            SearchOutcome::Results(found) => (
                SearchStatus::Results,
                found.into_iter().map(to_summary).collect(),
                None,
            ),
        };
    SearchTemplatesResponse {
        query: query.to_string(),
        status,
        results,
        message,
    }
}

fn to_detail_response(session: &DetailSession) -> TemplateDetailResponse {
    match session {
        DetailSession::Found { record, rendering } => TemplateDetailResponse {
            status: DetailStatus::Found,
            template: Some(to_summary(record)),
            edit_mode: rendering.edit_mode(),
            focused_placeholder: rendering.focused(),
            blocks: rendering
                .blocks()
                .iter()
                .map(|block| BlockView {
                    kind: block.kind.as_str().to_string(),
                    segments: block.segments.iter().map(to_segment_view).collect(),
                })
                .collect(),
            title: None,
            message: None,
        },
        DetailSession::NotFound => TemplateDetailResponse {
            status: DetailStatus::NotFound,
            template: None,
            edit_mode: false,
            focused_placeholder: None,
            blocks: Vec::new(),
            title: Some(NOT_FOUND_TITLE.to_string()),
            message: Some(NOT_FOUND_MESSAGE.to_string()),
        },
    }
}

fn to_segment_view(segment: &Segment) -> SegmentView {
    match segment {
        Segment::Literal(text) => SegmentView::Literal { text: text.clone() },
        Segment::Placeholder(p) => SegmentView::Placeholder {
            id: p.id,
            name: p.name.clone(),
            content: p.content.clone(),
        },
    }
}

#[tool_handler]
impl ServerHandler for EmailTemplatesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "email-templates".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Email template MCP server. Use search_templates or list_templates to find a \
                 template, select_template to open it, enable_edit_mode/focus_placeholder/\
                 edit_placeholder to fill in [placeholders], and copy_template to get the \
                 finished text."
                    .to_string(),
            ),
        }
    }
}
