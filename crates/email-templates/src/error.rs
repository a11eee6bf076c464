#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("catalog parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("catalog fetch failed: {0}")]
    Fetch(String),

    #[error("duplicate template id: {0}")]
    DuplicateId(u64),

    #[error("template not found: {0}")]
    NotFound(u64),

    #[error("unknown placeholder: {0}")]
    UnknownPlaceholder(usize),

    #[error(transparent)]
    Common(#[from] template_common::error::CommonError),
}
