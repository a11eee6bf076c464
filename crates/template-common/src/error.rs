/// Error types shared by the template server crates.
///
/// These cover the infrastructure pieces (Redis, JSON payloads) that sit underneath the
/// catalog and selection store. Server crates define their own error enum and wrap
/// `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis unavailable, degrading gracefully")]
    RedisUnavailable,

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
