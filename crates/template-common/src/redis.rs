/// Namespaced Redis key-value store with graceful degradation.
///
/// Every public operation returns `Option<T>` or `bool`. When no URL is configured the
/// store is disabled and all calls are silent no-ops; when Redis is configured but
/// failing, the failure is logged as a warning and the caller falls back to its own
/// in-process state.
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::warn;

use crate::error::CommonError;

pub struct RedisStore {
    client: Option<redis::Client>,
    namespace: String,
}

impl RedisStore {
    /// Create a store whose keys are all prefixed with `namespace`.
    ///
    /// If `url` is `None` or the client cannot be built, the store is disabled.
    pub fn new(url: Option<&str>, namespace: &str) -> Self {
        let client = url.and_then(|u| {
            redis::Client::open(u)
                .inspect_err(|e| warn!(error = %e, url = u, "failed to create redis client, store disabled"))
                .ok()
        });
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Full key for `name` within this store's namespace.
    pub fn key(&self, name: &str) -> String {
        format!("{}{name}", self.namespace)
    }

    /// Send a PING. Returns `true` if Redis is reachable.
    pub async fn is_available(&self) -> bool {
        let Ok(mut conn) = self.connection().await else {
            return false;
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        let key = self.key(name);
        match self.try_get(&key).await {
            Ok(value) => value,
            Err(CommonError::RedisUnavailable) => None,
            Err(e) => {
                warn!(error = %e, key, "redis GET failed");
                None
            }
        }
    }

    pub async fn set(&self, name: &str, value: &str) -> bool {
        let key = self.key(name);
        match self.try_set(&key, value).await {
            Ok(()) => true,
            Err(CommonError::RedisUnavailable) => false,
            Err(e) => {
                warn!(error = %e, key, "redis SET failed");
                false
            }
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CommonError> {
        let client = self.client.as_ref().ok_or(CommonError::RedisUnavailable)?;
        Ok(client.get_multiplexed_async_connection().await?)
    }

    async fn try_get(&self, key: &str) -> Result<Option<String>, CommonError> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn try_set(&self, key: &str, value: &str) -> Result<(), CommonError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}
