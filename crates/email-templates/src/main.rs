mod catalog;
mod clipboard;
mod config;
mod detail;
mod error;
mod model;
mod render;
mod search;
mod server;
mod store;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clipboard::Clipboard;
use config::Config;
use server::EmailTemplatesServer;
use store::{SelectionStore, KEY_NAMESPACE};
use template_common::redis::RedisStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting email-templates MCP server");

    let config = Config::from_env()?;
    info!(
        catalog = %config.catalog,
        redis = config.redis_url.is_some(),
        search_limit = config.search_limit,
        "configuration loaded"
    );

    // A failed load is not fatal: the listing tools report it instead.
    let (catalog, fingerprint) = match catalog::load_catalog(&config.catalog).await {
        Ok(loaded) => (Some(loaded.catalog), loaded.fingerprint),
        Err(e) => {
            error!(error = %e, "error loading templates");
            (None, String::new())
        }
    };

    let redis = RedisStore::new(config.redis_url.as_deref(), KEY_NAMESPACE);
    if redis.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, keeping selection in memory");
    }
    let store = SelectionStore::new(redis, &fingerprint);
    let clipboard = Clipboard::system(config.clipboard_command.as_deref());

    let server = EmailTemplatesServer::new(catalog, store, clipboard, config);

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.with_fresh_sessions();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
