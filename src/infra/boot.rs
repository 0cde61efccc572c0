use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::socialdata::SocialDataRemote;
use crate::domain::Transport;
use crate::infra::config::Config;
use crate::tools::social::tool_router::{SocialRouter, SocialSvc};

/// Handler factory sharing one upstream client (and its credential) across
/// every MCP session.
pub fn social_factory(transport: Arc<dyn Transport>) -> impl Fn() -> (SocialSvc, SocialRouter) + Send + Sync + Clone + 'static {
    move || (SocialSvc::new(transport.clone()), SocialSvc::router())
}

pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        base_url = %cfg.base_url,
        credential = cfg.api_key.is_some(),
        "BOOT socialdata-mcp-gateway"
    );
    if cfg.api_key.is_none() {
        tracing::warn!("SOCIALDATA_API_KEY not set; tool calls will fail until it is configured");
    }

    let remote = SocialDataRemote::from_config(&cfg)?;
    let factory = social_factory(Arc::new(remote));

    if cfg.is_stdio() {
        crate::infra::runtime::mcp_transport::serve_stdio(factory)
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = crate::infra::http_app::build_app(factory);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    tracing::info!(%addr, "serving MCP over streamable HTTP at /mcp");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
