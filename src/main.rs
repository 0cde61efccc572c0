use socialdata_mcp_gateway::infra;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment alone may carry the config.
    let _ = dotenvy::dotenv();
    infra::logging::init();

    let cfg = infra::config::Config::from_env();
    infra::boot::run_server(cfg).await
}
