use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use db_chat::analyzers::{AnalyticsGenerator, RelationshipsAnalyzer, SemanticsAnalyzer};
use db_chat::executor::MindsDbClient;
use db_chat::llm::LLM;
use db_chat::pipeline::ChatPipeline;
use db_chat::utils::init_logger;
use db_chat::{config::Config, routes::create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Model client shared by every stage
    let llm = LLM::from_config(&config.llm).context("Failed to initialize LLM client")?;
    info!(provider = llm.provider_name(), model = llm.model(), "LLM client ready");

    // One MindsDB handle for the pipeline and the datasource routes
    let mindsdb = Arc::new(
        MindsDbClient::new(
            &config.executor.mindsdb_url,
            Duration::from_secs(config.executor.timeout_secs),
        )
        .context("Failed to initialize MindsDB client")?,
    );
    info!(url = %config.executor.mindsdb_url, "MindsDB client ready");

    let state = AppState {
        pipeline: Arc::new(ChatPipeline::new(&llm, mindsdb.clone())?),
        datasources: mindsdb,
        relationships: Arc::new(RelationshipsAnalyzer::new(&llm)?),
        semantics: Arc::new(SemanticsAnalyzer::new(&llm)?),
        analytics: Arc::new(AnalyticsGenerator::new(&llm)?),
        config: config.clone(),
    };

    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("HOST and PORT must form a valid socket address")?;
    info!("{} listening on {}", config.server.app_name, addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
