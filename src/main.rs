use std::net::SocketAddr;
use std::sync::Arc;
use wealthtrack::config::AiMode;
use wealthtrack::datasource::{ChatAiEngine, MockAiEngine};
use wealthtrack::{api, AiEngine, Config, Repository};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match wealthtrack::init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let ai: Arc<dyn AiEngine> = match config.ai_mode {
        AiMode::Chat => Arc::new(ChatAiEngine::new(
            config.ai_api_url.clone(),
            config.ai_api_key.clone(),
            config.ai_model.clone(),
        )),
        AiMode::Mock => Arc::new(MockAiEngine::new()),
    };

    // Create router
    let app = api::create_router(api::AppState::new(repo, config, ai));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
