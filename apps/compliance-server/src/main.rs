//! Loan Compliance Server
//!
//! REST front end for the compliance engine. Provides endpoints for:
//!
//! - EU regulatory and green loan rule analysis
//! - Fairness disparity scanning with an optional LLM advisory pass
//! - Highlight marks mapped to editor document coordinates
//! - Per-document report history
//!
//! ## Configuration
//!
//! Flags cover the listener and rate limit. The advisory client reads
//! `OPENAI_API_KEY`, `OPENAI_BASE_URL` and `OPENAI_MODEL` from the
//! environment (a `.env` file is honored); without a key the advisory pass
//! is disabled and analysis is rule-based only.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use compliance_engine::{AdvisoryService, ComplianceEngine, DisabledAdvisor, EngineConfig};

mod advisor;
mod api;
mod error;
mod store;
#[cfg(test)]
mod tests;

use advisor::OpenAiAdvisor;
use api::{
    handle_ai_status, handle_analyze, handle_analyze_with_highlights, handle_apply_highlights,
    handle_health, handle_latest_report, handle_list_countries, handle_list_reports,
    handle_list_rules, handle_negotiate,
};
use store::{InMemoryReportStore, ReportStore};

/// Command-line arguments for the compliance server
#[derive(Parser, Debug)]
#[command(name = "compliance-server")]
#[command(about = "Loan document compliance analysis server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "PORT")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Upper bound on a single advisory call in milliseconds
    #[arg(long, default_value = "20000")]
    advisory_timeout_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ComplianceEngine>,
    pub advisor: Arc<dyn AdvisoryService>,
    pub reports: Arc<dyn ReportStore>,
}

impl AppState {
    pub fn new(
        engine: ComplianceEngine,
        advisor: Arc<dyn AdvisoryService>,
        reports: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            advisor,
            reports,
        }
    }
}

/// Routes without the per-IP rate limiter, which needs a peer address
pub fn app_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Catalogs
        .route("/api/compliance/rules", get(handle_list_rules))
        .route("/api/compliance/countries", get(handle_list_countries))
        .route("/api/compliance/ai/status", get(handle_ai_status))
        // Analysis
        .route("/api/compliance/analyze", post(handle_analyze))
        .route(
            "/api/compliance/analyze/highlights",
            post(handle_analyze_with_highlights),
        )
        .route("/api/compliance/highlights", post(handle_apply_highlights))
        .route("/api/compliance/negotiate", post(handle_negotiate))
        // Reports
        .route(
            "/api/compliance/documents/:id/reports",
            get(handle_list_reports),
        )
        .route(
            "/api/compliance/documents/:id/latest",
            get(handle_latest_report),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting compliance server on {}:{}", args.host, args.port);

    let engine = ComplianceEngine::with_config(EngineConfig {
        advisory_timeout_ms: args.advisory_timeout_ms,
        ..EngineConfig::default()
    })?;

    let advisor: Arc<dyn AdvisoryService> = match OpenAiAdvisor::from_env() {
        Some(advisor) => {
            info!("Advisory analysis enabled (model {})", advisor.model());
            Arc::new(advisor)
        }
        None => {
            info!("OPENAI_API_KEY not set; advisory analysis disabled");
            Arc::new(DisabledAdvisor)
        }
    };

    let state = AppState::new(engine, advisor, Arc::new(InMemoryReportStore::new()));

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit.saturating_mul(2))
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limit: {}", args.rate_limit))?,
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = app_router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Advisory timeout: {}ms", args.advisory_timeout_ms);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
