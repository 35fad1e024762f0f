//! Triagedesk server
//!
//! Run with: cargo run -p triagedesk-web --bin triagedesk

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use triagedesk_web::config::Config;
use triagedesk_web::router::router_with_state;
use triagedesk_web::state::AppState;
use triagedesk_web::ticker::spawn_escalation_ticker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("could not read .env: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Triagedesk starting up, version {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!(
        classifier = config.classifier.mode.as_str(),
        critical_minutes = config.queue.critical_escalation_minutes,
        urgent_minutes = config.queue.urgent_escalation_minutes,
        "configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config)?);
    if state.triage_service.is_none() {
        warn!("POST /triage disabled");
    }

    let _ticker = spawn_escalation_ticker(
        state.desk.clone(),
        Duration::from_secs(config.queue.refresh_secs),
    );

    let app = router_with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
