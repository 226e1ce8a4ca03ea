//! flashpool-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use flashpool_gateway::api;
use flashpool_gateway::app_state::AppState;
use flashpool_gateway::borrower::{BorrowerRegistry, RepayingBorrower, ShortfallBorrower};
use flashpool_gateway::config::GatewayConfig;
use flashpool_gateway::domain::{EventBus, FeePolicy};
use flashpool_gateway::persistence::{PostgresPersistence, load_history, spawn_event_writer};
use flashpool_gateway::service::FlashLoanService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        fee_bps = config.flash_fee_bps,
        "starting flashpool-gateway"
    );

    // Build domain layer
    let fee_policy = FeePolicy::new(config.flash_fee_bps)?;
    let event_bus = EventBus::new(config.event_bus_capacity);

    let borrowers = Arc::new(BorrowerRegistry::new());
    borrowers
        .register(
            config.repaying_borrower,
            Arc::new(RepayingBorrower::new(config.borrower_surplus)),
        )
        .await?;
    borrowers
        .register(
            config.shortfall_borrower,
            Arc::new(ShortfallBorrower::new(config.borrower_shortfall)),
        )
        .await?;

    // Build service layer
    let flash_loan_service = Arc::new(FlashLoanService::new(
        fee_policy,
        borrowers,
        event_bus.clone(),
    ));

    // Optional Postgres copy of the event log: rebuild, then keep writing
    if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        let persistence = PostgresPersistence::new(pool);
        persistence.ensure_schema().await?;

        let history = load_history(&persistence).await?;
        flash_loan_service.restore(history).await?;

        spawn_event_writer(persistence, &event_bus);
        tracing::info!("event persistence enabled");
    }

    // Build application state
    let app_state = AppState {
        flash_loan_service,
        event_bus,
    };

    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
