//! Community Canvas HTTP service.

use std::error::Error;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use community_canvas::adapters::auth::JwtSessionValidator;
use community_canvas::adapters::events::{InMemoryEventBus, ModerationLog};
use community_canvas::adapters::http::{api_router, AppState};
use community_canvas::adapters::memory::{
    InMemoryDeletionLog, InMemoryProposalRepository, InMemoryVotableRepository,
};
use community_canvas::adapters::postgres::{
    self, PostgresDeletionLog, PostgresProposalRepository, PostgresVotableRepository,
};
use community_canvas::config::{AppConfig, ServerConfig};
use community_canvas::domain::foundation::AdminRoster;
use community_canvas::ports::{DeletionLog, ProposalRepository, VotableRepository};

type Stores = (
    Arc<dyn VotableRepository>,
    Arc<dyn ProposalRepository>,
    Arc<dyn DeletionLog>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let (entities, proposals, deletion_log) = build_stores(&config).await?;

    let admins = AdminRoster::new(config.auth.admin_ids());
    if admins.is_empty() {
        tracing::warn!("no admin users configured; deletion log endpoints are unreachable");
    }

    let events = Arc::new(InMemoryEventBus::new());
    ModerationLog::attach(events.as_ref());

    let state = AppState::new(
        entities,
        proposals,
        deletion_log,
        events,
        Arc::new(JwtSessionValidator::from_config(&config.auth)),
        admins,
    );

    let app = api_router(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "community canvas listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn build_stores(config: &AppConfig) -> Result<Stores, Box<dyn Error>> {
    match &config.database {
        Some(database) => {
            let pool = postgres::connect(database).await?;
            if database.run_migrations {
                postgres::run_migrations(&pool).await?;
                tracing::info!("database migrations applied");
            }
            tracing::info!(
                url = %database.redacted_url(),
                max_connections = database.pool.max,
                "using PostgreSQL stores"
            );
            let stores: Stores = (
                Arc::new(PostgresVotableRepository::new(pool.clone())),
                Arc::new(PostgresProposalRepository::new(pool.clone())),
                Arc::new(PostgresDeletionLog::new(pool)),
            );
            Ok(stores)
        }
        None => {
            tracing::warn!("no database configured; state is kept in memory only");
            let stores: Stores = (
                Arc::new(InMemoryVotableRepository::new()),
                Arc::new(InMemoryProposalRepository::new()),
                Arc::new(InMemoryDeletionLog::new()),
            );
            Ok(stores)
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
