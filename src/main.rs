//! taskcast server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use taskcast::api;
use taskcast::app_state::AppState;
use taskcast::config::GatewayConfig;
use taskcast::mail::{Notifier, SmtpMailer};
use taskcast::persistence::{InMemoryTaskStore, PostgresTaskStore, TaskStore};
use taskcast::service::TaskService;
use taskcast::ws::handler::ws_handler;
use taskcast::ws::{Broadcaster, ConnectionRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting taskcast");

    // Select the task store
    let store: Arc<dyn TaskStore> = if config.persistence_enabled {
        let pg = PostgresTaskStore::connect(&config).await?;
        pg.run_migrations().await?;
        tracing::info!("postgres store ready");
        Arc::new(pg)
    } else {
        tracing::info!("persistence disabled, using in-memory task store");
        Arc::new(InMemoryTaskStore::new())
    };

    // Configure outbound mail
    let notifier: Option<Arc<dyn Notifier>> = match &config.smtp {
        Some(settings) => {
            let mailer = SmtpMailer::from_settings(settings)?;
            tracing::info!(host = %settings.host, "smtp mailer configured");
            Some(Arc::new(mailer))
        }
        None => {
            tracing::info!("SMTP_HOST not set, email notifications disabled");
            None
        }
    };

    // Build the ws and service layers
    let registry = Arc::new(ConnectionRegistry::new());
    let broadcaster = Broadcaster::new(Arc::clone(&registry));
    let task_service = Arc::new(TaskService::new(store, broadcaster, notifier));

    // Build application state
    let app_state = AppState {
        task_service,
        registry,
    };

    // CORS: a single configured origin, or anything
    let cors = match &config.cors_allow_origin {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .context("CORS_ALLOW_ORIGIN must be a valid header value")?;
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let app = app.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger")
            .url("/api-docs/openapi.json", <api::ApiDoc as utoipa::OpenApi>::openapi()),
    );

    let app = app
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
