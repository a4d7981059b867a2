//! # JobSync API
//!
//! The API crate provides the web server for the JobSync availability and
//! scheduling engine. It exposes RESTful endpoints for contractor
//! availability, slot listings, job booking and reschedule, and iCalendar
//! export.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Map domain errors to HTTP responses
//! - **Services**: External collaborators (routing, notifications, calendar
//!   export) and the route optimizer built on top of them
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// External-service gateways and the route optimizer
pub mod services;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use services::notify::{LoggingNotificationGateway, NotificationGateway};
use services::routing::{HttpRoutingService, RoutingService};

/// Shared application state that is accessible to all request handlers.
///
/// Routing and notification sit behind trait objects so tests can swap in
/// mocks and deployments can swap providers without touching the handlers.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Routing service used by the route optimizer
    pub routing: Arc<dyn RoutingService>,
    /// Fire-and-forget notification delivery
    pub notifier: Arc<dyn NotificationGateway>,
    /// Runtime configuration (slot increment, external timeouts)
    pub config: config::ApiConfig,
}

/// Builds the application router with all routes attached to `state`.
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability management and slot listing endpoints
        .merge(routes::availability::routes())
        // Booking, reschedule, and contractor calendar endpoints
        .merge(routes::schedule::routes())
        // iCalendar export endpoints
        .merge(routes::calendar::routes())
        // Attach shared state to all routes
        .with_state(state)
}

/// Starts the API server with the provided configuration and database
/// connection. Initializes logging, builds the external-service gateways
/// from config, and serves until the process is stopped.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let routing: Arc<dyn RoutingService> = Arc::new(HttpRoutingService::new(
        config.routing_url.clone(),
        config.external_timeout,
    )?);
    let notifier: Arc<dyn NotificationGateway> = Arc::new(LoggingNotificationGateway);

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        routing,
        notifier,
        config: config.clone(),
    });

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
