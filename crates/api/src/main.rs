//! Campfinder API - GraphQL service for the bootcamp directory.
//!
//! This binary serves the GraphQL endpoint on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with async-graphql
//! - `PostgreSQL` for users, bootcamps and courses
//! - SMTP (lettre) for one-time codes
//! - `MapQuest` for bootcamp geocoding

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use campfinder_api::{
    config::ApiConfig,
    db, routes,
    services::{
        Services, Stores,
        auth::SessionTokens,
        email::{Mailer, SmtpMailer, UnconfiguredMailer},
        geocoder::MapQuestGeocoder,
    },
    state::AppState,
};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn build_mailer(config: &ApiConfig) -> Arc<dyn Mailer> {
    let Some(email) = &config.email else {
        tracing::warn!("SMTP not configured, one-time codes cannot be delivered");
        return Arc::new(UnconfiguredMailer);
    };
    Arc::new(SmtpMailer::new(email).expect("Failed to create SMTP mailer"))
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ApiConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campfinder_api=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p campfinder-cli -- migrate

    let geocoder =
        Arc::new(MapQuestGeocoder::new(&config.geocoder).expect("Failed to create geocoder"));
    let tokens = SessionTokens::new(config.token.secret.clone(), config.token.ttl());
    let services = Services::new(
        Stores::postgres(&pool),
        build_mailer(&config),
        geocoder,
        tokens,
    );

    let app = routes::router(AppState::new(services, pool))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("campfinder api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
