//! Togetherly Backend Service
//!
//! Main entry point for the Togetherly group gifting backend.
//! This service provides:
//! - HTTP+JSON API for rooms, events, funding and wishlist bookings
//! - Background sweep that completes expired gift-exchange rooms

use std::net::SocketAddr;
use std::sync::Arc;
use togetherly_backend::config::AppConfig;
use togetherly_backend::database::{create_pool, run_migrations};
use togetherly_backend::error::{AppError, AppResult};
use togetherly_backend::{api, AppState};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "togetherly_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });
    if config.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Togetherly Backend Service Starting            ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    info!("Draw strategy: {}", config.draw.strategy.as_str());

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let app_state = Arc::new(AppState::new(pool, &config));
    info!("✓ Application state initialized with repositories and services");

    if app_state.notifier.is_enabled() {
        info!("✓ Telegram notifications enabled");
    } else {
        warn!("TELEGRAM_BOT_TOKEN not configured - notifications disabled");
    }

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let room_service = app_state.room_service.clone();
    let sweep_interval = config.room_sweep_interval();
    let sweep_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        loop {
            ticker.tick().await;
            let today = chrono::Utc::now().date_naive();
            if let Err(e) = room_service.complete_expired_rooms(today).await {
                error!("Room sweep failed: {}", e);
            }
        }
    });
    info!(
        "✓ Room sweep background task started ({}s interval)",
        sweep_interval.as_secs()
    );

    // =========================================================================
    // START SERVER
    // =========================================================================
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    let router = api::app(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Togetherly Backend Service Ready!              ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     {}                              ║", addr);
    info!("║  Environment:  {}                                    ║", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = server_handle => {
            error!("HTTP server exited unexpectedly");
        }
        _ = sweep_handle => {
            error!("Room sweep task exited unexpectedly");
        }
    }

    info!("Togetherly backend service shutdown complete");
    Ok(())
}
