//! Baleno Sanzeno booking service
//!
//! REST backend for the community booking console. Reads configuration
//! from a TOML file (~/.config/sanzeno-booking/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use baleno_sanzeno::application::{
    start_payment_reminder_task, BookingLifecycle, BookingService, PaymentSettingsService,
    UserService,
};
use baleno_sanzeno::config::AppConfig;
use baleno_sanzeno::domain::RepositoryProvider;
use baleno_sanzeno::infrastructure::database::migrator::Migrator;
use baleno_sanzeno::infrastructure::{LoggingNotificationSender, LoggingPaymentProcessor};
use baleno_sanzeno::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};
use baleno_sanzeno::{
    create_api_router, default_config_path, init_database, ApiState, DatabaseConfig,
    SeaOrmRepositoryProvider,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("SANZENO_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Baleno Sanzeno booking service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("Prometheus metrics recorder installed");

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Repositories & services ────────────────────────────────
    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    let notifier = Arc::new(LoggingNotificationSender);
    let processor = Arc::new(LoggingPaymentProcessor);
    let lifecycle = BookingLifecycle::new(repos.clone(), notifier.clone(), processor);
    let booking_service = Arc::new(BookingService::new(repos.clone(), lifecycle));
    let user_service = Arc::new(UserService::new(repos.clone()));
    let settings_service = Arc::new(PaymentSettingsService::new(repos.clone()));

    // ── Shutdown coordination ──────────────────────────────────
    let shutdown_signal = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown_signal.clone()));

    // ── Background tasks ───────────────────────────────────────
    start_payment_reminder_task(
        repos.clone(),
        notifier,
        shutdown_signal.clone(),
        app_cfg.booking.reminder_check_interval_secs,
    );

    // ── REST API server ────────────────────────────────────────
    let state = ApiState {
        repos,
        bookings: booking_service,
        users: user_service,
        settings: settings_service,
    };
    let router = create_api_router(state, prometheus_handle);

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await?;

    // Explicitly release the connection pool before exit.
    info!("Closing database connection...");
    db.close().await?;
    info!("Shutdown complete");

    Ok(())
}
