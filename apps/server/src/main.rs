//! REMS repair report server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use rems_lib::app::{self, AppState};
use rems_lib::config::Config;
use rems_lib::db::DbPool;
use rems_lib::middleware;
use rems_lib::services::{self, Notifier};

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    // Simple check - just verify we can load config
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set");
            error!("  - SMTP_USER, SMTP_PASS and EMAIL_TO are required when SMTP_HOST is set");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  REMS Repair Report Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    // Attachments live here only for the duration of one request
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    services::sweep_stale_uploads(&config.upload_dir, services::STALE_UPLOAD_AGE).await;

    let pool = match DbPool::new(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let notifier = match Notifier::from_settings(&config.mail) {
        Ok(notifier) => notifier,
        Err(e) => {
            error!("Failed to configure mail notifications: {}", e);
            std::process::exit(1);
        }
    };
    if notifier.is_enabled() {
        info!(
            "Report notifications go to {} recipient(s) via {}",
            config.mail.email_to.len() + config.mail.email_cc.len(),
            config.mail.smtp_host.as_deref().unwrap_or_default()
        );
    }

    info!(
        "Upload limit: {}MB per submission",
        config.max_upload_size / 1024 / 1024
    );

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let state = AppState::new(
        pool,
        config.upload_dir.clone(),
        notifier,
        config.max_upload_size,
    );

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    // Start HTTP server
    let server = HttpServer::new(move || {
        let cors = if is_development {
            // Permissive CORS for the form dev server
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        } else {
            // Restrictive CORS for production (same-origin only)
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        let state = state.clone();
        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .configure(move |cfg| app::configure(cfg, &state))
            .service(app::swagger_ui())
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
