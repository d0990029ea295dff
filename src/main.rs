//! Auth Service
//!
//! Session authentication REST API.
//! Reads configuration from TOML file (~/.config/auth-service/config.toml).

use std::sync::Arc;

use tracing::{error, info, warn};

use auth_service::application::start_revocation_sweeper;
use auth_service::config::{config_path_from_env, AppConfig, ConfigError, StorageBackend};
use auth_service::domain::CredentialStore;
use auth_service::shared::shutdown::ShutdownCoordinator;
use auth_service::{
    create_api_router, init_database, AuthService, AuthSettings, DatabaseConfig,
    InMemoryCredentialStore, RevokedTokenRepository, UserRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = config_path_from_env();
    let (app_cfg, load_error) = if config_path.exists() {
        match AppConfig::load(&config_path) {
            Ok(cfg) => (cfg, None),
            Err(e @ ConfigError::Invalid(_)) => return Err(e.into()),
            Err(e) => (AppConfig::from_env(), Some(e)),
        }
    } else {
        (AppConfig::from_env(), None)
    };

    init_tracing(&app_cfg);

    match load_error {
        Some(e) => {
            error!("Failed to load config: {}. Using defaults.", e);
        }
        None if config_path.exists() => {
            info!("Configuration loaded from {}", config_path.display());
        }
        None => {
            info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
        }
    }
    app_cfg.validate()?;

    info!("Starting Auth Service...");

    if app_cfg.secret_generated {
        warn!("No token secret configured, generated one for this process. Sessions end on restart");
    }

    // ── Credential store ───────────────────────────────────────
    let mut db = None;
    let store: Arc<dyn CredentialStore> = match app_cfg.storage.backend {
        StorageBackend::Memory => {
            info!("Credential store: in-memory");
            Arc::new(InMemoryCredentialStore::new())
        }
        StorageBackend::Database => {
            let db_config = DatabaseConfig::from(&app_cfg);
            let conn = match init_database(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to connect to database: {}", e);
                    return Err(e.into());
                }
            };
            db = Some(conn.clone());
            Arc::new(UserRepository::new(conn))
        }
    };

    let settings = AuthSettings::from(&app_cfg);
    info!(
        "Session tokens expire after {}h",
        settings.jwt.expiration_hours
    );
    let mut auth = AuthService::with_system_clock(store, settings);
    if let Some(conn) = &db {
        auth = auth.with_revocation_store(Arc::new(RevokedTokenRepository::new(conn.clone())));
        if let Err(e) = auth.restore_revocations().await {
            error!("Failed to restore revoked tokens: {}", e);
            return Err(e.into());
        }
    }
    let auth = Arc::new(auth);

    if let Some(password) = &app_cfg.admin.password {
        match auth.bootstrap_admin(&app_cfg.admin.username, password).await {
            Ok(true) => warn!("Default admin created. Change its password immediately"),
            Ok(false) => {}
            Err(e) => error!("Failed to create admin user: {}", e),
        }
    }

    // ── Background tasks & shutdown ────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    let sweeper = start_revocation_sweeper(
        auth.registry(),
        auth.revocation_store(),
        shutdown_signal.clone(),
        app_cfg.security.revocation_sweep_secs,
    );

    // ── REST API ───────────────────────────────────────────────
    let api_router = create_api_router(auth);

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown_signal.clone();
    let api_server = axum::serve(
        listener,
        api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        api_shutdown.wait().await;
        info!("REST API server received shutdown signal");
    });

    if let Err(e) = api_server.await {
        error!("REST API server error: {}", e);
    }

    // ── Final cleanup ──────────────────────────────────────────
    shutdown_signal.trigger();
    let completed = shutdown
        .shutdown_with_cleanup(|| async move {
            if let Err(e) = sweeper.await {
                warn!("Revocation sweeper task failed: {}", e);
            }
            if let Some(db) = db {
                match db.close().await {
                    Ok(()) => info!("Database connection closed"),
                    Err(e) => warn!("Error closing database connection: {}", e),
                }
            }
        })
        .await;

    if !completed {
        warn!("Cleanup did not finish in time");
    }

    info!("Auth Service shutdown complete");
    Ok(())
}

/// Initialize tracing from the logging section. `RUST_LOG` wins over the
/// configured level.
fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
