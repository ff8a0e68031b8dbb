use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use flighthours_core::id_codec::IdCodec;
use flighthours_core::messages::MessageCatalog;
use flighthours_core::tx::TransactionManager;
use flighthours_db::repositories::PgMessageRepo;
use flighthours_db::tx::PgTransactionManager;
use flighthours_identity::{ActionTokenVerifier, IdentityProvider, KeycloakClient};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flighthours_api::config::{self, DatabaseConfig, ServerConfig};
use flighthours_api::router::build_app_router;
use flighthours_api::services::Services;
use flighthours_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "flighthours_api=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    let db_config = DatabaseConfig::from_env().context("Invalid database configuration")?;
    let codec_config =
        config::id_codec_from_env().context("Invalid identifier codec configuration")?;
    let keycloak_config = config::keycloak_from_env().context("Invalid Keycloak configuration")?;
    let action_token_config = config::action_tokens_from_env(&keycloak_config)
        .context("Invalid action token configuration")?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = flighthours_db::create_pool(&db_config.url, &db_config.pool)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    flighthours_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    tracing::info!("Database health check passed");

    flighthours_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let tx: Arc<dyn TransactionManager> = Arc::new(PgTransactionManager::new(pool.clone()));

    // --- Message catalog ---
    let catalog = Arc::new(MessageCatalog::new());
    let loaded = catalog
        .load(&PgMessageRepo::new(pool.clone()))
        .await
        .context("Failed to load the message catalog")?;
    tracing::info!(count = loaded, "Message catalog loaded");

    // --- Identifier codec ---
    let codec = IdCodec::new(&codec_config).context("Invalid identifier codec settings")?;

    // --- Identity provider ---
    let identity: Arc<dyn IdentityProvider> = Arc::new(KeycloakClient::new(keycloak_config));
    let action_tokens = ActionTokenVerifier::new(&action_token_config);

    // --- App state ---
    let services = Services::postgres(
        &pool,
        Arc::clone(&tx),
        identity,
        Arc::clone(&catalog),
        action_tokens,
        config.send_verification_email,
    );
    let state = AppState {
        config: Arc::new(config.clone()),
        codec: Arc::new(codec),
        messages: catalog,
        services: Arc::new(services),
        tx,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let shutdown = CancellationToken::new();
    let drain = shutdown.clone();
    let serve = axum::serve(listener, app)
        .with_graceful_shutdown(async move { drain.cancelled().await });
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        joined = &mut server => {
            joined.context("Server task failed")?.context("Server error")?;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    // --- Graceful shutdown ---
    tracing::info!("Shutdown signal received, draining connections");
    shutdown.cancel();
    match tokio::time::timeout(Duration::from_secs(config.shutdown_timeout_secs), server).await {
        Ok(joined) => joined.context("Server task failed")?.context("Server error")?,
        Err(_) => tracing::warn!(
            timeout_secs = config.shutdown_timeout_secs,
            "Drain timed out, abandoning open connections"
        ),
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
