use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gatehouse_db::Dialect;
use gatehouse_mail::{EmailConfig, LogMailer, Mailer, SmtpMailer, TemplateRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_api::background::token_retention;
use gatehouse_api::config::ServerConfig;
use gatehouse_api::router::build_app_router;
use gatehouse_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let permissions = config
        .load_permission_table()
        .expect("Failed to load permission table");
    let option_schema = config
        .load_option_schema()
        .expect("Failed to load preferences schema");

    // --- Database ---
    let dialect = Dialect::from_url(&config.database_url)
        .expect("DATABASE_URL must be a postgres, mysql or sqlite URL");

    let pool = gatehouse_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!(?dialect, "Database connection pool created");

    gatehouse_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gatehouse_db::run_migrations(&pool, dialect)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Mail ---
    let mailer: Arc<dyn Mailer> = if config.mail_log_only {
        tracing::warn!("MAIL_LOG_ONLY is set; e-mail tokens will only be logged");
        Arc::new(LogMailer)
    } else {
        let email_config = EmailConfig::from_env()
            .expect("SMTP_HOST must be set (or MAIL_LOG_ONLY=true)");
        let mut templates = TemplateRegistry::new();
        for mail in [
            &config.identity.user_activation,
            &config.identity.password_reset,
            &config.identity.one_time_password,
        ] {
            templates
                .register_file(Path::new(&mail.template))
                .expect("Failed to load e-mail template");
        }
        Arc::new(SmtpMailer::new(email_config, templates).expect("Failed to build SMTP mailer"))
    };

    // --- App state ---
    let retention_interval = Duration::from_secs(config.token_retention_interval_secs);
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let router_config = config.clone();
    let state = AppState::new(pool, dialect, config, permissions, option_schema, mailer);

    // --- Token retention ---
    let retention_cancel = tokio_util::sync::CancellationToken::new();
    let retention_handle = tokio::spawn(token_retention::run(
        Arc::clone(&state.identity),
        retention_interval,
        retention_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state, &router_config);

    // --- Start server ---
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    tracing::info!("Token retention job stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
