use std::sync::Arc;
use std::time::Duration as StdDuration;

use auth_core::TokenCodec;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::domain::auth::ports::AuthServicePort;
use identity_service::domain::auth::ports::Mailer;
use identity_service::domain::auth::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::inbound::http::router::AppState;
use identity_service::outbound::email::LogMailer;
use identity_service::outbound::email::SmtpMailer;
use identity_service::outbound::rate_limit::FixedWindowRateLimiter;
use identity_service::outbound::repositories::account::PostgresAccountRepository;
use identity_service::outbound::repositories::token_ledger::PostgresTokenLedger;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        email_mode = %config.email.mode,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let codec = Arc::new(TokenCodec::new(
        config.jwt.access_secret.as_bytes(),
        config.jwt.refresh_secret.as_bytes(),
        Duration::minutes(config.jwt.access_ttl_minutes),
        Duration::days(config.jwt.refresh_ttl_days),
    ));

    let mailer: Arc<dyn Mailer> = if config.email.mode == "smtp" {
        Arc::new(SmtpMailer::new(
            &config.email.smtp_host,
            config.email.smtp_username.clone(),
            config.email.smtp_password.clone(),
            &config.email.from_address,
        )?)
    } else {
        tracing::warn!("Email mode is not smtp; messages will be logged, not delivered");
        Arc::new(LogMailer)
    };

    let rate_limiter = Arc::new(FixedWindowRateLimiter::new(
        StdDuration::from_secs(config.rate_limit.window_seconds),
        config.rate_limit.max_attempts,
    ));

    let accounts = Arc::new(PostgresAccountRepository::new(pg_pool.clone()));
    let ledger = Arc::new(PostgresTokenLedger::new(pg_pool));

    let auth_service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(
        accounts,
        ledger,
        mailer,
        rate_limiter,
        Arc::clone(&codec),
        config.email.client_url.clone(),
        Duration::days(config.jwt.refresh_ttl_days),
    ));

    let state = AppState {
        auth_service,
        cookie_secure: config.server.cookie_secure,
        refresh_max_age: Duration::days(config.jwt.refresh_ttl_days).num_seconds(),
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;

    Ok(())
}
