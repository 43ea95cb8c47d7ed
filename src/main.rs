//! Sociora API server
//! Mission: Record every investment and revenue payout on an append-only ledger

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, time::interval};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sociora_backend::{
    api::{create_router, AppState},
    auth::{AuthState, JwtHandler, UserStore},
    config::{generate_secret, load_env, Config},
    ledger::open_ledger,
    middleware::RateLimitLayer,
    services::RevenueService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    let config = Config::parse();

    info!("🚀 Sociora backend starting");

    // Ledger
    let ledger_path = config.ledger_path();
    let ledger = open_ledger(
        config.ledger_backend,
        ledger_path.clone(),
        config.ledger_hash_records,
    )
    .with_context(|| format!("Failed to open {} ledger", config.ledger_backend.as_str()))?;

    let existing = ledger
        .get_all_transactions()
        .context("Failed to read ledger")?
        .len();
    info!(
        "📒 Ledger ready ({}): {} ({} records)",
        config.ledger_backend.as_str(),
        ledger_path.display(),
        existing
    );

    let revenue = RevenueService::new(
        ledger.clone(),
        config.revenue_split(),
        config.platform_account.clone(),
    )
    .context("Invalid revenue split")?;
    let app_state = AppState::new(ledger, revenue);

    // Authentication
    let jwt_secret = config.jwt_secret.clone().unwrap_or_else(|| {
        warn!("⚠️  JWT_SECRET not set, using a random secret (sessions end on restart)");
        generate_secret()
    });
    let admin_password = config.admin_password.clone().unwrap_or_else(|| {
        let generated = generate_secret();
        warn!(
            "⚠️  ADMIN_PASSWORD not set; a new admin account (if seeded) uses: {}",
            generated
        );
        generated
    });

    let auth_db_path = config.auth_db_path();
    let user_store = Arc::new(UserStore::new(
        &auth_db_path.to_string_lossy(),
        &admin_password,
    )?);
    let jwt_handler = Arc::new(JwtHandler::with_expiration(
        jwt_secret,
        config.jwt_expiration_hours,
    ));
    let auth_state = AuthState::new(user_store, jwt_handler);

    info!("🔐 Authentication initialized at: {}", auth_db_path.display());

    // Rate limiting with periodic cleanup of idle clients
    let rate_limiter = RateLimitLayer::new(config.rate_limit());
    tokio::spawn(rate_limit_cleanup(rate_limiter.clone()));

    let app = create_router(app_state, auth_state, rate_limiter)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

async fn rate_limit_cleanup(limiter: RateLimitLayer) {
    let mut ticker = interval(limiter.window());
    loop {
        ticker.tick().await;
        limiter.cleanup();
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sociora=debug,sociora_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
