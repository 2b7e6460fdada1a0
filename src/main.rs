use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use filmrank::{
    Account, AccountStore, AppConfig, AppState, FilmDocument, FilmStore, JsonFileStore,
    TokenIssuer, build_router,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::parse();
    info!(?config, "starting filmrank");

    let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl())
        .context("invalid token configuration")?;

    let accounts = AccountStore::open(
        Arc::new(JsonFileStore::<Vec<Account>>::new(&config.accounts_path)),
        config.bcrypt_cost,
    )
    .await;

    // Film routes answer 503 until this load finishes.
    let films = Arc::new(FilmStore::new(Arc::new(
        JsonFileStore::<FilmDocument>::new(&config.films_path),
    )));
    tokio::spawn({
        let films = Arc::clone(&films);
        async move {
            films.load().await;
        }
    });

    if !config.require_auth() {
        warn!("bearer authentication disabled for film routes");
    }

    let state = AppState::new(films, Arc::new(accounts), Arc::new(tokens))
        .require_auth(config.require_auth());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind))?;

    info!(address = %config.bind, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("filmrank=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
