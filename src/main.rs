use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tokio::signal;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use reception_call::app::AppStateBuilder;
use reception_call::config::{Cli, Config};

/// Env-filtered logging, to a non-blocking appender when a log file is
/// configured. The returned guard must stay alive for the process lifetime.
fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    let mut env_filter = EnvFilter::from_default_env();
    if let Some(Ok(level)) = config
        .log_level
        .as_ref()
        .map(|level| level.parse::<LevelFilter>())
    {
        env_filter = env_filter.add_directive(level.into());
    }

    match config.log_file {
        Some(ref log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_timer(LocalTime::rfc_3339())
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .try_init()?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_timer(LocalTime::rfc_3339()))
                .try_init()?;
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let mut config = match cli.conf {
        Some(ref path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("failed to load config from {}: {}, using defaults", path, e);
            Config::default()
        }),
        None => Config::default(),
    };
    if let Some(http) = cli.http {
        config.http_addr = http;
    }
    config.apply_env();

    let _log_guard = init_logging(&config)?;
    info!("starting reception-call service");

    let app_state = AppStateBuilder::new().with_config(config.clone()).build()?;

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("listening on http://{}", config.http_addr);

    let router = reception_call::handler::agent_router()
        .merge(reception_call::handler::status_router())
        .with_state(app_state.clone());

    tokio::select! {
        result = axum::serve(listener, router) => {
            if let Err(e) = result {
                warn!("http server error: {:?}", e);
            }
        }
        _ = app_state.token.cancelled() => {
            info!("cancellation requested");
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    info!("shutting down");
    Ok(())
}
