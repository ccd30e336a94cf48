use anyhow::Result;
use edge_authz::config::LogFormat;
use edge_authz::{Config, SharedConfig};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config_file = std::env::args().nth(1);
    let config = config_init(config_file.as_deref())?;
    tracing_init(&config);
    if let Some(config_file) = config_file {
        tracing::debug!("loaded config from {config_file}");
    }

    let api_server = match edge_authz::bind_http(config.clone()) {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(error = ?err, "failed to start API on {}", &config.bind_addr);
            return Err(err.into());
        }
    };
    tracing::info!("API listening on {}", api_server.local_addr());
    let api_handle = tokio::spawn(api_server);

    let shutdown = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = ?err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };
    edge_authz::api::supervise(api_handle, shutdown).await?;
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.as_str().into());
    let (text, json) = match config.log_format {
        LogFormat::Text => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(std::io::stderr().is_terminal()),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };
    tracing_subscriber::registry()
        .with(text)
        .with(json)
        .with(filter)
        .init();
}

fn config_init(config_file: Option<&str>) -> Result<SharedConfig> {
    let config = match config_file {
        None => Config::from_env()?,
        Some(config_file) => Config::try_from_file(config_file)?,
    };
    Ok(Arc::new(config))
}
