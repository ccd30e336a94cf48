use crate::api::routes;
use crate::config::{SharedConfig, AUTHZ_HEADER_ENV};
use crate::error::Error;
use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::Router;
use hyper::server::conn::AddrIncoming;
use std::future::Future;
use std::net::SocketAddr;
use tokio::task::JoinHandle;

/// A bound, not yet running, HTTP API server. Await it to serve until the process exits.
pub type Server = axum::Server<AddrIncoming, IntoMakeServiceWithConnectInfo<Router, SocketAddr>>;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
}

/// Bind the [`Config::bind_addr`][crate::config::Config::bind_addr] listener and compose the
/// router and logging middleware around it.
///
/// # Errors
///
/// Returns [`Error::Bind`] when the listener can't be bound.
pub fn bind(config: SharedConfig) -> Result<Server, Error> {
    if !config.authz_header.is_configured() {
        tracing::error!("{AUTHZ_HEADER_ENV} is not set, /authz will deny every request");
    }
    let builder = axum::Server::try_bind(&config.bind_addr)?;
    let app = routes::new(AppState { config });
    Ok(builder.serve(app.into_make_service_with_connect_info::<SocketAddr>()))
}

/// Wait until `shutdown` resolves or the spawned API server task ends, whichever comes first.
///
/// # Errors
///
/// Returns [`Error::Serve`] when the server stops with an error and [`Error::ServerTask`] when
/// its task panicked or was cancelled.
pub async fn supervise(
    api_handle: JoinHandle<hyper::Result<()>>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Error> {
    tokio::select! {
        () = shutdown => {
            tracing::info!("quitting from signal");
            Ok(())
        },
        api_res = api_handle => {
            let err = match api_res {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(err)) => Error::Serve(err),
                Err(join_err) => Error::ServerTask(join_err),
            };
            tracing::error!(error = ?err, "API server stopped");
            Err(err)
        }
    }
}
