use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::post;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::configuration::{ConfigError, ServerConfig};
use crate::keys::KeyError;
use crate::metric::Metrics;
use crate::validate::{AppState, VALIDATE_PATH, enforce_timeout, validate_query, validate_url};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set up master key: {0}")]
    Key(#[from] KeyError),

    #[error("failed to bind listener: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Validate the config, bind the listener and build the router.
    pub async fn bootstrap(
        server_conf: &ServerConfig,
        metrics: Arc<Metrics>,
    ) -> Result<Self, ServerError> {
        server_conf.validate()?;

        if server_conf.expose_trace {
            log::warn!("expose_trace is enabled: responses will contain the master key");
        }

        let state = AppState::new(
            server_conf.key_provider()?,
            metrics,
            server_conf.expose_trace,
            server_conf.request_timeout(),
        );

        let listener = TcpListener::bind(server_conf.listen.as_str()).await?;
        log::info!("SDM validator listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            router: router(state),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until Ctrl-C.
    pub async fn run_forever(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(VALIDATE_PATH, post(validate_url).get(validate_query))
        .layer(middleware::from_fn_with_state(state.clone(), enforce_timeout))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
    }
    log::info!("shutting down");
}
