//! HTTP server exposing the climate dataset as JSON.
//!
//! Routes:
//! - `GET /` - HTML list of the available routes.
//! - `GET /api/v1.0/precipitation` - `{date: prcp}` for every measurement.
//! - `GET /api/v1.0/stations` - every station id and name.
//! - `GET /api/v1.0/tobs` - trailing year of observations of the most active station.
//! - `GET /api/v1.0/:start` - temperature stats from `start` onwards.
//! - `GET /api/v1.0/:start/:end` - temperature stats between `start` and `end`.

pub mod error;
mod routes;

use crate::dataset::store::ClimateStore;
use crate::error::ClimateError;
use axum::routing::get;
use axum::Router;
use log::{error, info};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

pub use error::ApiError;

/// Application state shared across handlers.
pub struct AppState {
    pub store: ClimateStore,
}

/// Server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Builds the router with the store injected as shared state.
pub fn router(store: ClimateStore) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/", get(routes::home))
        .route("/api/v1.0/precipitation", get(routes::precipitation))
        .route("/api/v1.0/stations", get(routes::stations))
        .route("/api/v1.0/tobs", get(routes::tobs))
        .route("/api/v1.0/:start", get(routes::stats_from))
        .route("/api/v1.0/:start/:end", get(routes::stats_between))
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(store: ClimateStore, config: ServerConfig) -> Result<(), ClimateError> {
    let app = router(store);
    let addr = config.socket_addr();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ClimateError::Bind(addr, e))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ClimateError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            // Without a signal handler, keep serving until the process is killed.
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
