use crate::dataset::error::DatasetError;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Failed to bind HTTP listener on {0}")]
    Bind(SocketAddr, #[source] std::io::Error),

    #[error("HTTP server terminated with an error")]
    Serve(#[source] std::io::Error),
}
