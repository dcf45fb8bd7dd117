use crate::dataset::error::DatasetError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use log::error;
use serde::Serialize;
use thiserror::Error;

/// Failures a route handler can report to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("dataset query failed")]
    Dataset(#[from] DatasetError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Dataset(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Dataset(source) = &self {
            error!("Request failed: {} ({:?})", source, source);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
