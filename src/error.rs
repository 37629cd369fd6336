use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::relay::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("upstream request failed")]
    Upstream {
        status: Option<u16>,
        detail: String,
    },
    #[error("internal_server_error")]
    Internal(String),
    #[error("internal_server_error")]
    Isahc(#[from] isahc::Error),
}

#[derive(Serialize)]
struct ErrorJson {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            warn!("rejected request: {}", self);
        } else {
            error!(
                upstream_status = ?self.upstream_status(),
                "{}: {}",
                self,
                self.detail().unwrap_or_default()
            );
        }

        let body = ErrorJson {
            error: self.to_string(),
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}

impl Error {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn missing_target() -> Self {
        Self::validation("missing target")
    }

    pub fn unsupported_format() -> Self {
        Self::validation("unsupported format")
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Error::Internal(_) | Error::Isahc(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Error::Validation(_) => None,
            Error::Upstream { detail, .. } => Some(detail.clone()),
            Error::Internal(detail) => Some(detail.clone()),
            Error::Isahc(err) => Some(err.to_string()),
        }
    }
}

impl Error {
    /// Status the provider answered with, when it answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<UpstreamError> for Error {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream {
            status: err.status(),
            detail: err.to_string(),
        }
    }
}
