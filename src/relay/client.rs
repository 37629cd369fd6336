use isahc::{config::Configurable, http::StatusCode, prelude::AsyncReadResponseExt};
use serde_json::Value;

use crate::{Error, config::Upstream};

/// Failure modes of one host lookup.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("no data for this ip")]
    NotFound,
    #[error("upstream responded with status {status}{}", format_message(.message))]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("{0}")]
    Transport(#[from] isahc::Error),
    #[error("invalid upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
}

fn format_message(message: &Option<String>) -> String {
    match message {
        Some(message) => format!(": {message}"),
        None => String::new(),
    }
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::NotFound => Some(StatusCode::NOT_FOUND.as_u16()),
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct HostIntelClient {
    inner: isahc::HttpClient,
    base_url: String,
    api_key: String,
}

impl HostIntelClient {
    pub fn new(upstream: &Upstream, api_key: impl Into<String>) -> Result<Self, Error> {
        let inner = isahc::HttpClient::builder()
            .timeout(upstream.timeout())
            .default_header("accept", "application/json")
            .default_header(
                "user-agent",
                format!("scan-relay/{}", env!("CARGO_PKG_VERSION")),
            )
            .build()?;

        Ok(Self {
            inner,
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn host_url(&self, ip: &str) -> String {
        format!(
            "{base}/shodan/host/{ip}?key={key}",
            base = self.base_url,
            key = self.api_key
        )
    }

    /// Single attempt, no retry. A 404 is reported as `NotFound`.
    pub async fn host(&self, ip: &str) -> Result<Value, UpstreamError> {
        let mut response = self.inner.get_async(self.host_url(ip)).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::NotFound);
        }
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error")?.as_str().map(str::to_owned));
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
