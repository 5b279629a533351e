use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{PollError, SnapshotSource};
use crate::routes::snapshot::SnapshotResponse;

/// Error body returned by the snapshot endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

/// HTTP client for `GET /data`.
pub struct SnapshotClient {
    http_client: Client,
    data_url: String,
}

impl SnapshotClient {
    /// # Errors
    ///
    /// Returns `PollError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, PollError> {
        let http_client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PollError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            data_url: format!("{}/data", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Fetch and decode one snapshot.
    ///
    /// # Errors
    ///
    /// `PollError::EmptyStore` when the server has no readings yet,
    /// `PollError::Status` for other error statuses, and
    /// `PollError::Transport` / `PollError::Decode` for connection or body failures.
    pub async fn fetch_snapshot(&self) -> Result<SnapshotResponse, PollError> {
        let response = self
            .http_client
            .get(&self.data_url)
            .send()
            .await
            .map_err(|e| PollError::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<ErrorBody> = response.json().await.ok();
            return Err(classify_error(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| PollError::Decode(format!("Failed to parse snapshot: {e}")))
    }
}

fn classify_error(status: StatusCode, body: Option<ErrorBody>) -> PollError {
    match body {
        Some(body)
            if status == StatusCode::SERVICE_UNAVAILABLE
                && body.code.as_deref() == Some("empty_store") =>
        {
            PollError::EmptyStore
        }
        Some(body) => PollError::Status {
            status: status.as_u16(),
            message: body.error,
        },
        None => PollError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        },
    }
}

#[async_trait]
impl SnapshotSource for SnapshotClient {
    async fn fetch(&self) -> Result<SnapshotResponse, PollError> {
        self.fetch_snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(error: &str, code: Option<&str>) -> Option<ErrorBody> {
        Some(ErrorBody {
            error: error.to_string(),
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn empty_store_is_recognised() {
        let err = classify_error(
            StatusCode::SERVICE_UNAVAILABLE,
            body("No readings recorded yet", Some("empty_store")),
        );
        assert!(matches!(err, PollError::EmptyStore));
    }

    #[test]
    fn store_outage_stays_a_status_error() {
        let err = classify_error(
            StatusCode::SERVICE_UNAVAILABLE,
            body("Reading store unavailable", Some("store_unavailable")),
        );
        assert!(matches!(err, PollError::Status { status: 503, .. }));

        let err = classify_error(StatusCode::BAD_GATEWAY, None);
        assert!(matches!(err, PollError::Status { status: 502, ref message } if message == "Bad Gateway"));
    }

    #[test]
    fn data_url_is_normalised() {
        let client = SnapshotClient::new("http://reef.local:8085/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.data_url(), "http://reef.local:8085/data");
    }
}
