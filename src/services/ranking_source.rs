//! HTTP client for the judging backend that owns the ranking.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::state::ranking::RankingItem;

const RANKING_PATH: &str = "admin/ranking/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures that can occur while pulling the ranking upstream.
#[derive(Debug, Error)]
pub enum RankingSourceError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build ranking client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The request never got a response.
    #[error("failed to send ranking request to `{url}`")]
    RequestSend {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The upstream answered with a non-success status.
    #[error("unexpected ranking response status {status} for `{url}`")]
    RequestStatus {
        /// Requested URL.
        url: String,
        /// Status returned by the upstream.
        status: StatusCode,
    },
    /// The body was not a ranking array.
    #[error("failed to decode ranking response for `{url}`")]
    DecodeResponse {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

/// Pulls `GET {base}/admin/ranking/` from the judging backend.
#[derive(Clone)]
pub struct RankingClient {
    client: Client,
    url: Arc<str>,
}

impl RankingClient {
    /// Build a client for the given base URL.
    pub fn new(base_url: &str) -> Result<Self, RankingSourceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| RankingSourceError::ClientBuilder { source })?;
        let url = format!("{}/{}", base_url.trim_end_matches('/'), RANKING_PATH);
        Ok(Self {
            client,
            url: Arc::from(url),
        })
    }

    /// Full URL of the ranking endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current ranking, in the order the upstream returns it.
    pub async fn fetch(&self) -> Result<Vec<RankingItem>, RankingSourceError> {
        let url = self.url.to_string();
        let response = self
            .client
            .get(self.url.as_ref())
            .send()
            .await
            .map_err(|source| RankingSourceError::RequestSend {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RankingSourceError::RequestStatus { url, status });
        }

        response
            .json::<Vec<RankingItem>>()
            .await
            .map_err(|source| RankingSourceError::DecodeResponse { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_without_double_slash() {
        let client = RankingClient::new("http://judging.local:3000/").unwrap();
        assert_eq!(client.url(), "http://judging.local:3000/admin/ranking/");

        let client = RankingClient::new("http://judging.local").unwrap();
        assert_eq!(client.url(), "http://judging.local/admin/ranking/");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_send_error() {
        let client = RankingClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.fetch().await,
            Err(RankingSourceError::RequestSend { .. })
        ));
    }
}
