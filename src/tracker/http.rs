use super::error::TrackerError;
use super::request::AnnounceRequest;
use super::response::{parse_announce_response, AnnounceResponse};
use reqwest::header::CONNECTION;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const CLIENT_IDENTITY: &str = concat!("swarmlet/", env!("CARGO_PKG_VERSION"));

/// An HTTP(S) tracker endpoint.
pub struct HttpTracker {
    client: Client,
    url: String,
}

impl HttpTracker {
    pub fn new(url: &str) -> Result<Self, TrackerError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TrackerError::InvalidUrl(url.to_string()));
        }

        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(CLIENT_IDENTITY)
            .build()
            .map_err(TrackerError::Http)?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// Sends one announce and decodes the response.
    ///
    /// Transport failures and non-2xx statuses are recoverable; the caller
    /// decides whether to retry, typically after the interval from a prior
    /// response.
    pub async fn announce(
        &self,
        request: &AnnounceRequest,
    ) -> Result<AnnounceResponse, TrackerError> {
        let url = format!("{}?{}", self.url, request.query_string());
        debug!(event = request.event.as_str(), %url, "tracker announce");

        let response = self
            .client
            .get(&url)
            .header(CONNECTION, "close")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::BadStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        parse_announce_response(&body)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
