use std::time::Duration;

use jobwatch_core::{JobHandle, ProgressSnapshot};
use reqwest::{StatusCode, Url};

use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root; `progress/{handle}` is appended to its path.
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot carry a path"),
            ));
        }
        Ok(Self {
            base_url,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        })
    }
}

/// Source of job snapshots. The poller only talks to the network through this.
#[async_trait::async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch_progress(&self, handle: &JobHandle) -> Result<ProgressSnapshot, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestStatusClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestStatusClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// `{base}/progress/{handle}`, with the handle encoded as a single path segment.
    pub fn progress_url(&self, handle: &JobHandle) -> Result<Url, FetchError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::new(FailureKind::InvalidUrl, "base url cannot carry a path"))?
            .pop_if_empty()
            .push("progress")
            .push(handle.as_str());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl StatusClient for ReqwestStatusClient {
    async fn fetch_progress(&self, handle: &JobHandle) -> Result<ProgressSnapshot, FetchError> {
        let url = self.progress_url(handle)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::new(FailureKind::NotFound, handle.as_str()));
        }
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
