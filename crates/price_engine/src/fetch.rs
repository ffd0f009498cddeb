use std::time::Duration;

use futures_util::StreamExt;
use price_core::{FetchFailure, PricePayload, RequestKey};
use price_logging::price_debug;
use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_BASE_URL: &str = "https://rest.coinapi.io/v1/exchangerate";
pub const API_KEY_HEADER: &str = "X-CoinAPI-Key";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Rates live under `{base_url}/{SYMBOL}/{quote}`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub quote: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            quote: "USD".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 1024 * 1024,
        }
    }
}

/// Transport for one price lookup.
///
/// Implementations must give up promptly once `cancel` fires and report
/// [`FetchFailure::Cancelled`] rather than a generic failure.
#[async_trait::async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch(
        &self,
        key: &RequestKey,
        cancel: &CancellationToken,
    ) -> Result<PricePayload, FetchFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchFailure> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchFailure::Transport(err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn request_url(&self, key: &RequestKey) -> Result<reqwest::Url, FetchFailure> {
        let mut url = reqwest::Url::parse(&self.settings.base_url)
            .map_err(|err| FetchFailure::Transport(format!("invalid url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchFailure::Transport("invalid url: cannot be a base".to_string()))?
            .pop_if_empty()
            .push(key.symbol())
            .push(&self.settings.quote);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl PriceFetcher for ReqwestFetcher {
    async fn fetch(
        &self,
        key: &RequestKey,
        cancel: &CancellationToken,
    ) -> Result<PricePayload, FetchFailure> {
        let url = self.request_url(key)?;
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(api_key) = self.settings.api_key.as_deref() {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
            response = request.send() => response.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchFailure::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(map_reqwest_error)?;
            if bytes.len() as u64 + chunk.len() as u64 > self.settings.max_bytes {
                return Err(too_large(self.settings.max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }
        price_debug!("Fetched {} bytes for {}", bytes.len(), key);

        serde_json::from_slice(&bytes).map_err(|err| FetchFailure::Decode(err.to_string()))
    }
}

fn too_large(max_bytes: u64) -> FetchFailure {
    FetchFailure::Decode(format!("response larger than {max_bytes} bytes"))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        return FetchFailure::Transport("request timed out".to_string());
    }
    if err.is_decode() {
        return FetchFailure::Decode(err.to_string());
    }
    FetchFailure::Transport(err.to_string())
}
