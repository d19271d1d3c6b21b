//! HTTP client for the eBay Browse API.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MarketplaceConfig;
use crate::sources::{Result, SourceError};

/// Production eBay API endpoint.
const BASE_API_URL: &str = "https://api.ebay.com";

/// Sandbox eBay API endpoint.
const SANDBOX_API_URL: &str = "https://api.sandbox.ebay.com";

/// Default rate limit (requests per minute).
const DEFAULT_RATE_LIMIT: i64 = 120;

/// Length of one rate-limit window.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Default HTTP request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for creating a new Client.
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub rate_limit: i64,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: String, rate_limit: i64) -> Self {
        Self {
            base_url: BASE_API_URL.to_string(),
            api_key,
            rate_limit: if rate_limit > 0 {
                rate_limit
            } else {
                DEFAULT_RATE_LIMIT
            },
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

struct RateLimitState {
    window_start: Instant,
}

/// HTTP client for the eBay Browse API.
/// Handles authentication headers, rate limiting, and error handling.
pub struct Client {
    config: ClientConfig,
    http_client: HttpClient,
    request_count: AtomicI64,
    rate_limit_state: Mutex<RateLimitState>,
}

impl Client {
    /// Creates a new eBay API client.
    pub fn new(config: ClientConfig) -> Self {
        let http_client = HttpClient::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build http client");

        Self {
            config,
            http_client,
            request_count: AtomicI64::new(0),
            rate_limit_state: Mutex::new(RateLimitState {
                window_start: Instant::now(),
            }),
        }
    }

    /// Creates a new eBay API client from marketplace config.
    pub fn from_config(marketplace_config: &MarketplaceConfig) -> Self {
        let mut config = ClientConfig::new(
            marketplace_config.api_key.clone(),
            marketplace_config.rate_limit.map(i64::from).unwrap_or(DEFAULT_RATE_LIMIT),
        );
        if marketplace_config.sandbox {
            config.base_url = SANDBOX_API_URL.to_string();
        }
        if !marketplace_config.request_timeout.is_zero() {
            config.request_timeout = marketplace_config.request_timeout;
        }
        Self::new(config)
    }

    /// Sends a GET request to the eBay API and returns the raw body.
    pub async fn get(
        &self,
        endpoint: &str,
        params: &HashMap<String, String>,
    ) -> Result<Vec<u8>> {
        self.check_rate_limit()?;

        let mut sorted_params: Vec<_> = params.iter().collect();
        sorted_params.sort_by(|a, b| a.0.cmp(b.0));

        let query: String = sorted_params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let url = if query.is_empty() {
            format!("{}{}", self.config.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.config.base_url, endpoint, query)
        };

        debug!(endpoint = %endpoint, "sending request");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .header("X-EBAY-C-MARKETPLACE-ID", "EBAY_US")
            .send()
            .await?;
        self.increment_request_count();

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_client_error() || status.is_server_error() {
            return Err(self.parse_error_response(status, &body));
        }

        Ok(body.to_vec())
    }

    /// Verifies we haven't exceeded the rate limit.
    fn check_rate_limit(&self) -> Result<()> {
        let mut state = self
            .rate_limit_state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.window_start.elapsed() > RATE_LIMIT_WINDOW {
            self.request_count.store(0, Ordering::SeqCst);
            state.window_start = Instant::now();
        }

        let current = self.request_count.load(Ordering::SeqCst);
        if current >= self.config.rate_limit {
            return Err(SourceError::RateLimitExceeded {
                current,
                limit: self.config.rate_limit,
            });
        }

        Ok(())
    }

    /// Increments the request counter.
    fn increment_request_count(&self) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Creates a SourceError from an error response.
    fn parse_error_response(&self, status: StatusCode, body: &[u8]) -> SourceError {
        #[derive(Deserialize)]
        struct ErrorEnvelope {
            errors: Option<Vec<ApiErrorBody>>,
        }

        #[derive(Deserialize)]
        struct ApiErrorBody {
            #[serde(rename = "errorId")]
            error_id: Option<i64>,
            message: Option<String>,
        }

        let (code, message) = match serde_json::from_slice::<ErrorEnvelope>(body) {
            Ok(envelope) => match envelope.errors.and_then(|mut e| e.pop()) {
                Some(e) => (
                    e.error_id.unwrap_or(status.as_u16() as i64),
                    e.message
                        .unwrap_or_else(|| String::from_utf8_lossy(body).to_string()),
                ),
                None => (
                    status.as_u16() as i64,
                    String::from_utf8_lossy(body).to_string(),
                ),
            },
            Err(_) => (
                status.as_u16() as i64,
                String::from_utf8_lossy(body).to_string(),
            ),
        };

        warn!(code = code, message = %message, "api error");

        SourceError::Api { code, message }
    }

    /// Returns the current request count in the window.
    pub fn request_count(&self) -> i64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Returns the maximum requests per minute.
    pub fn rate_limit(&self) -> i64 {
        self.config.rate_limit
    }
}
