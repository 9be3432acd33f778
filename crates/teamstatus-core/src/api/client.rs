//! HTTP implementation of the Team Repository.
//!
//! Endpoints, relative to the configured base URL (by default
//! `http://localhost:5000/api/teams`):
//!
//! | Operation     | Request                                      |
//! |---------------|----------------------------------------------|
//! | list          | `GET /`                                      |
//! | get           | `GET /{id}`                                  |
//! | create        | `POST /`                                     |
//! | update        | `PUT /{id}`                                  |
//! | delete        | `DELETE /{id}`                               |
//! | bulk delete   | `DELETE /` with `{"ids": [...]}`             |
//! | status        | `PUT /{id}/status` with `{"field", "value"}` |
//! | reorder       | `PUT /order` with `{"order": [...]}`         |

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{ApprovalStatus, NewTeam, StatusField, Team, TeamId};
use crate::repository::TeamRepository;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds when the config does not set one.
/// There is no other timeout: a stalled request keeps its action pending
/// until this fires.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the teams backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a client for the given base URL with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API URL cannot be used as a base: {}", base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Create a client from the resolved configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.api_url(), config.request_timeout())
    }

    /// Set the first rate-limit backoff delay; later retries double it.
    pub fn with_backoff(mut self, initial: Duration) -> Self {
        self.initial_backoff = initial;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    /// Segments are percent-encoded, so opaque ids are safe to pass through.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    async fn send(&self, method: Method, url: Url, body: Option<&Value>) -> Result<reqwest::Response> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            debug!(%method, %url, "Sending request");
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header(header::ACCEPT, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(
                        %url,
                        retry = retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<T> {
        let response = self.send(method, url.clone(), body).await?;
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}

#[async_trait]
impl TeamRepository for ApiClient {
    async fn list(&self) -> Result<Vec<Team>> {
        let teams: Vec<Team> = self.send_json(Method::GET, self.endpoint(&[]), None).await?;
        debug!(count = teams.len(), "Fetched teams");
        Ok(teams)
    }

    async fn get(&self, id: &TeamId) -> Result<Team> {
        self.send_json(Method::GET, self.endpoint(&[id.as_str()]), None)
            .await
            .with_context(|| format!("Failed to fetch team {}", id))
    }

    async fn create(&self, team: &NewTeam) -> Result<Team> {
        let body = serde_json::to_value(team)?;
        self.send_json(Method::POST, self.endpoint(&[]), Some(&body))
            .await
            .context("Failed to create team")
    }

    async fn update(&self, id: &TeamId, team: &Team) -> Result<Team> {
        let body = serde_json::to_value(team)?;
        self.send_json(Method::PUT, self.endpoint(&[id.as_str()]), Some(&body))
            .await
            .with_context(|| format!("Failed to update team {}", id))
    }

    async fn delete(&self, id: &TeamId) -> Result<()> {
        self.send(Method::DELETE, self.endpoint(&[id.as_str()]), None)
            .await
            .with_context(|| format!("Failed to delete team {}", id))?;
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[TeamId]) -> Result<()> {
        let body = json!({ "ids": ids });
        self.send(Method::DELETE, self.endpoint(&[]), Some(&body))
            .await
            .with_context(|| format!("Failed to delete {} teams", ids.len()))?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: &TeamId,
        field: StatusField,
        value: ApprovalStatus,
    ) -> Result<()> {
        let body = json!({ "field": field.api_name(), "value": value.as_str() });
        self.send(Method::PUT, self.endpoint(&[id.as_str(), "status"]), Some(&body))
            .await
            .with_context(|| format!("Failed to update {} for team {}", field.api_name(), id))?;
        Ok(())
    }

    async fn reorder(&self, order: &[TeamId]) -> Result<()> {
        let body = json!({ "order": order });
        self.send(Method::PUT, self.endpoint(&["order"]), Some(&body))
            .await
            .context("Failed to save team order")?;
        Ok(())
    }
}
