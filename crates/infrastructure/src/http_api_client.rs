use std::time::Duration;

use locus_core::{AppError, AppResult};
use reqwest::header;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// JSON-over-HTTP client for the upstream REST and FHIR APIs.
///
/// Responses with a server-error status are retried with linear backoff;
/// every other failure is returned immediately.
#[derive(Clone)]
pub struct HttpApiClient {
    http_client: reqwest::Client,
    base_url: Url,
    authorization: Option<String>,
    max_attempts: u8,
    retry_backoff_ms: u64,
}

impl HttpApiClient {
    /// Creates a client rooted at `base_url`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        authorization: Option<String>,
        max_attempts: u8,
        retry_backoff_ms: u64,
    ) -> Self {
        Self {
            http_client,
            base_url: with_trailing_slash(base_url),
            authorization,
            max_attempts: max_attempts.max(1),
            retry_backoff_ms,
        }
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a directory path below the base URL.
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        let path = format!("{}/", path.trim_matches('/'));
        self.base_url.join(path.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid API path '{path}': {error}"))
        })
    }

    /// Resolves a server-provided link against the API origin.
    ///
    /// Relative links resolve against `issued_by`, the endpoint that returned
    /// them. Absolute links pointing at another origin keep their path and
    /// query but are sent to the configured origin, so links leaked by a
    /// proxied backend stay reachable.
    pub fn follow_link(&self, link: &str, issued_by: &Url) -> AppResult<Url> {
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                issued_by.join(link).map_err(|error| {
                    AppError::Validation(format!("invalid relative link '{link}': {error}"))
                })?
            }
            Err(error) => {
                return Err(AppError::Validation(format!(
                    "invalid link '{link}': {error}"
                )));
            }
        };

        if url.origin() == self.base_url.origin() {
            return Ok(url);
        }

        let mut rebased = self.base_url.clone();
        rebased.set_path(url.path());
        rebased.set_query(url.query());
        rebased.set_fragment(None);

        debug!(
            link = %link,
            rebased = %rebased,
            "rebased continuation link onto API origin"
        );

        Ok(rebased)
    }

    /// Issues a GET request and decodes the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let mut attempt = 0_u8;

        loop {
            attempt = attempt.saturating_add(1);
            match self.get_json_once::<T>(&url).await {
                Err(error) if error.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "retrying upstream request"
                    );
                    let delay = self.retry_backoff_ms.saturating_mul(u64::from(attempt));
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                result => return result,
            }
        }
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &Url) -> AppResult<T> {
        let mut request = self
            .http_client
            .get(url.clone())
            .header(header::ACCEPT, "application/json");
        if let Some(authorization) = &self.authorization {
            request = request.header(header::AUTHORIZATION, authorization.as_str());
        }

        let response = request.send().await.map_err(|error| {
            AppError::Transport(format!("request to '{url}' failed: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        response.json::<T>().await.map_err(|error| {
            AppError::Internal(format!("failed to parse response body from '{url}': {error}"))
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(path.as_str());
    }

    url
}
