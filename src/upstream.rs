//! HTTP client for the FastAPI chat backend.

use serde_json::Value;
use url::Url;

use crate::error::ChatError;

/// Client for the upstream chat endpoint.
///
/// Holds one [`reqwest::Client`] for the lifetime of the process so the
/// connection pool is shared by every request. No retry and no timeout are
/// configured; a hanging upstream holds only the request waiting on it.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    url: Url,
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl UpstreamClient {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// POST `body` as JSON and hand back the raw response.
    ///
    /// The status code is not checked here; callers decide whether it matters.
    pub async fn post_json(&self, body: &Value) -> Result<reqwest::Response, ChatError> {
        let resp = self.http.post(self.url.clone()).json(body).send().await?;

        tracing::debug!(
            name: "upstream.responded",
            url = %self.url,
            status = resp.status().as_u16(),
            "Upstream responded"
        );

        Ok(resp)
    }
}
