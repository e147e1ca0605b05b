//! Supabase REST client.
//!
//! Constructed once by the composing process and handed to consumers through
//! [`crate::AppState`]. There is no global instance.

use reqwest::RequestBuilder;
use url::Url;

use crate::config::DatabaseConfig;
use crate::error::ChatError;

#[derive(Clone)]
pub struct DatabaseClient {
    http: reqwest::Client,
    base_url: Url,
    anon_key: String,
}

impl std::fmt::Debug for DatabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DatabaseClient {
    /// Build a client from `config`.
    ///
    /// Fails with [`ChatError::Config`] when the project URL or the anon key is
    /// missing or empty, or when the URL does not parse. Values are used as
    /// given.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, ChatError> {
        let (Some(url), Some(anon_key)) = (
            present(config.url.as_deref()),
            present(config.anon_key.as_deref()),
        ) else {
            return Err(ChatError::Config(
                "Missing Supabase environment variables".to_string(),
            ));
        };

        let base_url = Url::parse(url)
            .map_err(|e| ChatError::Config(format!("invalid Supabase url {url:?}: {e}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key: anon_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET request against `/rest/v1/{table}`, carrying the project's
    /// `apikey` and bearer headers.
    pub fn table(&self, table: &str) -> RequestBuilder {
        let mut url = self.base_url.clone();
        url.set_path(&format!(
            "{}/rest/v1/{table}",
            self.base_url.path().trim_end_matches('/')
        ));

        self.http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
