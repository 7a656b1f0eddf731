//! Octosend async client implementation.

use crate::domain::Domain;
use crate::filter::Filter;
use crate::spooler::{Spooler, SpoolerType};
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Default endpoint of the Octosend v3.0 API.
pub const DEFAULT_BASE_URL: &str = "https://api.octosend.com/api/3.0";

/// Header carrying the API key on every authenticated request.
const API_KEY_HEADER: &str = "X-RMTA-API-Key";

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "api-key")]
    api_key: String,
}

/// Async client for the Octosend email dispatch API.
///
/// Use [`Client::new`] when you already hold an API key, or build an
/// unauthenticated client with [`Client::builder`] and call
/// [`Client::authenticate`] to trade credentials for a key.
///
/// Cloning is cheap; resource handles ([`Domain`], [`Spooler`], ...) keep
/// their own clone. Authenticate *before* creating handles, as clones do not
/// observe a key obtained later.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for the default API endpoint with an existing key.
    ///
    /// # Examples
    /// ```no_run
    /// # use octosend_client::Client;
    /// # fn main() -> Result<(), octosend_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Get the API key currently attached to outgoing requests, if any.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Exchange account credentials for an API key.
    ///
    /// On success the returned key is stored and sent with every subsequent
    /// request from this client.
    ///
    /// # Examples
    /// ```no_run
    /// # use octosend_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), octosend_client::Error> {
    /// let mut client = Client::builder().build()?;
    /// client.authenticate("user@example.com", "hunter2").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let params = json!({ "username": username, "password": password });
        let response = self.call("authenticate", Some(&params)).await?;
        let auth: AuthResponse = serde_json::from_value(response)
            .map_err(|_| Error::ResponseParse("authenticate reply carries no `api-key`"))?;
        self.api_key = Some(auth.api_key);
        Ok(())
    }

    /// Issue a raw API call.
    ///
    /// This is the low-level escape hatch every typed method funnels through.
    /// `params = None` issues a GET; a body issues a POST with a JSON
    /// payload. Non-2xx responses surface as [`Error::Api`] with status,
    /// headers, and body preserved.
    pub async fn call(&self, endpoint: &str, params: Option<&Value>) -> Result<Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        let mut request = match params {
            Some(body) => self.http.post(&url).json(body),
            None => self.http.get(&url),
        };
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        debug!(endpoint, post = params.is_some(), "octosend api call");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            debug!(endpoint, %status, "octosend api call failed");
            return Err(Error::Api {
                status,
                headers,
                body,
            });
        }

        response.json().await.map_err(Into::into)
    }

    /// Filter over all sending domains visible to this account.
    pub fn domains(&self) -> Filter<Domain> {
        Filter::new(self.clone(), "domains/count", "domains/fetch", |client, raw| {
            Domain::from_value(client.clone(), raw)
        })
    }

    /// Filter over all spoolers visible to this account.
    ///
    /// Narrow it down with the [`Filter::domain`](Filter#method.domain) and
    /// [`Filter::state`](Filter#method.state) helpers before iterating.
    pub fn spoolers(&self) -> Filter<Spooler> {
        Filter::new(self.clone(), "spoolers/count", "spoolers/fetch", |client, raw| {
            Spooler::from_value(client.clone(), raw)
        })
    }

    /// Look up a single sending domain by name.
    pub async fn domain(&self, name: &str) -> Result<Domain> {
        let data = self.call(&format!("domain/{name}"), None).await?;
        Domain::from_value(self.clone(), data)
    }

    /// Look up a single spooler by token.
    pub async fn spooler(&self, token: &str) -> Result<Spooler> {
        let data = self.call(&format!("spooler/{token}"), None).await?;
        Spooler::from_value(self.clone(), data)
    }

    /// Account-wide statistics for a period, grouped as requested.
    ///
    /// The reply shape is defined by the remote service and returned as raw
    /// JSON.
    pub async fn statistics(&self, period: &str, group_by: &str) -> Result<Value> {
        let params = json!({ "period": period, "groupBy": group_by });
        self.call("statistics/global", Some(&params)).await
    }

    /// Account-wide activity timeline for one spooler type.
    pub async fn timeline(&self, kind: SpoolerType) -> Result<Value> {
        let params = json!({ "type": kind });
        self.call("timeline/global", Some(&params)).await
    }
}

/// Builder for configuring an Octosend client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    api_key: Option<String>,
    user_agent: String,
    proxy: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Production API endpoint ([`DEFAULT_BASE_URL`])
    /// - No API key (anonymous; only `authenticate` will succeed)
    /// - `octosend-client/<version>` user agent
    /// - No proxy
    /// - 30 second request timeout
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: concat!("octosend-client/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the API endpoint URL.
    ///
    /// Useful for testing against a mock server or a staging deployment.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Attach an existing API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a proxy URL (e.g., "http://127.0.0.1:8080") for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the per-request timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client. Performs no network I/O.
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent)
            .timeout(self.timeout);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Client {
            http: builder.build()?,
            base_url: self.base_url,
            api_key: self.api_key,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
