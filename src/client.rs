//! Main client entry point.

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};
use url::Url;

use crate::config::DEFAULT_ADDRESS;
use crate::document::{self, Resource, MEDIA_TYPE};
use crate::error::{Error, Result};
use crate::request::Request;
use crate::transport;

/// Client configuration.
#[derive(Clone)]
pub struct Config {
    /// Base address of the Capstan platform. An empty string selects
    /// [`DEFAULT_ADDRESS`].
    pub address: String,

    /// API token used as the bearer credential on every request. Required.
    pub token: String,

    /// Transport override. `None` selects the default pooled client built by
    /// [`transport::default_client`].
    pub http: Option<reqwest::Client>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: String::new(),
            http: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Capstan API client.
///
/// # Examples
///
/// ```rust,no_run
/// use capstan_api::{Client, Request, Resource};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct Organization {
///     id: Option<String>,
///     name: String,
/// }
///
/// impl Resource for Organization {
///     const KIND: &'static str = "organizations";
/// }
///
/// # async fn example() -> capstan_api::Result<()> {
/// let client = Client::builder()
///     .token("example-token")
///     .build()?;
///
/// let orgs: Vec<Organization> = client
///     .execute_list(Request::get("/api/v2/organizations"))
///     .await?;
///
/// for org in orgs {
///     println!("{}", org.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Client {
    address: Url,
    auth: HeaderValue,
    http: reqwest::Client,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("address", &self.address.as_str())
            .finish()
    }
}

impl Client {
    /// Create a client from a full configuration.
    pub fn new(config: Config) -> Result<Self> {
        if config.token.is_empty() {
            return Err(Error::Config("missing API token".to_string()));
        }

        let address = if config.address.is_empty() {
            DEFAULT_ADDRESS
        } else {
            config.address.as_str()
        };
        let address = Url::parse(address)
            .map_err(|e| Error::Config(format!("invalid base address `{}`: {}", address, e)))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| Error::Config("token is not a valid header value".to_string()))?;
        auth.set_sensitive(true);

        let http = match config.http {
            Some(http) => http,
            None => transport::default_client()?,
        };

        Ok(Self { address, auth, http })
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Execute a request and decode the response as a single resource.
    pub async fn execute<T: Resource>(&self, request: Request) -> Result<T> {
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;
        document::unmarshal(&body)
    }

    /// Execute a request and decode the response as a resource list,
    /// preserving server order.
    pub async fn execute_list<T: Resource>(&self, request: Request) -> Result<Vec<T>> {
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;
        document::unmarshal_list(&body)
    }

    /// Execute a request and hand back the status-validated response with
    /// its body unread.
    pub async fn execute_raw(&self, request: Request) -> Result<reqwest::Response> {
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request) -> Result<reqwest::Response> {
        let url = self.request_url(&request);

        // An encoded payload takes precedence over a raw body.
        let body = match (request.document, request.raw_body) {
            (Some(document), _) => Some(document?),
            (None, raw) => raw,
        };

        let mut headers = request.headers.unwrap_or_default();
        headers.insert(AUTHORIZATION, self.auth.clone());
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        }

        debug!(
            method = request.method.as_str(),
            url = url.as_str(),
            "Dispatching request"
        );

        let mut builder = self.http.request(request.method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        check_response(response).await
    }

    /// Compose the request URL: the path replaces the base path, query
    /// parameters are percent-encoded, and no `?` is emitted without them.
    fn request_url(&self, request: &Request) -> Url {
        let mut url = self.address.clone();
        url.set_path(&request.path);
        url.set_query(None);
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// Map response status to the error taxonomy before any decoding happens.
///
/// 404 wins over everything else in the body. Other non-2xx statuses consume
/// the body so callers can see what the server said.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Request failed");
        return Err(Error::UnexpectedStatus {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: Config,
}

impl ClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.address = address.into();
        self
    }

    /// Set the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Use a caller-supplied `reqwest::Client` as the transport.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.config.http = Some(http);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        Client::new(self.config)
    }
}
