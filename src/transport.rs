//! Default HTTP transport.
//!
//! The client uses a shared `reqwest::Client` with connection pooling and
//! keep-alive. Callers who need proxies, custom TLS roots, or different
//! timeouts can pass their own client through [`Config::http`].
//!
//! [`Config::http`]: crate::client::Config

use crate::config::{
    CONNECT_TIMEOUT, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST, REQUEST_TIMEOUT, USER_AGENT,
};
use crate::error::{Error, Result};

/// Build the default transport used when no override is configured.
pub fn default_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .build()
        .map_err(|e| Error::Config(format!("failed to build default transport: {}", e)))
}
