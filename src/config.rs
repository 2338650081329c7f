//! Configuration constants for the Capstan API client.

use std::time::Duration;

/// Default base address for the hosted Capstan platform.
pub const DEFAULT_ADDRESS: &str = "https://app.capstan.io";

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("capstan-api/", env!("CARGO_PKG_VERSION"));

/// Connect timeout for the default transport.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout for the default transport.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How long idle pooled connections are kept alive.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum idle pooled connections per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 8;
