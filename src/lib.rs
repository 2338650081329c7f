//! # capstan-api
//!
//! Rust client library for the Capstan platform API.
//!
//! Capstan endpoints exchange resources wrapped in a document envelope
//! (`type`, `id`, `attributes`, `relationships`) and authenticate with a
//! bearer token. This crate handles the envelope, the credentials, and the
//! status-to-error mapping; callers describe each call with a [`Request`]
//! and pick how the response is decoded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use capstan_api::{Client, Request, Resource, Result};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Organization {
//!     id: Option<String>,
//!     name: String,
//! }
//!
//! impl Resource for Organization {
//!     const KIND: &'static str = "organizations";
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .token("example-token")
//!         .build()?;
//!
//!     let orgs: Vec<Organization> = client
//!         .execute_list(Request::get("/api/v2/organizations"))
//!         .await?;
//!
//!     for org in orgs {
//!         println!("{}", org.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod request;
pub mod transport;

// Re-exports for ergonomic usage
pub use client::{Client, ClientBuilder, Config};
pub use document::{Related, Resource, MEDIA_TYPE};
pub use error::{Error, Result};
pub use request::Request;
