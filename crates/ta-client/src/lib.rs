//! HTTP client library for the ta-server API.
//!
//! This crate provides a typed HTTP client for the watchlist and insight
//! endpoints. Every call except the health check acts on behalf of a user,
//! sent as the `X-User-ID` header.
//!
//! # Example
//!
//! ```no_run
//! use ta_client::{ClientConfig, TaClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ta_client::Error> {
//!     let client = TaClient::new(ClientConfig {
//!         base_url: "http://localhost:8080".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     client.add_ticker("alice", "TSLA", true).await?;
//!     for item in client.list_watchlist("alice").await? {
//!         println!("{} on_hand={}", item.symbol, item.on_hand);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientConfig, TaClient, USER_ID_HEADER};
pub use error::Error;
pub use types::*;
