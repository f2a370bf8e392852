//! HTTP client for the ta-server API.

use crate::error::Error;
use crate::types::*;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Header carrying the acting user.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the ta-server API.
#[derive(Debug, Clone)]
pub struct TaClient {
    client: Client,
    base_url: String,
}

impl TaClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Watchlist
    // ========================================================================

    /// Lists the user's watchlist.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_watchlist(&self, user_id: &str) -> Result<Vec<TickerItem>, Error> {
        let url = format!("{}/watchlist", self.base_url);
        let resp = self.as_user(self.client.get(&url), user_id)?.send().await?;
        self.handle_response(resp).await
    }

    /// Adds or replaces a ticker.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn add_ticker(
        &self,
        user_id: &str,
        symbol: &str,
        on_hand: bool,
    ) -> Result<TickerItem, Error> {
        let url = format!("{}/watchlist", self.base_url);
        let request = AddTickerRequest {
            symbol: symbol.to_string(),
            on_hand,
        };
        let resp = self
            .as_user(self.client.post(&url), user_id)?
            .json(&request)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Removes a ticker. Succeeds when the symbol was absent.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn remove_ticker(&self, user_id: &str, symbol: &str) -> Result<(), Error> {
        let url = format!("{}/watchlist/{}", self.base_url, symbol);
        let resp = self.as_user(self.client.delete(&url), user_id)?.send().await?;
        self.handle_empty_response(resp).await
    }

    // ========================================================================
    // Insights
    // ========================================================================

    /// Lists market insights.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_insights(&self, user_id: &str) -> Result<Vec<Insight>, Error> {
        let url = format!("{}/insights", self.base_url);
        let resp = self.as_user(self.client.get(&url), user_id)?.send().await?;
        self.handle_response(resp).await
    }

    /// Lists portfolio insights.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_portfolio(&self, user_id: &str) -> Result<Vec<Insight>, Error> {
        let url = format!("{}/portfolio", self.base_url);
        let resp = self.as_user(self.client.get(&url), user_id)?.send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn as_user(&self, builder: RequestBuilder, user_id: &str) -> Result<RequestBuilder, Error> {
        if user_id.trim().is_empty() {
            return Err(Error::InvalidRequest("user id cannot be empty".to_string()));
        }
        Ok(builder.header(USER_ID_HEADER, user_id))
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn handle_empty_response(&self, resp: reqwest::Response) -> Result<(), Error> {
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(resp).await)
        }
    }

    async fn error_from(resp: reqwest::Response) -> Error {
        let status = resp.status().as_u16();
        let text = resp.text().await.unwrap_or_default();

        if status == 404 {
            return Error::NotFound(text);
        }

        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => Error::Api {
                status,
                code: Some(body.code),
                message: body.error,
            },
            Err(_) => Error::Api {
                status,
                code: None,
                message: text,
            },
        }
    }
}
