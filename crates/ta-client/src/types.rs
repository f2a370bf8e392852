//! Request and response types for the ta-server API.

use serde::{Deserialize, Serialize};


/// Market sentiment attached to an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Price expected to rise.
    Bullish,
    /// Price expected to fall.
    Bearish,
    /// No clear direction.
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

// ============================================================================
// Watchlist
// ============================================================================

/// One watchlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerItem {
    /// Instrument symbol.
    pub symbol: String,
    /// Whether the user holds a position.
    pub on_hand: bool,
    /// Creation time, RFC 3339.
    pub created_at: String,
}

/// Body of `POST /watchlist`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTickerRequest {
    /// Instrument symbol.
    pub symbol: String,
    /// Whether the user holds the instrument.
    pub on_hand: bool,
}

// ============================================================================
// Insights
// ============================================================================

/// A generated insight for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Instrument symbol.
    pub symbol: String,
    /// Market sentiment.
    pub sentiment: Sentiment,
    /// Analysis summary.
    pub summary: String,
    /// Recommended action.
    pub action: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}
