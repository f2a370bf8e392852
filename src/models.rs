//! Request and response models for the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Market sentiment attached to an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Price expected to rise.
    Bullish,
    /// Price expected to fall.
    Bearish,
    /// No clear direction.
    Neutral,
}

impl Sentiment {
    /// Every sentiment value, in declaration order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Bullish, Sentiment::Bearish, Sentiment::Neutral];
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
// Watchlist
// ============================================================================

/// One watchlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TickerItem {
    /// Instrument symbol, unique within a user's watchlist.
    #[schema(example = "AAPL")]
    pub symbol: String,
    /// Whether the user currently holds a position.
    pub on_hand: bool,
    /// When the entry was created or last replaced (RFC 3339).
    #[schema(example = "2023-10-27T10:00:00Z")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /watchlist`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AddTickerRequest {
    /// Instrument symbol.
    #[schema(example = "TSLA")]
    pub symbol: String,
    /// Whether the user holds the instrument.
    pub on_hand: bool,
}

/// Payload of `watchlist.list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPayload {
    /// Acting user.
    pub user_id: String,
}

/// Payload of `watchlist.add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPayload {
    /// Acting user.
    pub user_id: String,
    /// Symbol to insert or replace.
    pub symbol: String,
    /// Holding flag.
    pub on_hand: bool,
}

/// Payload of `watchlist.remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovePayload {
    /// Acting user.
    pub user_id: String,
    /// Symbol to remove.
    pub symbol: String,
}

// ============================================================================
// Insight feeds
// ============================================================================

/// Payload of the `insights.list` and `portfolio.list` feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPayload {
    /// Acting user.
    pub user_id: String,
}

/// A generated insight for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
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
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Debug log toggle response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DebugLogsResponse {
    /// `on` or `off`.
    #[serde(rename = "debug-logs")]
    pub debug_logs: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sentiment_serialization() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Bullish).unwrap(),
            "\"bullish\""
        );
        assert_eq!(
            serde_json::to_string(&Sentiment::Bearish).unwrap(),
            "\"bearish\""
        );
        assert_eq!(
            serde_json::to_string(&Sentiment::Neutral).unwrap(),
            "\"neutral\""
        );
    }

    #[test]
    fn test_sentiment_rejects_unknown_value() {
        let result: Result<Sentiment, _> = serde_json::from_str("\"euphoric\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_sentiment_display_matches_wire() {
        for sentiment in Sentiment::ALL {
            let wire = serde_json::to_string(&sentiment).unwrap();
            assert_eq!(wire, format!("\"{}\"", sentiment));
        }
    }

    #[test]
    fn test_ticker_item_serialization() {
        let item = TickerItem {
            symbol: "AAPL".to_string(),
            on_hand: true,
            created_at: Utc.with_ymd_and_hms(2023, 10, 27, 10, 0, 0).unwrap(),
        };

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"symbol\":\"AAPL\""));
        assert!(json.contains("\"on_hand\":true"));
        assert!(json.contains("\"created_at\":\"2023-10-27T10:00:00Z\""));
    }

    #[test]
    fn test_add_ticker_request_requires_both_fields() {
        let ok: Result<AddTickerRequest, _> =
            serde_json::from_str(r#"{"symbol":"TSLA","on_hand":true}"#);
        assert!(ok.is_ok());

        let missing_on_hand: Result<AddTickerRequest, _> =
            serde_json::from_str(r#"{"symbol":"TSLA"}"#);
        assert!(missing_on_hand.is_err());

        let missing_symbol: Result<AddTickerRequest, _> =
            serde_json::from_str(r#"{"on_hand":false}"#);
        assert!(missing_symbol.is_err());
    }

    #[test]
    fn test_debug_logs_response_field_name() {
        let response = DebugLogsResponse {
            debug_logs: "on".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"debug-logs":"on"}"#);
    }
}
