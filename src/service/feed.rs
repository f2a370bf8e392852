//! Demo insight feeds.
//!
//! The generators return synthetic data: one insight per demo symbol with a
//! randomly drawn sentiment.

use crate::models::{FeedPayload, Insight, Sentiment};
use rand::Rng;
use tracing::info;

/// Symbols every demo feed reports on.
pub const DEMO_SYMBOLS: [&str; 4] = ["AAPL", "TSLA", "NVDA", "MSFT"];

/// Action recommended by the demo feeds.
const DEMO_ACTION: &str = "HOLD";

/// Contract of a read-only insight feed.
pub trait FeedService: Send + Sync {
    /// Produces a non-empty list of insights for the user.
    fn list(&self, payload: &FeedPayload) -> Vec<Insight>;
}

/// Feed served at `/insights`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Insights;

/// Feed served at `/portfolio`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Portfolio;

impl FeedService for Insights {
    fn list(&self, payload: &FeedPayload) -> Vec<Insight> {
        info!(user_id = %payload.user_id, "insights.list");
        demo_insights()
    }
}

impl FeedService for Portfolio {
    fn list(&self, payload: &FeedPayload) -> Vec<Insight> {
        info!(user_id = %payload.user_id, "portfolio.list");
        demo_insights()
    }
}

fn demo_insights() -> Vec<Insight> {
    let mut rng = rand::rng();
    DEMO_SYMBOLS
        .iter()
        .map(|symbol| Insight {
            symbol: (*symbol).to_string(),
            sentiment: random_sentiment(&mut rng),
            summary: format!(
                "AI generated summary for {}: Moving average indicates strong momentum.",
                symbol
            ),
            action: DEMO_ACTION.to_string(),
        })
        .collect()
}

fn random_sentiment<R: Rng + ?Sized>(rng: &mut R) -> Sentiment {
    Sentiment::ALL[rng.random_range(0..Sentiment::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> FeedPayload {
        FeedPayload {
            user_id: "u1".to_string(),
        }
    }

    fn assert_well_formed(insights: &[Insight]) {
        assert!(!insights.is_empty());
        for insight in insights {
            assert!(!insight.symbol.is_empty());
            assert!(Sentiment::ALL.contains(&insight.sentiment));
            assert!(!insight.summary.is_empty());
            assert!(!insight.action.is_empty());
        }
    }

    #[test]
    fn test_insights_shape() {
        for _ in 0..20 {
            assert_well_formed(&Insights.list(&payload()));
        }
    }

    #[test]
    fn test_portfolio_shape() {
        for _ in 0..20 {
            assert_well_formed(&Portfolio.list(&payload()));
        }
    }

    #[test]
    fn test_feed_covers_demo_symbols() {
        let symbols: Vec<String> = Insights
            .list(&payload())
            .into_iter()
            .map(|insight| insight.symbol)
            .collect();
        assert_eq!(symbols, DEMO_SYMBOLS);
    }

    #[test]
    fn test_wire_sentiments_are_enumerated() {
        let json = serde_json::to_value(Portfolio.list(&payload())).unwrap();
        for insight in json.as_array().unwrap() {
            let sentiment = insight["sentiment"].as_str().unwrap();
            assert!(["bullish", "bearish", "neutral"].contains(&sentiment));
        }
    }
}
