//! Watchlist service.

use crate::models::{AddPayload, ListPayload, RemovePayload, TickerItem};
use crate::store::WatchlistStore;
use tracing::info;

/// Behavioral contract of the watchlist feature.
///
/// None of the operations can fail: payloads are validated by the transport
/// before they reach the service.
pub trait WatchlistService: Send + Sync {
    /// Lists the user's tickers in no particular order.
    fn list(&self, payload: &ListPayload) -> Vec<TickerItem>;

    /// Adds a ticker, replacing any existing entry with the same symbol.
    fn add(&self, payload: &AddPayload) -> TickerItem;

    /// Removes a ticker. Removing an absent ticker succeeds.
    fn remove(&self, payload: &RemovePayload);
}

/// Watchlist service backed by an owned in-memory store.
#[derive(Debug, Default)]
pub struct Watchlist {
    store: WatchlistStore,
}

impl Watchlist {
    /// Creates a service with an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatchlistService for Watchlist {
    fn list(&self, payload: &ListPayload) -> Vec<TickerItem> {
        info!(user_id = %payload.user_id, "watchlist.list");
        self.store.list(&payload.user_id)
    }

    fn add(&self, payload: &AddPayload) -> TickerItem {
        info!(user_id = %payload.user_id, symbol = %payload.symbol, "watchlist.add");
        self.store.add(&payload.user_id, &payload.symbol, payload.on_hand)
    }

    fn remove(&self, payload: &RemovePayload) {
        info!(user_id = %payload.user_id, symbol = %payload.symbol, "watchlist.remove");
        self.store.remove(&payload.user_id, &payload.symbol);
    }
}
