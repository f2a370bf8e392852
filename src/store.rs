//! In-memory watchlist storage.

use crate::models::TickerItem;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Symbol -> item for a single user.
type UserWatchlist = HashMap<String, TickerItem>;

/// Per-user watchlists behind a single lock.
///
/// Every operation holds the lock for its whole duration, so operations on
/// different users serialize against each other as well. Items handed out
/// are clones; later mutations never change a previously returned value.
#[derive(Debug, Default)]
pub struct WatchlistStore {
    users: Mutex<HashMap<String, UserWatchlist>>,
}

impl WatchlistStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the user's items in no particular order.
    ///
    /// Unknown users get an empty list.
    #[must_use]
    pub fn list(&self, user_id: &str) -> Vec<TickerItem> {
        let users = self.users.lock();
        users
            .get(user_id)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Inserts or replaces `symbol` for the user, stamping it with the
    /// current time.
    pub fn add(&self, user_id: &str, symbol: &str, on_hand: bool) -> TickerItem {
        let mut users = self.users.lock();
        let item = TickerItem {
            symbol: symbol.to_string(),
            on_hand,
            created_at: Utc::now(),
        };
        users
            .entry(user_id.to_string())
            .or_default()
            .insert(symbol.to_string(), item.clone());
        item
    }

    /// Removes `symbol` from the user's watchlist if present.
    pub fn remove(&self, user_id: &str, symbol: &str) {
        let mut users = self.users.lock();
        if let Some(items) = users.get_mut(user_id) {
            items.remove(symbol);
        }
    }

    /// Number of items the user currently holds.
    #[must_use]
    pub fn len(&self, user_id: &str) -> usize {
        self.users.lock().get(user_id).map_or(0, HashMap::len)
    }

    /// Number of users that have ever added an item.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_add_then_list_contains_item() {
        let store = WatchlistStore::new();
        let added = store.add("u1", "AAPL", true);

        let items = store.list("u1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0], added);
        assert_eq!(items[0].symbol, "AAPL");
        assert!(items[0].on_hand);
    }

    #[test]
    fn test_add_existing_symbol_replaces_item() {
        let store = WatchlistStore::new();
        let first = store.add("u1", "AAPL", true);
        thread::sleep(Duration::from_millis(5));
        let second = store.add("u1", "AAPL", false);

        let items = store.list("u1");
        assert_eq!(items.len(), 1);
        assert!(!items[0].on_hand);
        assert_eq!(items[0].created_at, second.created_at);
        assert!(second.created_at > first.created_at);
    }

    #[test]
    fn test_list_unknown_user_is_empty() {
        let store = WatchlistStore::new();
        assert!(store.list("no-such-user").is_empty());
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_remove_unknown_symbol_is_noop() {
        let store = WatchlistStore::new();
        store.add("u1", "AAPL", true);

        store.remove("u1", "UNKNOWN");

        let items = store.list("u1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].symbol, "AAPL");
    }

    #[test]
    fn test_remove_unknown_user_is_noop() {
        let store = WatchlistStore::new();
        store.remove("ghost", "AAPL");
        assert!(store.list("ghost").is_empty());
        assert_eq!(store.user_count(), 0);
    }

    #[test]
    fn test_remove_keeps_empty_user_entry() {
        let store = WatchlistStore::new();
        store.add("u1", "AAPL", true);
        store.remove("u1", "AAPL");

        assert!(store.list("u1").is_empty());
        assert_eq!(store.len("u1"), 0);
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn test_list_returns_snapshot() {
        let store = WatchlistStore::new();
        store.add("u1", "AAPL", true);
        let snapshot = store.list("u1");

        store.add("u1", "AAPL", false);
        store.add("u1", "MSFT", false);

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot[0].on_hand);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = WatchlistStore::new();
        store.add("u1", "AAPL", true);
        store.add("u2", "TSLA", false);

        let u1 = store.list("u1");
        let u2 = store.list("u2");
        assert_eq!(u1.len(), 1);
        assert_eq!(u1[0].symbol, "AAPL");
        assert_eq!(u2.len(), 1);
        assert_eq!(u2[0].symbol, "TSLA");
    }

    #[test]
    fn test_concurrent_adds_lose_nothing() {
        const USERS: usize = 8;
        const SYMBOLS: usize = 50;

        let store = Arc::new(WatchlistStore::new());
        let handles: Vec<_> = (0..USERS)
            .flat_map(|user| (0..SYMBOLS).map(move |symbol| (user, symbol)))
            .map(|(user, symbol)| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.add(
                        &format!("user-{}", user),
                        &format!("SYM{}", symbol),
                        symbol % 2 == 0,
                    );
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for user in 0..USERS {
            let mut symbols: Vec<String> = store
                .list(&format!("user-{}", user))
                .into_iter()
                .map(|item| item.symbol)
                .collect();
            symbols.sort();

            let mut expected: Vec<String> =
                (0..SYMBOLS).map(|symbol| format!("SYM{}", symbol)).collect();
            expected.sort();

            assert_eq!(symbols, expected);
        }
        assert_eq!(store.user_count(), USERS);
    }
}
