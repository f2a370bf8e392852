//! Service contracts consumed by the endpoint layer.

pub mod feed;
pub mod watchlist;

pub use feed::{FeedService, Insights, Portfolio};
pub use watchlist::{Watchlist, WatchlistService};
