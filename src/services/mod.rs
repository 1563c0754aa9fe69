// src/services/mod.rs

//! Application services: trending-page fetching and message delivery.

mod dispatcher;
mod fetcher;

pub use dispatcher::{BatchOutcome, ConnState, Dispatcher, SendResult};
pub use fetcher::{TrendingFetcher, parse_trending};
