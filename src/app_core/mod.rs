mod app;
mod fetch;

pub use app::TuneDeck;
pub use fetch::{FetchResult, Fetcher};
