//! Network access for crawlers
//!
//! One `Fetcher` per crawler instance wraps a shared `reqwest::Client`.
//! Every fetch either yields the page body or a typed `FetchError`.

mod fetcher;

pub use fetcher::{build_http_client, FetchError, FetchMethod, FetchRequest, Fetcher};
