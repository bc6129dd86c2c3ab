//! Site definitions
//!
//! A site couples URL construction ([`SiteLayout`]) with markup parsing
//! ([`PageExtractor`]). Anything implementing both is a [`Site`] and can be
//! driven by [`SiteCrawler`](crate::crawler::SiteCrawler).

pub mod ujxsw;

pub use ujxsw::UjxswSite;

use crate::extract::PageExtractor;
use crate::fetch::FetchRequest;

/// Where a site keeps its listing and search pages
pub trait SiteLayout: Send + Sync {
    /// Registry name of the site
    fn name(&self) -> &str;

    /// Site root, sent as the `Referer` of every request
    fn base_url(&self) -> &str;

    /// Whether the site has a listing for `tag`
    fn supports_tag(&self, tag: &str) -> bool;

    /// First page of a tag listing; carries the page indicator
    fn tag_index_url(&self, tag: &str) -> String;

    /// Numbered page of a tag listing, starting at 1
    fn tag_page_url(&self, tag: &str, page: u32) -> String;

    /// Listing of every novel by `author`
    fn author_listing_url(&self, author: &str) -> String;

    /// Search request for `keyword`
    fn keyword_search(&self, keyword: &str) -> FetchRequest;
}

/// A complete site: layout plus extractor
pub trait Site: SiteLayout + PageExtractor {}

impl<T: SiteLayout + PageExtractor> Site for T {}
