//! Novel-level records produced by discovery and enrichment
use std::fmt;

/// A search or listing hit that has not been enriched yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelReference {
    pub title: String,
    pub author: String,
    /// Detail page of the novel; input to enrichment
    pub detail_url: String,
}

impl NovelReference {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        detail_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            detail_url: detail_url.into(),
        }
    }
}

/// Publication status, derived from the age of the latest update
///
/// The site does not report this; a novel untouched for more than
/// 30 days is assumed completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NovelStatus {
    Completed,
    Ongoing,
    /// Placeholder carried by the sentinel record
    #[default]
    Unknown,
}

impl NovelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Ongoing => "ongoing",
            Self::Unknown => "",
        }
    }
}

impl fmt::Display for NovelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full description of one novel, produced from its detail page
///
/// `Default` yields the all-empty sentinel. A detail page that parses to it
/// counts as a failed enrichment; see [`NovelMetadata::is_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NovelMetadata {
    pub id: String,
    pub title: String,
    pub author: String,
    pub tag: String,
    pub status: NovelStatus,
    /// Normalised from counters like "12K" or "3W"
    pub word_count: u64,
    /// Date of the latest chapter as printed by the site (`YYYY-MM-DD`)
    pub update_time: String,
    pub description: String,
    pub cover_url: String,
    /// Chapter outline page
    pub catalog_url: String,
}

impl NovelMetadata {
    /// Returns true for the sentinel record (no id or no title)
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() || self.title.is_empty()
    }
}
