//! Data model for harvested novels
//!
//! - `NovelReference`: a listing hit (title, author, detail URL)
//! - `NovelMetadata`: the enriched record; `Default` is the empty sentinel
//! - `ChapterRef` / `Chapter`: outline entries and their fetched text

mod chapter;
mod novel;

pub use chapter::{Chapter, ChapterRef};
pub use novel::{NovelMetadata, NovelReference, NovelStatus};
