/// One entry of a novel's outline, in reading order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub title: String,
    pub content_url: String,
}

impl ChapterRef {
    pub fn new(title: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content_url: content_url.into(),
        }
    }
}

/// A chapter title paired with its fetched text
///
/// Pairing is positional: the n-th content belongs to the n-th outline
/// entry. URLs are never used to match them up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    /// Empty when the chapter fetch failed
    pub content: String,
}

impl Chapter {
    /// Zips an outline with contents fetched in the same order
    pub fn pair(outline: &[ChapterRef], contents: Vec<String>) -> Vec<Chapter> {
        outline
            .iter()
            .zip(contents)
            .map(|(chapter, content)| Chapter {
                title: chapter.title.clone(),
                content,
            })
            .collect()
    }
}
