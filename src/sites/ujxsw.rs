//! ujxsw.org (悠久小说网)
//!
//! Detail pages live at `/book/{id}/`, catalogs at `/read/{id}/`, chapters at
//! `/read/{id}/{chapter}.html`. Tag listings are paginated as
//! `/{tag}/{page}/`; keyword search is a form POST to `/searchbooks.php`.

use crate::extract::{
    derive_status, parse_total_pages, parse_update_date, parse_word_count, strip_edge_noise,
    ExtractError, PageExtractor, UPDATE_DATE_FORMAT,
};
use crate::fetch::FetchRequest;
use crate::model::{ChapterRef, NovelMetadata, NovelReference};
use crate::sites::SiteLayout;
use chrono::{Local, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Registry name
pub const SITE_NAME: &str = "ujxsw";

pub const DEFAULT_BASE_URL: &str = "http://www.ujxsw.org/";

/// Tags with a listing on the site
pub const TAGS: [&str; 7] = [
    "wuxia", "dushi", "xuanhuan", "lishi", "youxi", "kehuan", "yanqing",
];

/// Advertisement lines the site injects around chapter text
pub const AD_PHRASES: [&str; 4] = ["最新网址", "免费小说无弹窗", "悠久小説網", "全集TXT电子书免费下载"];

/// Author shown when a listing omits one
pub const UNKNOWN_AUTHOR: &str = "佚名";

const CATALOG_LINK_TEXT: &str = "目录列表";

struct Selectors {
    book_info: Selector,
    cover: Selector,
    heading: Selector,
    heading_author: Selector,
    counters: Selector,
    intro: Selector,
    updated: Selector,
    actions: Selector,
    catalog: Selector,
    catalog_items: Selector,
    link: Selector,
    content: Selector,
    tag_box: Selector,
    tag_entries: Selector,
    tag_title: Selector,
    tag_author: Selector,
    search_box: Selector,
    search_entries: Selector,
    search_title: Selector,
    search_author: Selector,
    author_table: Selector,
    author_rows: Selector,
    cell: Selector,
    page_link: Selector,
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector '{}': {:?}", css, e))
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    book_info: selector("div#maininfo div#bookinfo"),
    cover: selector("div.bookleft img"),
    heading: selector("div.bookright h1"),
    heading_author: selector("em a"),
    counters: selector("div#count span.pd_r"),
    intro: selector("div#bookintro"),
    updated: selector("div.new span.new_p"),
    actions: selector("div.motion a"),
    catalog: selector("div#readerlist ul"),
    catalog_items: selector("li"),
    link: selector("a"),
    content: selector("div.read-content"),
    tag_box: selector("div#sitembox"),
    tag_entries: selector("div#sitembox dl"),
    tag_title: selector("dd h3 a"),
    tag_author: selector("dd.book_other span a"),
    search_box: selector("div.shulist"),
    search_entries: selector("div.shulist ul"),
    search_title: selector("li.three a"),
    search_author: selector("li.four a"),
    author_table: selector("table.booklists"),
    author_rows: selector("table.booklists tr"),
    cell: selector("td"),
    page_link: selector("div#pagelink"),
});

/// ujxsw.org layout and extractor
#[derive(Debug, Clone)]
pub struct UjxswSite {
    base: Url,

    /// Date status is derived against; today when unset
    reference_date: Option<NaiveDate>,
}

impl UjxswSite {
    /// Creates the site rooted at `base_url` (must end with '/')
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            reference_date: None,
        })
    }

    /// Fixes the date novel status is derived against
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Resolves a possibly relative href against the site root
    fn absolute(&self, href: &str) -> String {
        self.base
            .join(href.trim())
            .map(String::from)
            .unwrap_or_else(|_| href.to_string())
    }

    fn tag_listing(&self, document: &Html) -> Vec<NovelReference> {
        let s = &*SELECTORS;
        document
            .select(&s.tag_entries)
            .filter_map(|entry| {
                let link = entry.select(&s.tag_title).next()?;
                let href = link.value().attr("href")?;
                let author = entry
                    .select(&s.tag_author)
                    .next()
                    .map(text_of)
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
                Some(NovelReference::new(text_of(link), author, self.absolute(href)))
            })
            .collect()
    }

    fn search_listing(&self, document: &Html) -> Vec<NovelReference> {
        let s = &*SELECTORS;
        document
            .select(&s.search_entries)
            .filter_map(|entry| {
                let link = entry.select(&s.search_title).next()?;
                let href = link.value().attr("href")?;
                let author = entry
                    .select(&s.search_author)
                    .next()
                    .map(text_of)
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
                Some(NovelReference::new(text_of(link), author, self.absolute(href)))
            })
            .collect()
    }

    /// Author pages list only titles; the author is left empty for the
    /// caller to fill in
    fn author_listing(&self, document: &Html) -> Vec<NovelReference> {
        let s = &*SELECTORS;
        document
            .select(&s.author_rows)
            .filter_map(|row| {
                let title_cell = row.select(&s.cell).nth(1)?;
                let link = title_cell.select(&s.link).next()?;
                let href = link.value().attr("href")?;
                Some(NovelReference::new(text_of(link), "", self.absolute(href)))
            })
            .collect()
    }
}

impl SiteLayout for UjxswSite {
    fn name(&self) -> &str {
        SITE_NAME
    }

    fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn supports_tag(&self, tag: &str) -> bool {
        TAGS.contains(&tag)
    }

    fn tag_index_url(&self, tag: &str) -> String {
        format!("{}{}/", self.base, tag)
    }

    fn tag_page_url(&self, tag: &str, page: u32) -> String {
        format!("{}{}/{}/", self.base, tag, page)
    }

    fn author_listing_url(&self, author: &str) -> String {
        let mut url = self.base.clone();
        // Http(s) bases always have path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("author").push(author);
        }
        url.into()
    }

    fn keyword_search(&self, keyword: &str) -> FetchRequest {
        FetchRequest::post_form(
            format!("{}searchbooks.php", self.base),
            vec![("searchkey".to_string(), keyword.to_string())],
        )
    }
}

impl PageExtractor for UjxswSite {
    fn extract_metadata(&self, html: &str, url: &str) -> Result<NovelMetadata, ExtractError> {
        let s = &*SELECTORS;
        let document = Html::parse_document(html);

        let info = document
            .select(&s.book_info)
            .next()
            .ok_or_else(|| ExtractError::missing("book info block"))?;

        let heading = info
            .select(&s.heading)
            .next()
            .ok_or_else(|| ExtractError::missing("title heading"))?;

        // The title is the heading's own text; the author sits in a nested <em>
        let title = heading
            .children()
            .filter_map(|node| node.value().as_text())
            .map(|text| text.trim())
            .find(|text| !text.is_empty())
            .ok_or_else(|| ExtractError::missing("title"))?
            .to_string();

        let author = heading
            .select(&s.heading_author)
            .next()
            .map(text_of)
            .ok_or_else(|| ExtractError::missing("author"))?;

        let counters: Vec<String> = info.select(&s.counters).map(text_of).collect();
        if counters.len() < 5 {
            return Err(ExtractError::missing(format!(
                "counters (found {} of 5)",
                counters.len()
            )));
        }
        let tag = counters[0].clone();
        let word_count = parse_word_count(&counters[4])?;

        let updated_raw = info
            .select(&s.updated)
            .next()
            .map(text_of)
            .ok_or_else(|| ExtractError::missing("update time"))?;
        let updated = parse_update_date(&updated_raw)?;

        let catalog_href = info
            .select(&s.actions)
            .find(|link| text_of(*link) == CATALOG_LINK_TEXT)
            .and_then(|link| link.value().attr("href"))
            .ok_or_else(|| ExtractError::missing("catalog link"))?;

        let cover_url = info
            .select(&s.cover)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(|src| self.absolute(src))
            .unwrap_or_default();

        let description = info
            .select(&s.intro)
            .next()
            .map(|intro| intro.text().map(str::trim).collect::<String>())
            .unwrap_or_default();

        Ok(NovelMetadata {
            id: novel_id_from_url(url),
            title,
            author,
            tag,
            status: derive_status(updated, self.today()),
            word_count,
            update_time: updated.format(UPDATE_DATE_FORMAT).to_string(),
            description,
            cover_url,
            catalog_url: self.absolute(catalog_href),
        })
    }

    fn extract_chapter_list(&self, html: &str) -> Result<Vec<ChapterRef>, ExtractError> {
        let s = &*SELECTORS;
        let document = Html::parse_document(html);

        let catalog = document
            .select(&s.catalog)
            .next()
            .ok_or_else(|| ExtractError::missing("chapter catalog"))?;

        // `li.fj` entries are volume separators, not chapters
        let chapters = catalog
            .select(&s.catalog_items)
            .filter(|item| !item.value().classes().any(|class| class == "fj"))
            .filter_map(|item| {
                let link = item.select(&s.link).next()?;
                let href = link.value().attr("href")?;
                Some(ChapterRef::new(text_of(link), self.absolute(href)))
            })
            .collect();

        Ok(chapters)
    }

    fn extract_chapter_content(&self, html: &str) -> Result<String, ExtractError> {
        let s = &*SELECTORS;
        let document = Html::parse_document(html);

        let content = document
            .select(&s.content)
            .next()
            .ok_or_else(|| ExtractError::missing("chapter content"))?;

        let text = content
            .text()
            .flat_map(str::lines)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(strip_edge_noise(&text, &AD_PHRASES))
    }

    fn extract_search_results(&self, html: &str) -> Result<Vec<NovelReference>, ExtractError> {
        let s = &*SELECTORS;
        let document = Html::parse_document(html);

        if document.select(&s.tag_box).next().is_some() {
            Ok(self.tag_listing(&document))
        } else if document.select(&s.search_box).next().is_some() {
            Ok(self.search_listing(&document))
        } else if document.select(&s.author_table).next().is_some() {
            Ok(self.author_listing(&document))
        } else {
            Err(ExtractError::missing("novel listing"))
        }
    }

    fn extract_total_pages(&self, html: &str) -> u32 {
        let document = Html::parse_document(html);
        document
            .select(&SELECTORS.page_link)
            .next()
            .map(|indicator| parse_total_pages(&text_of(indicator)))
            .unwrap_or(0)
    }
}

/// Trimmed text content of an element
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Last path segment of a detail URL, without a `.html` suffix
fn novel_id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim_end_matches(".html")
        .to_string()
}
