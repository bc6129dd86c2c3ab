//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the novel site and check the
//! full discover, enrich, fetch and persist cycle end-to-end.

use novel_ripple::config::{Config, CrawlerConfig, ExistingFilePolicy, OutputConfig, TransportConfig};
use novel_ripple::crawler::{write_novel, NovelOutcome, Stage};
use novel_ripple::sites::UjxswSite;
use novel_ripple::{harvest, HarvestOptions, NovelCrawler, NovelReference, SiteCrawler};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `base_dir`
fn create_test_config(base_dir: &Path, chapter_concurrency: usize, timeout_secs: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            metadata_concurrency: 2,
            chapter_concurrency,
            file_concurrency: 1,
            request_timeout_secs: timeout_secs,
        },
        transport: TransportConfig::default(),
        output: OutputConfig {
            base_dir: base_dir.to_string_lossy().into_owned(),
            on_existing: ExistingFilePolicy::Append,
        },
        sites: HashMap::new(),
    }
}

fn create_crawler(server: &MockServer, config: &Config) -> SiteCrawler<UjxswSite> {
    let site = UjxswSite::new(&format!("{}/", server.uri())).expect("Failed to parse base URL");
    SiteCrawler::from_config(site, config).expect("Failed to build crawler")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn detail_page(id: u32, title: &str, author: &str) -> ResponseTemplate {
    html(&format!(
        r#"<div id="maininfo"><div id="bookinfo">
          <div class="bookright">
            <h1>{title}<em>作者：<a href="/author/x">{author}</a></em></h1>
            <div id="count">
              <span class="pd_r">xuanhuan</span><span class="pd_r">1</span>
              <span class="pd_r">2</span><span class="pd_r">3</span>
              <span class="pd_r">12K</span>
            </div>
            <div id="bookintro"><p>简介</p></div>
            <div class="new"><span class="new_p">更新时间：2024-06-01</span></div>
            <div class="motion"><a href="/read/{id}/">目录列表</a></div>
          </div>
        </div></div>"#
    ))
}

fn catalog_page(id: u32, chapters: usize) -> ResponseTemplate {
    let items: String = (1..=chapters)
        .map(|n| format!(r#"<li><a href="/read/{id}/{n}.html">第{n}章</a></li>"#))
        .collect();
    html(&format!(
        r#"<div id="readerlist"><ul><li class="fj">正文</li>{items}</ul></div>"#
    ))
}

fn chapter_page(text: &str) -> ResponseTemplate {
    html(&format!(r#"<div class="read-content"><p>{}</p></div>"#, text))
}

/// Mounts a detail page, its catalog and every chapter
async fn mount_novel(server: &MockServer, id: u32, title: &str, chapters: usize) {
    Mock::given(method("GET"))
        .and(path(format!("/book/{}/", id)))
        .respond_with(detail_page(id, title, "作者"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/read/{}/", id)))
        .respond_with(catalog_page(id, chapters))
        .mount(server)
        .await;

    for n in 1..=chapters {
        Mock::given(method("GET"))
            .and(path(format!("/read/{}/{}.html", id, n)))
            .respond_with(chapter_page(&format!("{}-正文{}", title, n)))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_harvest_isolates_failed_metadata() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_novel(&server, 1, "好书", 3).await;
    Mock::given(method("GET"))
        .and(path("/book/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(dir.path(), 4, 5);
    let crawler = create_crawler(&server, &config);
    let references = vec![
        NovelReference::new("好书", "作者", format!("{}/book/1/", server.uri())),
        NovelReference::new("坏书", "作者", format!("{}/book/2/", server.uri())),
    ];

    let report = harvest(&crawler, &references, &HarvestOptions::default()).await;

    assert_eq!(report.novels.len(), 2);
    assert_eq!(report.written().count(), 1);
    assert!(matches!(
        report.novels[1].outcome,
        NovelOutcome::Failed {
            stage: Stage::Enrich,
            ..
        }
    ));

    let good = dir.path().join("xuanhuan").join("好书_作者.txt");
    let body = std::fs::read_to_string(&good).expect("novel file should exist");
    assert_eq!(
        body,
        "第1章\n好书-正文1\n\n第2章\n好书-正文2\n\n第3章\n好书-正文3\n\n"
    );

    // Nothing else was written for the failed novel
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("xuanhuan"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_chapter_order_survives_reversed_completion() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/book/7/"))
        .respond_with(detail_page(7, "慢书", "作者"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/7/"))
        .respond_with(catalog_page(7, 4))
        .mount(&server)
        .await;
    // Chapter n answers after (5 - n) * 100ms: the last chapter lands first
    for n in 1..=4u64 {
        Mock::given(method("GET"))
            .and(path(format!("/read/7/{}.html", n)))
            .respond_with(
                chapter_page(&format!("内容{}", n)).set_delay(Duration::from_millis((5 - n) * 100)),
            )
            .mount(&server)
            .await;
    }

    let config = create_test_config(dir.path(), 4, 5);
    let crawler = create_crawler(&server, &config);

    let outcome = write_novel(&crawler, &format!("{}/book/7/", server.uri())).await;

    let NovelOutcome::Written {
        path: file,
        chapters,
        empty_chapters,
    } = outcome
    else {
        panic!("expected a written novel");
    };
    assert_eq!(chapters, 4);
    assert_eq!(empty_chapters, 0);
    assert_eq!(
        std::fs::read_to_string(file).unwrap(),
        "第1章\n内容1\n\n第2章\n内容2\n\n第3章\n内容3\n\n第4章\n内容4\n\n"
    );
}

#[tokio::test]
async fn test_chapter_timeout_leaves_empty_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/book/3/"))
        .respond_with(detail_page(3, "卡书", "作者"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/3/"))
        .respond_with(catalog_page(3, 2))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/3/1.html"))
        .respond_with(chapter_page("准时"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/3/2.html"))
        .respond_with(chapter_page("迟到").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = create_test_config(dir.path(), 4, 1);
    let crawler = create_crawler(&server, &config);

    let outcome = write_novel(&crawler, &format!("{}/book/3/", server.uri())).await;

    let NovelOutcome::Written {
        path: file,
        empty_chapters,
        ..
    } = outcome
    else {
        panic!("expected a written novel");
    };
    assert_eq!(empty_chapters, 1);
    assert_eq!(
        std::fs::read_to_string(file).unwrap(),
        "第1章\n准时\n\n第2章\n\n\n"
    );
}

#[tokio::test]
async fn test_outline_failure_creates_no_file() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/book/4/"))
        .respond_with(detail_page(4, "无目录", "作者"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/4/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(dir.path(), 4, 5);
    let crawler = create_crawler(&server, &config);

    let outcome = write_novel(&crawler, &format!("{}/book/4/", server.uri())).await;

    assert!(matches!(
        outcome,
        NovelOutcome::Failed {
            stage: Stage::Outline,
            ..
        }
    ));
    assert!(!dir.path().join("xuanhuan").exists());
}

#[tokio::test]
async fn test_chapter_gate_bounds_concurrency() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/book/5/"))
        .respond_with(detail_page(5, "长书", "作者"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/5/"))
        .respond_with(catalog_page(5, 6))
        .mount(&server)
        .await;
    for n in 1..=6 {
        Mock::given(method("GET"))
            .and(path(format!("/read/5/{}.html", n)))
            .respond_with(chapter_page("字").set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
    }

    // Two chapter slots for six 200ms chapters: at least three waves
    let config = create_test_config(dir.path(), 2, 5);
    let crawler = create_crawler(&server, &config);

    let started = Instant::now();
    let outcome = write_novel(&crawler, &format!("{}/book/5/", server.uri())).await;
    let elapsed = started.elapsed();

    assert!(outcome.is_written());
    assert!(
        elapsed >= Duration::from_millis(550),
        "six chapters through two slots finished in {:?}",
        elapsed
    );
    assert_eq!(crawler.gates().chapter.active(), 0);
}

#[tokio::test]
async fn test_tag_discovery_across_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wuxia/"))
        .respond_with(html(r#"<div id="sitembox"></div><div id="pagelink">第1/3页</div>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wuxia/1/"))
        .respond_with(html(
            r#"<div id="sitembox">
            <dl><dd><h3><a href="/book/1/">一</a></h3></dd></dl>
            <dl><dd><h3><a href="/book/2/">二</a></h3></dd></dl>
            </div>"#,
        ))
        .mount(&server)
        .await;
    // Page 2 is broken; pages 1 and 3 still count
    Mock::given(method("GET"))
        .and(path("/wuxia/2/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wuxia/3/"))
        .respond_with(html(
            r#"<div id="sitembox">
            <dl><dd><h3><a href="/book/5/">五</a></h3></dd></dl>
            </div>"#,
        ))
        .mount(&server)
        .await;

    let config = create_test_config(dir.path(), 4, 5);
    let crawler = create_crawler(&server, &config);

    let all = crawler.novels_by_tag("wuxia", None).await.unwrap();
    let titles: Vec<_> = all.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["一", "二", "五"]);

    let top = crawler.novels_by_tag("wuxia", Some(2)).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].detail_url, format!("{}/book/2/", server.uri()));
}

#[tokio::test]
async fn test_keyword_search_posts_form_and_keeps_top_n() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/searchbooks.php"))
        .and(body_string_contains("searchkey="))
        .respond_with(html(
            r##"<div class="shulist">
            <ul><li class="three"><a href="/book/1/">甲</a></li><li class="four"><a href="#">甲作者</a></li></ul>
            <ul><li class="three"><a href="/book/2/">乙</a></li><li class="four"><a href="#">乙作者</a></li></ul>
            <ul><li class="three"><a href="/book/3/">丙</a></li><li class="four"><a href="#">丙作者</a></li></ul>
            </div>"##,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(dir.path(), 4, 5);
    let crawler = create_crawler(&server, &config);

    let found = crawler.novels_by_keyword("剑", 2).await.unwrap();

    assert_eq!(
        found,
        vec![
            NovelReference::new("甲", "甲作者", format!("{}/book/1/", server.uri())),
            NovelReference::new("乙", "乙作者", format!("{}/book/2/", server.uri())),
        ]
    );
}

#[tokio::test]
async fn test_author_listing_fills_author() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/author/someone"))
        .respond_with(html(
            r#"<table class="booklists">
            <tr><th>类别</th><th>书名</th></tr>
            <tr><td>玄幻</td><td><a href="/book/8/">戊</a></td></tr>
            <tr><td>都市</td><td><a href="/book/9/">己</a></td></tr>
            </table>"#,
        ))
        .mount(&server)
        .await;

    let config = create_test_config(dir.path(), 4, 5);
    let crawler = create_crawler(&server, &config);

    let found = crawler.novels_by_author("someone").await.unwrap();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|n| n.author == "someone"));
    assert_eq!(found[1].title, "己");
}

#[tokio::test]
async fn test_tag_listing_feeds_harvest() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Book 1 is listed twice, book 3 is a second page for the same novel
    Mock::given(method("GET"))
        .and(path("/wuxia/"))
        .respond_with(html(
            r#"<div id="sitembox">
            <dl><dd><h3><a href="/book/1/">好书</a></h3></dd></dl>
            <dl><dd><h3><a href="/book/2/">坏书</a></h3></dd></dl>
            <dl><dd><h3><a href="/book/1/">好书</a></h3></dd></dl>
            <dl><dd><h3><a href="/book/3/">好书</a></h3></dd></dl>
            </div>"#,
        ))
        .mount(&server)
        .await;
    mount_novel(&server, 1, "好书", 3).await;
    Mock::given(method("GET"))
        .and(path("/book/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/book/3/"))
        .respond_with(detail_page(3, "好书", "作者"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/read/3/"))
        .respond_with(catalog_page(3, 1))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(dir.path(), 4, 5);
    config.crawler.file_concurrency = 4;
    let crawler = create_crawler(&server, &config);

    let references = crawler.novels_by_tag("wuxia", None).await.unwrap();
    assert_eq!(references.len(), 4);

    let report = harvest(&crawler, &references, &HarvestOptions::default()).await;

    assert_eq!(report.novels.len(), 4);
    assert_eq!(report.written().count(), 1);
    assert_eq!(report.duplicates().count(), 2);
    match &report.novels[1].outcome {
        NovelOutcome::Failed { stage, reason } => {
            assert_eq!(*stage, Stage::Enrich);
            assert!(reason.contains("500"), "reason was {}", reason);
        }
        other => panic!("expected enrich failure, got {:?}", other),
    }
    let kept = format!("{}/book/1/", server.uri());
    assert_eq!(report.novels[2].outcome, NovelOutcome::Duplicate { of: kept.clone() });
    assert_eq!(report.novels[3].outcome, NovelOutcome::Duplicate { of: kept });

    // Written once, in order, despite appending to existing files
    let body = std::fs::read_to_string(dir.path().join("xuanhuan").join("好书_作者.txt")).unwrap();
    assert_eq!(
        body,
        "第1章\n好书-正文1\n\n第2章\n好书-正文2\n\n第3章\n好书-正文3\n\n"
    );
    let files = std::fs::read_dir(dir.path().join("xuanhuan")).unwrap().count();
    assert_eq!(files, 1);
}
