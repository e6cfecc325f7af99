//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl and mirror cycle end-to-end. Mock expectations are verified when
//! each server drops, so `.expect(n)` doubles as a fetch counter.

use std::path::Path;
use utsushi::config::Config;
use utsushi::crawler::ExtractionRules;
use utsushi::mirror::EntryStatus;
use utsushi::output::{ContentSource, FailureContext, FailureKind, StopReason};
use utsushi::{parse_local_file, run_crawl, TaskState, UtsushiError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no request delay
fn create_test_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.delay_seconds = 0.0;
    config.crawler.request_timeout_seconds = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn with_mirror(mut config: Config, root: &Path) -> Config {
    config.mirror.enabled = true;
    config.mirror.root_dir = root.to_string_lossy().into_owned();
    config
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, at: &str, body: impl Into<String>, times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel))
        .unwrap_or_else(|e| panic!("expected mirror file {}: {}", rel, e))
}

#[tokio::test]
async fn test_depth_one_crawl_with_mirror() {
    let server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><head><title>Home</title><script src="/js/app.js"></script></head>
<body><a href="/about">About</a> <a href="{}/x">Elsewhere</a> <img src="/img/logo.png"></body></html>"#,
            elsewhere.uri()
        ),
        1,
    )
    .await;
    mount_page(
        &server,
        "/about",
        r#"<html><head><title>About</title><script src="/js/app.js"></script></head>
<body><a href="/">Home</a> <a href="/deep">Deep</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/deep", "<html></html>", 0).await;

    Mock::given(method("GET"))
        .and(path("/js/app.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("console.log('hi');")
                .insert_header("content-type", "application/javascript"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/logo.png"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    // Off-host links are recorded but never fetched
    Mock::given(method("GET"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&elsewhere)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("site");
    let config = with_mirror(create_test_config(1), &root);

    let result = run_crawl(&format!("{}/", base), config)
        .await
        .expect("Crawl failed");

    // Traversal
    assert_eq!(result.pages.len(), 2);
    assert!(result.pages.iter().all(|p| p.state == TaskState::Done));
    assert_eq!(result.pages[0].depth, 0);
    assert_eq!(result.pages[1].url, format!("{}/about", base));
    assert_eq!(result.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(result.seed_metadata.title.as_deref(), Some("Home"));
    assert!(result.internal_links.contains(&format!("{}/deep", base)));
    assert_eq!(result.external_links, vec![format!("{}/x", elsewhere.uri())]);

    // Mirror layout
    let index = read(&root, "index.html");
    assert!(index.contains(r#"<script src="js/app.js"></script>"#));
    assert!(index.contains(r#"<a href="about.html">About</a>"#));
    assert!(index.contains(&format!(r#"<a href="{}/x">Elsewhere</a>"#, elsewhere.uri())));
    // Failed download still points at the intended local path
    assert!(index.contains(r#"<img src="img/logo.png">"#));

    let about = read(&root, "about.html");
    assert!(about.contains(r#"<a href="index.html">Home</a>"#));
    assert!(about.contains(r#"<a href="deep.html">Deep</a>"#));

    assert_eq!(read(&root, "js/app.js"), "console.log('hi');");
    assert!(!root.join("img/logo.png").exists());
    assert!(!root.join("deep.html").exists());

    // Resource failure is logged, not fatal
    let failure = result
        .failures
        .iter()
        .find(|f| f.url.ends_with("/img/logo.png"))
        .expect("missing resource failure");
    assert_eq!(failure.context, FailureContext::Resource);
    assert_eq!(failure.kind, FailureKind::Http);
    assert_eq!(failure.status, Some(404));

    // Manifest and navigation index
    let mirror = result.mirror.as_ref().expect("mirror report");
    let status_of = |suffix: &str| {
        mirror
            .manifest
            .iter()
            .find(|e| e.url.ends_with(suffix))
            .map(|e| e.status)
    };
    assert_eq!(status_of("/about"), Some(EntryStatus::Stored));
    assert_eq!(status_of("/js/app.js"), Some(EntryStatus::Stored));
    assert_eq!(status_of("/img/logo.png"), Some(EntryStatus::Failed));
    assert_eq!(status_of("/deep"), Some(EntryStatus::Pending));

    let nav = read(&root, "mirror_index.html");
    assert!(nav.contains(r#"href="about.html""#));
    assert!(nav.contains(r#"href="js/app.js""#));
    assert_eq!(mirror.index_path, Some(root.join("mirror_index.html")));
}

#[tokio::test]
async fn test_no_duplicate_fetches_in_cycles() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/a#again">A again</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#, 1).await;
    mount_page(&server, "/b", r#"<a href="/a">A</a><a href="/?utm_source=b">Home</a>"#, 1).await;

    let result = run_crawl(&format!("{}/", server.uri()), create_test_config(5))
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.visited_count, 3);

    // Breadth-first, document order
    let order: Vec<_> = result
        .pages
        .iter()
        .map(|p| (p.url.trim_start_matches(&server.uri()).to_string(), p.depth))
        .collect();
    assert_eq!(
        order,
        vec![
            ("/".to_string(), 0),
            ("/a".to_string(), 1),
            ("/b".to_string(), 1)
        ]
    );
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/child">Child</a>"#, 1).await;
    mount_page(&server, "/child", "<html></html>", 0).await;

    let result = run_crawl(&format!("{}/", server.uri()), create_test_config(0))
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.visited_count, 1);
    assert_eq!(
        result.internal_links,
        vec![format!("{}/child", server.uri())]
    );
}

#[tokio::test]
async fn test_page_failures_do_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/missing">M</a><a href="/ok">OK</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<title>OK</title>", 1).await;

    let result = run_crawl(&format!("{}/", server.uri()), create_test_config(2))
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 3);
    let missing = &result.pages[1];
    assert_eq!(missing.state, TaskState::Failed);
    assert_eq!(missing.status_code, Some(404));
    assert_eq!(result.pages[2].state, TaskState::Done);
    assert_eq!(result.pages[2].title.as_deref(), Some("OK"));

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].context, FailureContext::Page);
    assert_eq!(result.failures[0].kind, FailureKind::Http);
    assert_eq!(result.pages_done(), 2);
}

#[tokio::test]
async fn test_override_applies_to_all_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<p>online home</p>", 0).await;
    mount_page(&server, "/only", "<p>online only</p>", 0).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let override_path = dir.path().join("custom_index.html");
    std::fs::write(&override_path, r#"<html><a href="/only">only</a></html>"#).unwrap();

    let root = dir.path().join("site");
    let mut config = with_mirror(create_test_config(2), &root);
    config.mirror.index_override = Some(override_path.to_string_lossy().into_owned());
    config.mirror.override_scope = "all".to_string();

    let result = run_crawl(&format!("{}/", server.uri()), config)
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 2);
    assert!(result
        .pages
        .iter()
        .all(|p| p.source == ContentSource::Override && p.state == TaskState::Done));

    // The override is what gets written, after link rewriting
    assert_eq!(
        read(&root, "index.html"),
        r#"<html><a href="only.html">only</a></html>"#
    );
    assert_eq!(
        read(&root, "only.html"),
        r#"<html><a href="only.html">only</a></html>"#
    );
}

#[tokio::test]
async fn test_seed_override_drives_discovery() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/online-only">x</a>"#, 0).await;
    mount_page(&server, "/online-only", "<html></html>", 0).await;
    mount_page(&server, "/next", "<title>Next</title>", 1).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let override_path = dir.path().join("override.html");
    std::fs::write(&override_path, r#"<a href="/next">next</a>"#).unwrap();

    let mut config = create_test_config(1);
    config.mirror.index_override = Some(override_path.to_string_lossy().into_owned());

    let result = run_crawl(&format!("{}/", server.uri()), config)
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages[0].source, ContentSource::Override);
    assert_eq!(result.pages[1].source, ContentSource::Network);
    assert_eq!(result.pages[1].title.as_deref(), Some("Next"));
    assert!(result.mirror.is_none());
}

#[tokio::test]
async fn test_missing_override_aborts_before_crawling() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html></html>", 0).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("site");
    let mut config = with_mirror(create_test_config(1), &root);
    config.mirror.index_override = Some(
        dir.path()
            .join("does-not-exist.html")
            .to_string_lossy()
            .into_owned(),
    );

    let err = run_crawl(&format!("{}/", server.uri()), config)
        .await
        .expect_err("Crawl should not start");

    assert!(matches!(err, UtsushiError::Override(_)));
    assert!(!root.exists());
}

#[tokio::test]
async fn test_non_html_target_stored_verbatim() {
    let server = MockServer::start().await;
    let pdf_bytes = b"%PDF-1.4 <a href=\"/not-a-link\">".to_vec();

    mount_page(&server, "/", r#"<a href="/docs/report.pdf">Report</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/docs/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(pdf_bytes.clone())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/not-a-link", "<html></html>", 0).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("site");
    let config = with_mirror(create_test_config(3), &root);

    let result = run_crawl(&format!("{}/", server.uri()), config)
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages[1].state, TaskState::Done);
    assert_eq!(
        result.pages[1].content_type.as_deref(),
        Some("application/pdf")
    );
    assert_eq!(std::fs::read(root.join("docs/report.pdf")).unwrap(), pdf_bytes);
    assert!(read(&root, "index.html").contains(r#"<a href="docs/report.pdf">Report</a>"#));
}

#[tokio::test]
async fn test_query_variants_get_distinct_files() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/list?page=1">1</a><a href="/list?page=2">2</a>"#,
        1,
    )
    .await;
    // path() ignores the query, so both variants hit this mock
    mount_page(&server, "/list", "<p>list</p>", 2).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path().join("site");
    let config = with_mirror(create_test_config(1), &root);

    let result = run_crawl(&format!("{}/", server.uri()), config)
        .await
        .expect("Crawl failed");

    let paths: Vec<_> = result
        .pages
        .iter()
        .skip(1)
        .map(|p| p.local_path.clone().expect("page should be mirrored"))
        .collect();

    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0], "list.html");
    assert_ne!(paths[0], paths[1]);
    assert!(paths[1].starts_with("list-") && paths[1].ends_with(".html"));
    assert!(root.join(&paths[0]).exists());
    assert!(root.join(&paths[1]).exists());

    let index = read(&root, "index.html");
    assert!(index.contains(r#"<a href="list.html">1</a>"#));
    assert!(index.contains(&format!(r#"<a href="{}">2</a>"#, paths[1])));
}

#[tokio::test]
async fn test_redirects_resolve_links_against_final_url() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/old">Old</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/dir/"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/new/dir/", r#"<a href="child">Child</a>"#, 1).await;

    let result = run_crawl(&format!("{}/", server.uri()), create_test_config(1))
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages[1].url, format!("{}/old", server.uri()));
    assert!(result
        .internal_links
        .contains(&format!("{}/new/dir/child", server.uri())));
}

#[tokio::test]
async fn test_page_limit_stops_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/1", "<html></html>", 1).await;
    mount_page(&server, "/2", "<html></html>", 0).await;
    mount_page(&server, "/3", "<html></html>", 0).await;

    let mut config = create_test_config(2);
    config.crawler.max_pages = Some(2);

    let result = run_crawl(&format!("{}/", server.uri()), config)
        .await
        .expect("Crawl failed");

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.stop_reason, StopReason::PageLimit);
    assert_eq!(result.visited_count, 4);
}

#[tokio::test]
async fn test_contacts_and_social_links_collected() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><head><meta name="description" content="Acme home"></head><body>
<a href="mailto:hello@acme.test">Mail</a>
<a href="https://www.linkedin.com/company/acme">LinkedIn</a>
<a href="/contact">Contact</a></body></html>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/contact",
        r#"<p>Call us at (555) 123-4567 or write to sales@acme.test</p>
<a href="https://github.com/acme">Code</a>"#,
        1,
    )
    .await;

    let result = run_crawl(&format!("{}/", server.uri()), create_test_config(1))
        .await
        .expect("Crawl failed");

    assert_eq!(
        result.seed_metadata.description.as_deref(),
        Some("Acme home")
    );
    assert_eq!(result.emails, vec!["hello@acme.test", "sales@acme.test"]);
    assert_eq!(result.phones, vec!["(555) 123-4567"]);
    assert_eq!(
        result.social_links["linkedin"],
        vec!["https://www.linkedin.com/company/acme"]
    );
    assert_eq!(result.social_links["github"], vec!["https://github.com/acme"]);
}

#[test]
fn test_parse_local_file_against_base_url() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("page.html");
    std::fs::write(
        &file,
        r#"<html><head><title>Saved</title><link rel="stylesheet" href="css/site.css"></head>
<body><a href="/about">About</a><a href="https://elsewhere.test/">Out</a></body></html>"#,
    )
    .unwrap();

    let base = url::Url::parse("https://example.com/docs/").unwrap();
    let result = parse_local_file(&file, Some(&base), &ExtractionRules::default())
        .expect("Parse failed");

    assert_eq!(result.seed_metadata.title.as_deref(), Some("Saved"));
    assert_eq!(result.internal_links, vec!["https://example.com/about"]);
    assert_eq!(result.external_links, vec!["https://elsewhere.test/"]);
    assert_eq!(result.resource_count(), 1);
    assert_eq!(result.pages[0].source, ContentSource::File);
}
