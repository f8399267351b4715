//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end over the real reqwest transport.

use std::io::Write;
use tempfile::{tempdir, NamedTempFile};
use web_census::config::{load_config, Config};
use web_census::crawler::run_crawl;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server only
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::new("127.0.0.1");
    config.crawler.start_url = Some(format!("{}/", base_url));
    config.crawler.request_delay = 0.0;
    config.crawler.max_depth = 2;
    config.crawler.concurrency = 4;
    config.crawler.page_timeout = 5.0;
    config.crawler.robots_timeout = 2.0;
    config.crawler.robots_scheme = "http".to_string();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.text_log_path = None;
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body)
            .into_bytes(),
        "text/html",
    )
}

fn anchors(hrefs: &[&str]) -> String {
    hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect()
}

async fn mount_page(server: &MockServer, route: &str, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        &anchors(&[
            "/page1",
            &format!("{}/page2", base_url),
            "https://partner.example.org/about",
            "/docs/handbook.pdf",
            "/docs/form.doc",
            "mailto:office@example.edu",
        ]),
        1,
    )
    .await;
    mount_page(&mock_server, "/page1", &anchors(&["/page2", "/"]), 1).await;
    mount_page(&mock_server, "/page2", "Content 2", 1).await;

    let stats = run_crawl(create_test_config(&base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(stats.total_pages, 3);
    assert_eq!(stats.internal_pages, 3);
    assert_eq!(stats.broken_pages, 0);
    assert_eq!(stats.subdomains, vec!["127.0.0.1"]);
    assert_eq!(stats.external_links.total, 1);
    assert_eq!(stats.external_links.unique, vec!["partner.example.org"]);
    assert_eq!(stats.files.total, 2);
    assert_eq!(stats.files.pdf, 1);
    assert_eq!(stats.files.doc, 1);
    assert!(stats.error.is_none());
    assert!(stats.duration().is_some());
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(
        &mock_server,
        "User-agent: *\nDisallow: /private\nAllow: /private/open",
    )
    .await;
    mount_page(
        &mock_server,
        "/",
        &anchors(&["/private/records", "/private/open/news", "/public"]),
        1,
    )
    .await;
    mount_page(&mock_server, "/private/records", "secret", 0).await;
    mount_page(&mock_server, "/private/open/news", "news", 1).await;
    mount_page(&mock_server, "/public", "public", 1).await;

    let stats = run_crawl(create_test_config(&base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(stats.total_pages, 3);
    // Robots denials are not broken pages
    assert_eq!(stats.broken_pages, 0);
}

#[tokio::test]
async fn test_missing_robots_txt_allows_everything() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", &anchors(&["/a"]), 1).await;
    mount_page(&mock_server, "/a", "leaf", 1).await;

    let stats = run_crawl(create_test_config(&base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(stats.total_pages, 2);
}

#[tokio::test]
async fn test_interlinked_pages_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let routes: Vec<String> = (0..10).map(|i| format!("/node/{}", i)).collect();
    let mut hrefs: Vec<&str> = routes.iter().map(String::as_str).collect();
    hrefs.push("/");
    let mesh = anchors(&hrefs);

    mount_robots(&mock_server, "User-agent: *\nDisallow:").await;
    mount_page(&mock_server, "/", &mesh, 1).await;
    for route in &routes {
        mount_page(&mock_server, route, &mesh, 1).await;
    }

    let mut config = create_test_config(&base_url);
    config.crawler.concurrency = 8;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.total_pages, 11);
    assert_eq!(stats.total_links, 11 * 11);
    // MockServer verifies every `expect(1)` on drop
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/", &anchors(&["/level1"]), 1).await;
    mount_page(&mock_server, "/level1", &anchors(&["/level2"]), 1).await;
    mount_page(&mock_server, "/level2", &anchors(&["/level3"]), 1).await;
    mount_page(&mock_server, "/level3", "too deep", 0).await;

    let stats = run_crawl(create_test_config(&base_url))
        .await
        .expect("Crawl failed");

    assert_eq!(stats.total_pages, 3);
    // Links on the deepest page are still counted
    assert_eq!(stats.total_links, 3);
}

#[tokio::test]
async fn test_page_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/", &anchors(&["/a", "/b", "/c", "/d", "/e"]), 1).await;
    for route in ["/a", "/b", "/c", "/d", "/e"] {
        mount_page(&mock_server, route, "child", 0).await;
    }

    let mut config = create_test_config(&base_url);
    config.crawler.max_pages = 1;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.total_pages, 1);
    assert_eq!(stats.total_links, 5);
}

#[tokio::test]
async fn test_broken_and_skipped_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "").await;
    mount_page(
        &mock_server,
        "/",
        &anchors(&["/error", "/missing", "/data.json", "/big"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(html_page(&"x".repeat(4096)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.max_body_bytes = 1024;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.total_pages, 1);
    assert_eq!(stats.broken_pages, 2);
    let mut broken = stats.error_links.clone();
    broken.sort();
    assert_eq!(
        broken,
        vec![format!("{}/error", base_url), format!("{}/missing", base_url)]
    );
}

#[tokio::test]
async fn test_large_error_page_counts_as_broken() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/", &anchors(&["/maintenance", "/annual-report"]), 1).await;
    Mock::given(method("GET"))
        .and(path("/maintenance"))
        .respond_with(
            ResponseTemplate::new(503).set_body_raw("x".repeat(4096).into_bytes(), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/annual-report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0u8; 4096], "application/octet-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&base_url);
    config.crawler.max_body_bytes = 1024;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.total_pages, 1);
    // The status decides, not the body size
    assert_eq!(stats.broken_pages, 1);
    assert_eq!(stats.error_links, vec![format!("{}/maintenance", base_url)]);
}

#[tokio::test]
async fn test_unreachable_start_url() {
    let mut config = create_test_config("http://127.0.0.1:1");
    config.crawler.page_timeout = 2.0;

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.total_pages, 0);
    assert_eq!(stats.broken_pages, 1);
    assert_eq!(stats.error_links, vec!["http://127.0.0.1:1/"]);
    assert!(stats.error.is_none());
}

#[tokio::test]
async fn test_config_file_and_text_log() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/", "<p>Welcome</p><a href=\"/about\">About</a>", 1).await;
    mount_page(&mock_server, "/about", "<p>Founded 1890</p>", 1).await;

    let dir = tempdir().unwrap();
    let log_path = dir.path().join("pages.txt");

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[crawler]
target-domain = "127.0.0.1"
start-url = "{base}/"
request-delay = 0.0
robots-scheme = "http"
domain-match = "suffix"

[output]
text-log-path = "{log}"
"#,
        base = base_url,
        log = log_path.display()
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    let stats = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(stats.total_pages, 2);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let separator = "-".repeat(80);
    assert_eq!(log.matches(&separator).count(), 2);
    assert!(log.contains(&format!("URL: {}/\nText:\nTest\nWelcome\nAbout\n", base_url)));
    assert!(log.contains(&format!("URL: {}/about\nText:\nTest\nFounded 1890\n", base_url)));
}
