//! Integration tests for the crawler
//!
//! The first group drives the full stack (reqwest fetcher, robots.txt, file
//! sinks) against a wiremock server. The second group drives the controller
//! through a scripted fetcher so crawl properties can be checked without a
//! network.

use async_trait::async_trait;
use sitecrawl::config::{parse_config, Config};
use sitecrawl::crawler::{
    crawl, CrawlSettings, Controller, FetchError, FetchedPage, Fetcher, Frontier, StopHandle,
};
use sitecrawl::output::{MemorySink, SqliteSink};
use sitecrawl::{PageRecord, StopReason};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for a crawl of the mock server
fn create_test_config(base_url: &str, records_path: &Path, extra_output: &str) -> Config {
    let host = Url::parse(base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    let toml = format!(
        r#"
[crawler]
seed-url = "{base_url}/"
allowed-domains = ["{host}"]
max-pages = 100
download-delay-ms = 0
randomize-delay = false
request-timeout-secs = 5

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
records-path = "{records}"
{extra_output}
"#,
        records = records_path.display(),
    );

    parse_config(&toml).expect("Failed to parse test config")
}

/// HTML response; `set_body_string` would force `text/plain`
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn read_jsonl(path: &Path) -> Vec<PageRecord> {
    std::fs::read_to_string(path)
        .expect("Failed to read records file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid record line"))
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <p>Welcome to the computing department</p>
            <a href="/page1">Page 1</a>
            <a href="{base_url}/page2">Page 2</a>
            <a href="https://other.org/page">Elsewhere</a>
            <a href="mailto:info@example.com">Mail</a>
            <a href="/syllabus.pdf">Syllabus</a>
            </body></html>"#
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body><p>Research research labs</p><a href="/">Home</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><p>Courses</p><a href="/page1">Page 1</a></body></html>"#,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("crawl_data.json");
    let config = create_test_config(&base_url, &records_path, "");

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");

    assert_eq!(summary.reason, StopReason::FrontierExhausted);
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.fetch_failures, 0);
    assert_eq!(summary.frontier_remaining, 0);

    let records = read_jsonl(&records_path);
    assert_eq!(records.len(), 3);
    assert_eq!(
        records.iter().map(|r| r.crawl_order).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let home = &records[0];
    assert_eq!(home.url, format!("{}/", base_url));
    assert_eq!(home.title, "Home");
    assert_eq!(home.status_code, 200);
    assert_eq!(home.link_count, 5);
    assert!(home.keywords.contains(&"computing".to_string()));

    assert_eq!(records[1].title, "Page 1");
    assert_eq!(records[1].keywords[0], "research");
    assert_eq!(records[2].title, "Page 2");
}

#[tokio::test]
async fn test_robots_disallow_prevents_fetching() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "<p>Open page</p>").await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("<p>Hidden</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("records.json");
    let config = create_test_config(&base_url, &records_path, "");

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.fetch_failures, 1);

    let urls: Vec<String> = read_jsonl(&records_path).into_iter().map(|r| r.url).collect();
    assert!(!urls.iter().any(|u| u.contains("/private")));
}

#[tokio::test]
async fn test_error_responses_are_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/feed">Feed</a><a href="/broken">Broken</a><a href="/ok">Ok</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", "<p>Fine</p>").await;

    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("records.json");
    let config = create_test_config(&base_url, &records_path, "");

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.fetch_failures, 3);
    assert_eq!(read_jsonl(&records_path).len(), 2);
}

#[tokio::test]
async fn test_redirect_recorded_under_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", r#"<p>Moved here</p><a href="/new">self</a>"#).await;

    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("records.json");
    let config = create_test_config(&base_url, &records_path, "");

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");

    assert_eq!(summary.total_pages, 2);
    let records = read_jsonl(&records_path);
    assert_eq!(records[1].url, format!("{}/new", base_url));
}

#[tokio::test]
async fn test_redirect_into_disallowed_path_is_not_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", r#"<a href="/old">Old</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/private/page"))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/private/page", "<p>Hidden</p>").await;

    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("records.json");
    let config = create_test_config(&base_url, &records_path, "");

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");

    assert_eq!(summary.total_pages, 1);
    assert_eq!(summary.fetch_failures, 1);
    let urls: Vec<String> = read_jsonl(&records_path).into_iter().map(|r| r.url).collect();
    assert_eq!(urls, vec![format!("{}/", base_url)]);
}

#[tokio::test]
async fn test_latin1_page_is_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/cafe">Cafe</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<html><title>Caf\xe9</title><p>Research at the caf\xe9</p></html>".to_vec(),
            "text/html; charset=iso-8859-1",
        ))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("records.json");
    let config = create_test_config(&base_url, &records_path, "");

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.parse_failures, 0);
    let records = read_jsonl(&records_path);
    assert_eq!(records[1].title, "Caf\u{e9}");
    assert!(records[1].keywords.contains(&"research".to_string()));
}

#[tokio::test]
async fn test_sqlite_output_and_markdown_summary() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<title>Home</title><a href="/a">A</a>"#).await;
    mount_page(&mock_server, "/a", "<title>A</title><p>Alpha</p>").await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("crawl.db");
    let summary_path = dir.path().join("summary.md");
    let config = create_test_config(
        &base_url,
        &db_path,
        &format!(
            "format = \"sqlite\"\nsummary-path = \"{}\"",
            summary_path.display()
        ),
    );

    let summary = crawl(&config, StopHandle::new()).await.expect("Crawl failed");
    assert_eq!(summary.total_pages, 2);

    let sink = SqliteSink::open(&db_path).expect("Failed to reopen database");
    assert_eq!(sink.count().unwrap(), 2);
    let titles: Vec<String> = sink.load_records().unwrap().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Home", "A"]);

    let markdown = std::fs::read_to_string(&summary_path).expect("Summary not written");
    assert!(markdown.contains("frontier exhausted"));
}

/// Serves pages from an in-memory table; unknown URLs are 404s
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    stop_on: Option<(String, StopHandle)>,
}

impl ScriptedFetcher {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    fn stop_when_fetching(mut self, url: &str, stop: StopHandle) -> Self {
        self.stop_on = Some((url.to_string(), stop));
        self
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<FetchedPage, FetchError> {
        if let Some((trigger, stop)) = &self.stop_on {
            if trigger == url.as_str() {
                stop.stop();
            }
        }

        match self.pages.get(url.as_str()) {
            Some(body) => Ok(FetchedPage {
                final_url: url.clone(),
                status: 200,
                body: body.as_bytes().to_vec(),
                charset: None,
            }),
            None => Err(FetchError::Status(404)),
        }
    }
}

const SEED: &str = "https://cc.gatech.edu/";

fn scripted_settings(max_pages: u64) -> CrawlSettings {
    CrawlSettings {
        max_pages,
        download_delay: Duration::ZERO,
        randomize_delay: false,
        ..CrawlSettings::new(["cc.gatech.edu"])
    }
}

fn seed_frontier() -> Frontier {
    Frontier::with_seed(&Url::parse(SEED).unwrap())
}

fn seed_page_with_three_links() -> ScriptedFetcher {
    ScriptedFetcher::default()
        .page(
            SEED,
            r#"<title>Home</title>
            <a href="/about">About</a>
            <a href="https://cc.gatech.edu/research">Research</a>
            <a href="https://other.org/page">Other</a>"#,
        )
        .page("https://cc.gatech.edu/about", "<p>About us</p>")
        .page("https://cc.gatech.edu/research", "<p>Research</p>")
}

#[tokio::test]
async fn test_one_step_queues_in_domain_links() {
    let mut controller = Controller::new(
        scripted_settings(1),
        seed_frontier(),
        seed_page_with_three_links(),
        MemorySink::new(),
    );

    let summary = controller.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::BudgetReached);
    let records = controller.sink().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, SEED);
    assert_eq!(records[0].crawl_order, 1);

    assert_eq!(controller.frontier().len(), 2);
    assert!(controller
        .frontier()
        .has_seen(&Url::parse("https://cc.gatech.edu/about").unwrap()));
    assert!(!controller
        .frontier()
        .has_seen(&Url::parse("https://other.org/page").unwrap()));
}

#[tokio::test]
async fn test_zero_budget_crawls_nothing() {
    let mut controller = Controller::new(
        scripted_settings(0),
        seed_frontier(),
        seed_page_with_three_links(),
        MemorySink::new(),
    );

    let summary = controller.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::BudgetReached);
    assert_eq!(summary.total_pages, 0);
    assert!(controller.sink().is_empty());
}

#[tokio::test]
async fn test_pages_linking_each_other_are_crawled_once() {
    let fetcher = ScriptedFetcher::default()
        .page(SEED, r#"<a href="/a">a</a><a href="/b">b</a><a href="/#top">top</a>"#)
        .page("https://cc.gatech.edu/a", r#"<a href="/b">b</a><a href="/">home</a>"#)
        .page("https://cc.gatech.edu/b", r#"<a href="/a">a</a><a href="/?utm_source=x">home</a>"#);
    let mut controller =
        Controller::new(scripted_settings(100), seed_frontier(), fetcher, MemorySink::new());

    let summary = controller.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::FrontierExhausted);
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.seen_urls, 3);

    let mut urls: Vec<String> = controller.sink().records().into_iter().map(|r| r.url).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 3);
}

#[tokio::test]
async fn test_stop_signal_ends_crawl_with_summary() {
    let controller_stop = StopHandle::new();
    let fetcher = seed_page_with_three_links()
        .stop_when_fetching("https://cc.gatech.edu/about", controller_stop.clone());
    let mut controller =
        Controller::new(scripted_settings(100), seed_frontier(), fetcher, MemorySink::new())
            .with_stop_handle(controller_stop);

    let summary = controller.run().await.unwrap();

    assert_eq!(summary.reason, StopReason::ExternalStop);
    // The fetch that saw the signal was already in flight and still counts.
    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.frontier_remaining, 1);
}
