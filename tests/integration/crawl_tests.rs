//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive full crawl
//! sessions through the controller, saving into temporary folders.

use std::time::Duration;
use tempfile::TempDir;
use trawler::config::Config;
use trawler::{ConsoleEvent, CrawlController, CrawlPhase, CrawlReport, StartRequest, TrawlError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration without the politeness delay
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.politeness_delay_ms = 0;
    config.crawler.request_timeout_secs = 2;
    config.crawler.download_workers = 2;
    config.crawler.chunk_size = 512;
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn request(seed: String, folder: &TempDir, max_depth: u32, max_pages: u32) -> StartRequest {
    StartRequest {
        seed_url: seed,
        max_depth,
        max_pages,
        save_folder: folder.path().to_path_buf(),
    }
}

/// Runs one session to completion and returns its report and log lines
async fn run_crawl(config: Config, request: StartRequest) -> (CrawlReport, Vec<String>) {
    let (controller, mut events) = CrawlController::new(config);
    controller.start(request).expect("Failed to start crawl");

    let report = controller.wait().await.expect("No report");
    assert_eq!(controller.phase(), CrawlPhase::Idle);

    let mut logs = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ConsoleEvent::Log(line) = event {
            logs.push(line);
        }
    }
    (report, logs)
}

#[tokio::test]
async fn test_depth_bound_domain_containment_and_download() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="/a.html">A</a>
            <a href="{}/b.html">Elsewhere</a>
            <a href="/files/doc.pdf">Doc</a>
            <a href="{}/manual.pdf">Manual</a>
            </body></html>"#,
            other_server.uri(),
            other_server.uri()
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/a.html",
        r#"<a href="/deep.html">Deeper</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/deep.html", String::new(), 0).await;
    mount_page(&other_server, "/b.html", String::new(), 0).await;

    Mock::given(method("GET"))
        .and(path("/files/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 test".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Files are downloaded from any host
    Mock::given(method("GET"))
        .and(path("/manual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 manual".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&other_server)
        .await;

    let folder = TempDir::new().unwrap();
    let (report, logs) = run_crawl(
        create_test_config(),
        request(format!("{}/", base_url), &folder, 1, 0),
    )
    .await;

    assert_eq!(
        report.visited,
        vec![format!("{}/", base_url), format!("{}/a.html", base_url)]
    );
    assert_eq!(report.downloaded.len(), 2);
    assert!(report
        .downloaded
        .contains(&format!("{}/files/doc.pdf", base_url)));
    assert!(report
        .downloaded
        .contains(&format!("{}/manual.pdf", other_server.uri())));
    assert_eq!(
        std::fs::read(folder.path().join("doc.pdf")).unwrap(),
        b"%PDF-1.4 test"
    );
    assert_eq!(
        std::fs::read(folder.path().join("manual.pdf")).unwrap(),
        b"%PDF-1.4 manual"
    );

    assert!(logs.contains(&format!("Downloaded: {}/files/doc.pdf", base_url)));
    assert!(logs.contains(&"Crawling completed or stopped.".to_string()));
    assert_eq!(logs.last().unwrap(), "Total files downloaded: 2");
}

#[tokio::test]
async fn test_download_by_content_type() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/report">Report</a>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.7".to_vec(), "application/pdf"))
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    let (report, _) = run_crawl(
        create_test_config(),
        request(format!("{}/", base_url), &folder, 0, 0),
    )
    .await;

    assert_eq!(report.downloaded, vec![format!("{}/report", base_url)]);
    assert!(folder.path().join("report").exists());
}

#[tokio::test]
async fn test_page_bound() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/p{}.html">{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", links, 1).await;
    Mock::given(method("GET"))
        .respond_with(html("<p>leaf</p>".to_string()))
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    let (report, _) = run_crawl(
        create_test_config(),
        request(format!("{}/", base_url), &folder, 0, 3),
    )
    .await;

    assert_eq!(report.visited.len(), 3);
    assert_eq!(report.visited[1], format!("{}/p1.html", base_url));
    assert_eq!(report.visited[2], format!("{}/p2.html", base_url));
}

#[tokio::test]
async fn test_existing_file_is_not_downloaded_again() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/archive.zip">Archive</a>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/archive.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    std::fs::write(folder.path().join("archive.zip"), "old").unwrap();

    let (report, logs) = run_crawl(
        create_test_config(),
        request(format!("{}/", base_url), &folder, 0, 0),
    )
    .await;

    assert!(report.downloaded.is_empty());
    assert_eq!(
        std::fs::read_to_string(folder.path().join("archive.zip")).unwrap(),
        "old"
    );
    assert!(logs.iter().any(|l| l.starts_with("Already downloaded:")));
    assert_eq!(logs.last().unwrap(), "Total files downloaded: 0");
}

#[tokio::test]
async fn test_shared_links_are_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a.html">A</a><a href="/b.html">B</a><a href="/shared.html#top">S</a>"#
            .to_string(),
        1,
    )
    .await;
    for page in ["/a.html", "/b.html"] {
        mount_page(
            &mock_server,
            page,
            r#"<a href="/shared.html">S</a><a href="/">Home</a><a href="/img/logo.png">Logo</a>"#
                .to_string(),
            1,
        )
        .await;
    }
    mount_page(&mock_server, "/shared.html", String::new(), 1).await;
    Mock::given(method("GET"))
        .and(path("/img/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 2048], "image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    let (report, _) = run_crawl(
        create_test_config(),
        request(format!("{}/", base_url), &folder, 0, 0),
    )
    .await;

    assert_eq!(report.visited.len(), 4);
    assert_eq!(report.downloaded.len(), 1);
    assert_eq!(
        std::fs::metadata(folder.path().join("logo.png")).unwrap().len(),
        2048
    );
}

#[tokio::test]
async fn test_pause_then_stop_terminates() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (1..=20)
        .map(|i| format!(r#"<a href="/p{}.html">{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", links, 1).await;
    Mock::given(method("GET"))
        .respond_with(html(String::new()).set_delay(Duration::from_millis(50)))
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    let mut config = create_test_config();
    config.crawler.politeness_delay_ms = 100;

    let (controller, _events) = CrawlController::new(config);
    let mut phases = controller.subscribe_phase();
    controller
        .start(request(format!("{}/", base_url), &folder, 0, 0))
        .unwrap();
    assert_eq!(controller.phase(), CrawlPhase::Running);
    assert!(matches!(
        controller.start(request(format!("{}/", base_url), &folder, 0, 0)),
        Err(TrawlError::AlreadyRunning { .. })
    ));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(controller.toggle_pause().unwrap(), CrawlPhase::Paused);
    assert_eq!(controller.phase(), CrawlPhase::Paused);

    // Let a request already past the gate finish, then count
    tokio::time::sleep(Duration::from_millis(200)).await;
    let before = mock_server.received_requests().await.unwrap().len();

    // While paused no further pages are taken from the frontier
    tokio::time::sleep(Duration::from_millis(300)).await;
    let after = mock_server.received_requests().await.unwrap().len();
    assert_eq!(before, after);
    assert_eq!(controller.phase(), CrawlPhase::Paused);

    controller.stop().unwrap();
    assert!(matches!(controller.resume(), Err(TrawlError::NotRunning)));

    let report = tokio::time::timeout(Duration::from_secs(5), controller.wait())
        .await
        .expect("Paused session did not stop")
        .expect("No report");

    assert_eq!(report.outcome, trawler::output::SessionOutcome::Stopped);
    assert!(report.visited.len() < 21);
    assert_eq!(controller.phase(), CrawlPhase::Idle);
    assert!(phases.has_changed().unwrap());
    assert_eq!(*phases.borrow_and_update(), CrawlPhase::Idle);
}

#[tokio::test]
async fn test_pause_after_stop_is_rejected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html(String::new()).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    let (controller, _events) = CrawlController::new(create_test_config());
    controller
        .start(request(format!("{}/", base_url), &folder, 0, 0))
        .unwrap();

    controller.stop().unwrap();
    assert!(matches!(controller.pause(), Err(TrawlError::NotRunning)));
    assert!(matches!(controller.toggle_pause(), Err(TrawlError::NotRunning)));
    assert_ne!(controller.phase(), CrawlPhase::Paused);

    let report = tokio::time::timeout(Duration::from_secs(5), controller.wait())
        .await
        .expect("Stopped session did not finish")
        .expect("No report");

    assert_eq!(report.outcome, trawler::output::SessionOutcome::Stopped);
    assert_eq!(controller.phase(), CrawlPhase::Idle);
}

#[tokio::test]
async fn test_restart_after_completion() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/files/a.txt">A</a>"#.to_string(),
        2,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("alpha"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let folder = TempDir::new().unwrap();
    let (controller, _events) = CrawlController::new(create_test_config());

    controller
        .start(request(format!("{}/", base_url), &folder, 0, 0))
        .unwrap();
    let first = controller.wait().await.unwrap();
    assert_eq!(first.downloaded.len(), 1);

    // The second session starts fresh; the saved file makes the download a no-op
    controller
        .start(request(format!("{}/", base_url), &folder, 0, 0))
        .unwrap();
    let second = controller.wait().await.unwrap();
    assert_eq!(second.visited, first.visited);
    assert!(second.downloaded.is_empty());
    assert_eq!(controller.phase(), CrawlPhase::Idle);
}

#[tokio::test]
async fn test_invalid_seed_starts_nothing() {
    let folder = TempDir::new().unwrap();
    let (controller, mut events) = CrawlController::new(create_test_config());

    let result = controller.start(request("example.com".to_string(), &folder, 0, 0));
    assert!(matches!(result, Err(TrawlError::Validation(_))));
    assert_eq!(controller.phase(), CrawlPhase::Idle);
    assert!(controller.wait().await.is_none());
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing.html">Gone</a><a href="/ok.html">Ok</a>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok.html", String::new(), 1).await;

    let folder = TempDir::new().unwrap();
    let (report, _) = run_crawl(
        create_test_config(),
        request(format!("{}/", base_url), &folder, 0, 0),
    )
    .await;

    assert_eq!(report.visited.len(), 3);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.outcome, trawler::output::SessionOutcome::Completed);
}
