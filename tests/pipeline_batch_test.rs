use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use verbatim::config::Settings;
use verbatim::diff::AlignmentTag;
use verbatim::matcher::{Resolution, ScriptedResolver, SkipUnresolved};
use verbatim::pipeline::{BatchRunner, PairRequest, PairStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// * Test Suite for batch runs over explicit pairs and auto-matching

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.crawl.request_delay_ms = 0;
    settings
}

fn html(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            r#"<html><head><title>{title}</title><meta name="description" content="About {title}"></head>
               <body><main>{body}</main></body></html>"#
        ),
        "text/html",
    )
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, times: Option<u64>) {
    let mock = Mock::given(method("GET")).and(path(route)).respond_with(response);
    let mock = match times {
        Some(n) => mock.expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_parse_failure_does_not_stop_batch() {
    let server = MockServer::start().await;
    mount(&server, "/a", html("A", "<h1>Alpha</h1><p>First page text.</p>"), None).await;
    mount(&server, "/c", html("C", "<h1>Gamma</h1><p>Third page text.</p>"), None).await;

    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.txt", "# Alpha\n\nFirst page text.");
    let b = write(&dir, "b.txt", "  \n\n  ");
    let c = write(&dir, "c.txt", "# Gamma\n\nThird page text.");

    let runner = BatchRunner::new(settings()).unwrap();
    let report = runner
        .run_pairs(&[
            PairRequest::new(a, format!("{}/a", server.uri())),
            PairRequest::new(b, format!("{}/b", server.uri())),
            PairRequest::new(c, format!("{}/c", server.uri())),
        ])
        .await
        .unwrap();

    assert_eq!(
        report.statuses(),
        vec![PairStatus::Ok, PairStatus::ParseError, PairStatus::Ok]
    );
    assert!((report.pairs[2].similarity.unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(report.pairs[0].title.as_deref(), Some("A"));
    assert_eq!(report.pairs[0].meta_description.as_deref(), Some("About A"));
    assert!(report.pairs[1].error.is_some());
}

#[tokio::test]
async fn test_fetch_failures_are_per_pair() {
    let server = MockServer::start().await;
    mount(&server, "/ok", html("Ok", "<p>Some content.</p>"), None).await;
    mount(&server, "/empty", html("Empty", ""), None).await;
    mount(&server, "/gone", ResponseTemplate::new(404), None).await;

    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "doc.txt", "Some content.");

    let runner = BatchRunner::new(settings()).unwrap();
    let report = runner
        .run_pairs(&[
            PairRequest::new(doc.clone(), format!("{}/gone", server.uri())),
            PairRequest::new(doc.clone(), format!("{}/empty", server.uri())),
            PairRequest::new(doc.clone(), format!("{}/ok", server.uri())),
        ])
        .await
        .unwrap();

    assert_eq!(
        report.statuses(),
        vec![PairStatus::FetchError, PairStatus::FetchError, PairStatus::Ok]
    );
    assert!(report.pairs[1].error.as_deref().unwrap().contains("No extractable content"));
    assert!(report.to_markdown().contains("❌ fetchError: HTTP 404"));
}

#[tokio::test]
async fn test_changed_page_reports_differences() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/page",
        html("Page", "<h1>Home</h1><p>Welcome to our site.</p><p>Summer sale now on!</p>"),
        None,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "page.txt", "# Home\n\nWelcome to our site.\n\nWe are closed on Sundays.");

    let report = BatchRunner::new(settings())
        .unwrap()
        .run_pairs(&[PairRequest::new(doc, format!("{}/page", server.uri()))])
        .await
        .unwrap();

    assert_eq!(report.record_count(AlignmentTag::Matched), 2);
    assert_eq!(report.record_count(AlignmentTag::Missing), 1);
    assert_eq!(report.record_count(AlignmentTag::Current), 1);
    let similarity = report.pairs[0].similarity.unwrap();
    assert!(similarity > 0.0 && similarity < 1.0);
}

#[tokio::test]
async fn test_auto_match_reuses_crawled_pages() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            "Home",
            r#"<h1>Home</h1><p>Welcome.</p><a href="/about-us">About</a><a href="/contact">Contact</a>"#,
        ),
        Some(1),
    )
    .await;
    mount(
        &server,
        "/about-us",
        html("About", "<h1>About Us</h1><p>We are a small team of builders.</p>"),
        Some(1),
    )
    .await;
    mount(
        &server,
        "/contact",
        html("Contact", "<h1>Contact</h1><p>Write to us any time.</p>"),
        Some(1),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let docs = vec![
        write(&dir, "about-us.txt", "# About Us\n\nWe are a small team of builders."),
        write(&dir, "broken.docx", "not really a docx"),
        write(&dir, "contact.md", "# Contact\n\nWrite to us any time."),
    ];

    let runner = BatchRunner::new(settings()).unwrap();
    let report = runner
        .run_auto(&server.uri(), &docs, &SkipUnresolved)
        .await
        .unwrap();

    assert_eq!(
        report.statuses(),
        vec![PairStatus::Ok, PairStatus::ParseError, PairStatus::Ok]
    );
    assert_eq!(report.pages_crawled, Some(3));
    assert_eq!(
        report.pairs[0].resolution,
        Some(Resolution::Auto(format!("{}/about-us", server.uri())))
    );
    assert!((report.pairs[0].similarity.unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(report.pairs[2].title.as_deref(), Some("Contact"));
}

#[tokio::test]
async fn test_auto_match_manual_url_is_fetched() {
    let server = MockServer::start().await;
    mount(&server, "/", html("Home", "<p>Nothing related.</p>"), None).await;
    mount(&server, "/hidden", html("Hidden", "<p>Hidden page copy.</p>"), Some(1)).await;

    let dir = TempDir::new().unwrap();
    let docs = vec![
        write(&dir, "xyz.txt", "Hidden page copy."),
        write(&dir, "other.txt", "Unrelated words."),
    ];
    let hidden = format!("{}/hidden", server.uri());
    let resolver = ScriptedResolver::new().with_answer("xyz.txt", hidden.clone());

    let mut settings = settings();
    // * Force every document through the resolver
    settings.matching.auto_accept = 1.0;
    let report = BatchRunner::new(settings)
        .unwrap()
        .run_auto(&server.uri(), &docs, &resolver)
        .await
        .unwrap();

    assert_eq!(report.statuses(), vec![PairStatus::Ok, PairStatus::Skipped]);
    assert_eq!(report.pairs[0].resolution, Some(Resolution::Manual(hidden)));
    assert!((report.pairs[0].similarity.unwrap() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_empty_document_list_is_an_error() {
    let runner = BatchRunner::new(settings()).unwrap();
    assert!(runner.run_pairs(&[]).await.is_err());
}
