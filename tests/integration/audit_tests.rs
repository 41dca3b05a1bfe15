//! End-to-end page audits against mock servers

use link_auditor::audit::audit_config;
use link_auditor::config::{Config, HttpConfig, OutputConfig};
use link_auditor::fetch::{FetchEngine, FetchSettings, HttpTransport, DEFAULT_USER_AGENT};
use link_auditor::{AuditError, AuditRow, PageAuditor, PairMatchResult, Presence};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_auditor() -> PageAuditor<HttpTransport> {
    let transport = HttpTransport::new(DEFAULT_USER_AGENT).expect("Failed to build transport");
    PageAuditor::new(FetchEngine::new(transport, FetchSettings::default()))
}

async fn mount_head(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

async fn mount_get(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_audit_page_with_links_and_signals() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/post", ResponseTemplate::new(200)).await;
    mount_get(
        &server,
        "/post",
        html(format!(
            r#"<html><head>
                <meta name="robots" content="index, nofollow">
                <link rel="canonical" href="{base}/post">
            </head><body>
                <p>Read <a href="/target" rel="nofollow">Target  Link</a> today.</p>
                <a href="https://other.example/page">Other page</a>
            </body></html>"#
        )),
    )
    .await;
    mount_get(
        &server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string(
            "User-agent: *\nDisallow: /private\n\nUser-agent: Googlebot\nDisallow: /post\n",
        ),
    )
    .await;

    let row = AuditRow::new(format!("{base}/post"))
        .with_pair(1, "target link", &format!("{base}/target"))
        .with_pair(2, "Wrong anchor", "https://other.example/page")
        .with_pair(3, "Missing", "https://missing.example/");

    let result = create_auditor().audit_page(&row).await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.final_status_code, 200);
    assert_eq!(result.final_url, format!("{base}/post"));
    assert!(result.redirect_chain.is_empty());
    assert_eq!(result.error, None);
    assert!(!result.tls_fallback_used);

    assert_eq!(result.seo.robots_allowed_star, Some(true));
    assert_eq!(result.seo.robots_allowed_googlebot, Some(false));
    let directive = result.seo.indexing_directive.clone().unwrap();
    assert!(!directive.noindex);
    assert!(directive.nofollow);
    assert_eq!(directive.source.as_deref(), Some("Meta Robots"));
    assert_eq!(result.seo.canonical_url, Some(format!("{base}/post")));
    assert_eq!(result.seo.canonical_differs, Some(false));
    assert_eq!(result.seo_check_error, None);

    assert_eq!(
        result.links[0],
        PairMatchResult {
            found: Presence::Yes,
            anchor_matches: Presence::Yes,
            rel_attributes: Some("nofollow".to_string()),
        }
    );
    assert_eq!(result.links[1].found, Presence::Yes);
    assert_eq!(result.links[1].anchor_matches, Presence::No);
    assert_eq!(result.links[1].rel_attributes, None);
    assert_eq!(result.links[2], PairMatchResult::not_found());
    assert_eq!(result.link_check_error, None);
}

#[tokio::test]
async fn test_redirect_chain_is_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/middle"),
    )
    .await;
    mount_head(
        &server,
        "/middle",
        ResponseTemplate::new(302).insert_header("location", format!("{base}/new").as_str()),
    )
    .await;
    mount_head(&server, "/new", ResponseTemplate::new(200)).await;
    mount_get(
        &server,
        "/new",
        html(r#"<a href="https://target.example/">Target</a>"#.to_string()),
    )
    .await;

    let row = AuditRow::new(format!("{base}/old")).with_pair(1, "Target", "https://target.example");
    let result = create_auditor().audit_page(&row).await;

    assert_eq!(result.url, format!("{base}/old"));
    assert_eq!(result.status_code, 301);
    assert_eq!(result.final_status_code, 200);
    assert_eq!(result.final_url, format!("{base}/new"));

    let chain: Vec<(String, u16)> = result
        .redirect_chain
        .iter()
        .map(|hop| (hop.url.clone(), hop.status_code))
        .collect();
    assert_eq!(
        chain,
        vec![(format!("{base}/old"), 301), (format!("{base}/middle"), 302)]
    );

    assert_eq!(result.links[0].found, Presence::Yes);
    assert_eq!(result.links[0].anchor_matches, Presence::Yes);
}

#[tokio::test]
async fn test_not_found_page_skips_content_checks() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/gone", ResponseTemplate::new(404)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let row = AuditRow::new(format!("{base}/gone"))
        .with_pair(1, "Target", "https://target.example/");
    let result = create_auditor().audit_page(&row).await;

    assert_eq!(result.status_code, 404);
    assert_eq!(result.final_status_code, 404);
    assert_eq!(result.error, None);
    assert_eq!(result.seo.robots_allowed_star, None);
    assert_eq!(result.seo.indexing_directive, None);
    assert_eq!(result.links[0].found, Presence::NotApplicable);
    assert_eq!(result.links[0].anchor_matches, Presence::NotApplicable);
}

#[tokio::test]
async fn test_x_robots_tag_takes_precedence_over_meta() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/page", ResponseTemplate::new(200)).await;
    mount_get(
        &server,
        "/page",
        html(r#"<html><head><meta name="googlebot" content="noindex"></head></html>"#.to_string())
            .insert_header("x-robots-tag", "nofollow"),
    )
    .await;
    mount_get(&server, "/robots.txt", ResponseTemplate::new(404)).await;

    let result = create_auditor()
        .audit_page(&AuditRow::new(format!("{base}/page")))
        .await;

    let directive = result.seo.indexing_directive.unwrap();
    assert!(directive.nofollow);
    assert!(!directive.noindex);
    assert_eq!(directive.source.as_deref(), Some("X-Robots-Tag"));
    assert_eq!(result.seo.robots_allowed_star, Some(true));
    assert_eq!(result.seo.robots_allowed_googlebot, Some(true));
}

#[tokio::test]
async fn test_windows_1251_page_is_decoded() {
    let server = MockServer::start().await;
    let base = server.uri();

    let page = "<html><body><p>Найкращі ціни на смартфони, навушники та аксесуари \
        в нашому інтернет-магазині. Доставка по всій країні протягом двох днів, \
        гарантія від виробника та знижки для постійних покупців.</p>\
        <a href=\"https://shop.example/\">Купити телефон</a></body></html>";
    let (body, _, _) = encoding_rs::WINDOWS_1251.encode(page);

    mount_head(&server, "/ua", ResponseTemplate::new(200)).await;
    mount_get(
        &server,
        "/ua",
        ResponseTemplate::new(200).set_body_bytes(body.into_owned()),
    )
    .await;

    let row = AuditRow::new(format!("{base}/ua"))
        .with_pair(1, "купити  телефон", "https://shop.example/");
    let result = create_auditor().audit_page(&row).await;

    assert_eq!(result.links[0].found, Presence::Yes);
    assert_eq!(result.links[0].anchor_matches, Presence::Yes);
}

#[tokio::test]
async fn test_get_failure_reported_in_check_errors() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_head(&server, "/flaky", ResponseTemplate::new(200)).await;
    mount_get(&server, "/flaky", ResponseTemplate::new(503)).await;

    let row = AuditRow::new(format!("{base}/flaky"))
        .with_pair(1, "Target", "https://target.example/");
    let result = create_auditor().audit_page(&row).await;

    assert_eq!(result.final_status_code, 200);
    assert_eq!(result.error, None);
    let message = result.seo_check_error.clone().expect("GET failure should be reported");
    assert!(message.contains("503"));
    assert_eq!(result.link_check_error, Some(message));
}

#[tokio::test]
async fn test_configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/ua-check"))
        .and(header("user-agent", "LinkAuditorTest/1.0"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new("LinkAuditorTest/1.0").expect("Failed to build transport");
    let auditor = PageAuditor::new(FetchEngine::new(transport, FetchSettings::default()));
    let result = auditor
        .audit_page(&AuditRow::new(format!("{base}/ua-check")))
        .await;

    assert_eq!(result.final_status_code, 204);
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn test_head_timeout_does_not_fall_back() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(DEFAULT_USER_AGENT).expect("Failed to build transport");
    let settings = FetchSettings {
        head_timeout: Duration::from_secs(1),
        ..FetchSettings::default()
    };
    let auditor = PageAuditor::new(FetchEngine::new(transport, settings));
    let row = AuditRow::new(format!("{base}/slow")).with_pair(1, "Target", "https://t.example/");
    let result = auditor.audit_page(&row).await;

    assert!(result.error.is_some());
    assert!(!result.tls_fallback_used);
    assert_eq!(result.status_code, 0);
    assert_eq!(result.final_status_code, 0);
    assert_eq!(result.links[0].found, Presence::NotApplicable);
}

#[tokio::test]
async fn test_tls_handshake_failure_retries_without_verification() {
    // Answers every ClientHello with a fatal handshake_failure alert
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                if socket.read(&mut buf).await.unwrap_or(0) == 0 {
                    return;
                }
                let alert = [0x15, 0x03, 0x03, 0x00, 0x02, 0x02, 0x28];
                let _ = socket.write_all(&alert).await;
                let _ = socket.flush().await;
                while socket.read(&mut buf).await.unwrap_or(0) > 0 {}
            });
        }
    });

    let url = format!("https://{addr}/page");
    let result = create_auditor().audit_page(&AuditRow::new(url.clone())).await;

    assert!(result.tls_fallback_used);
    assert_eq!(result.final_url, url);
    assert_eq!(result.final_status_code, 0);
    let error = result.error.expect("both attempts should fail");
    assert!(error.contains("HEAD failed with TLS verification disabled"));
    assert!(error.to_lowercase().contains("handshake"));
}

#[tokio::test]
async fn test_batch_of_unreachable_rows_keeps_order() {
    let config = Config {
        http: HttpConfig {
            head_timeout_secs: 2,
            ..HttpConfig::default()
        },
        output: OutputConfig {
            results_path: "./results.json".to_string(),
            summary_path: "./summary.md".to_string(),
        },
        pages: vec![
            AuditRow::new("http://127.0.0.1:1/first"),
            AuditRow::new("   "),
            AuditRow::new("http://127.0.0.1:1/second"),
            AuditRow::new("not a url"),
        ],
    };

    let results = audit_config(&config).await.unwrap();

    // The blank row is dropped before auditing
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].url, "http://127.0.0.1:1/first");
    assert_eq!(results[1].url, "http://127.0.0.1:1/second");
    assert_eq!(results[2].url, "not a url");
    for result in &results {
        assert!(result.error.is_some());
        assert_eq!(result.status_code, 0);
        assert_eq!(result.final_status_code, 0);
        assert!(!result.tls_fallback_used);
        assert_eq!(result.links[0].found, Presence::NotApplicable);
    }
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_auditing() {
    let config = Config {
        http: HttpConfig {
            max_redirects: 0,
            ..HttpConfig::default()
        },
        output: OutputConfig {
            results_path: "./results.json".to_string(),
            summary_path: "./summary.md".to_string(),
        },
        pages: vec![AuditRow::new("http://127.0.0.1:1/first")],
    };

    let error = audit_config(&config).await.unwrap_err();
    assert!(matches!(error, AuditError::Config(_)));
    assert!(error.to_string().contains("max-redirects"));
}
