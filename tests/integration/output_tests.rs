//! Config-to-report runs against a mock server

use chrono::Utc;
use link_auditor::audit::audit_config;
use link_auditor::config::load_config_with_hash;
use link_auditor::output::{
    format_markdown_summary, write_results, AuditSummary, BatchStatistics,
};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_temp_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_config_run_writes_reports() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <a href="https://partner.example/" rel="sponsored">Partner</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config_file = create_temp_config(&format!(
        r#"
[http]
head-timeout-secs = 5

[output]
results-path = "./results.json"
summary-path = "./summary.md"

[[page]]
url = "{base}/ok"
anchor1 = "Partner"
url1 = "https://partner.example/"
anchor2 = ""
url2 = ""

[[page]]
url = ""

[[page]]
url = "{base}/missing"
anchor1 = "Partner"
url1 = "https://partner.example/"
"#
    ));

    let (config, config_hash) = load_config_with_hash(config_file.path()).unwrap();
    assert_eq!(config.pages.len(), 3);

    let started_at = Utc::now();
    let results = audit_config(&config).await.unwrap();
    let finished_at = Utc::now();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].final_status_code, 200);
    assert_eq!(results[1].final_status_code, 404);

    let statistics = BatchStatistics::from_results(&results);
    assert_eq!(statistics.total, 2);
    assert_eq!(statistics.checked_ok, 1);
    assert_eq!(statistics.other_status, 1);
    assert_eq!(statistics.urls_found, [1, 0, 0]);
    assert_eq!(statistics.anchors_matched, [1, 0, 0]);

    let dir = tempfile::tempdir().unwrap();
    let results_path = dir.path().join("results.json");
    write_results(&results, &results_path).unwrap();

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&results_path).unwrap()).unwrap();
    assert_eq!(exported[0]["url1_found"], "yes");
    assert_eq!(exported[0]["url1_rel"], "sponsored");
    assert_eq!(exported[0]["url2_found"], "not_applicable");
    assert_eq!(exported[1]["final_status_code"], 404);
    assert_eq!(exported[1]["url1_found"], "not_applicable");

    let summary = AuditSummary {
        started_at,
        finished_at,
        config_hash: config_hash.clone(),
        statistics,
    };
    let markdown = format_markdown_summary(&summary, &results);
    assert!(markdown.contains(&config_hash));
    assert!(markdown.contains(&format!("| 1 | {base}/ok | 200 | Yes / Yes |")));
    assert!(markdown.contains(&format!("| 2 | {base}/missing | 404 | N/A / N/A |")));
}
