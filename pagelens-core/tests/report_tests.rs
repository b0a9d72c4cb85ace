// Tests for report rendering

use chrono::Utc;
use pagelens_core::{
    aggregate_score, count_severities, generate_json_report, generate_text_report, ReportFormat,
};
use pagelens_engine::{AnalysisReport, Verdict};
use std::collections::BTreeMap;

fn sample_report() -> AnalysisReport {
    let mut results = BTreeMap::new();
    results.insert(
        "title".to_string(),
        Verdict::pass("Title length is optimal (45 characters)"),
    );
    results.insert(
        "meta_description".to_string(),
        Verdict::warning("Meta description is too short (50 characters)")
            .recommend("Expand the description to 120-160 characters"),
    );
    results.insert(
        "h1".to_string(),
        Verdict::fail("No H1 heading found").recommend("Add exactly one H1 heading"),
    );

    AnalysisReport {
        url: "https://example.com/".to_string(),
        analyzed_at: Utc::now(),
        load_time_ms: 340,
        content_length: 52_000,
        results,
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    assert!(matches!(
        ReportFormat::from_str("text"),
        Some(ReportFormat::Text)
    ));
}

#[test]
fn test_report_format_from_str_json() {
    assert!(matches!(
        ReportFormat::from_str("json"),
        Some(ReportFormat::Json)
    ));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(
        ReportFormat::from_str("TEXT"),
        Some(ReportFormat::Text)
    ));
    assert!(matches!(
        ReportFormat::from_str("Json"),
        Some(ReportFormat::Json)
    ));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("yaml").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Aggregation Tests
// ============================================================================

#[test]
fn test_count_severities() {
    let counts = count_severities(&sample_report());
    assert_eq!(counts.pass, 1);
    assert_eq!(counts.warning, 1);
    assert_eq!(counts.fail, 1);
}

#[test]
fn test_aggregate_score_is_mean_of_check_scores() {
    // pass=100, warning=50, fail=0 -> mean 50
    assert_eq!(aggregate_score(&sample_report()), 50);
}

#[test]
fn test_aggregate_score_empty_report() {
    let report = AnalysisReport {
        url: "https://example.com/".to_string(),
        analyzed_at: Utc::now(),
        load_time_ms: 0,
        content_length: 0,
        results: BTreeMap::new(),
    };
    assert_eq!(aggregate_score(&report), 0);
}

#[test]
fn test_aggregate_score_all_passing() {
    let mut report = sample_report();
    for verdict in report.results.values_mut() {
        *verdict = Verdict::pass("ok");
    }
    assert_eq!(aggregate_score(&report), 100);
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_contains_header_and_url() {
    let text = generate_text_report(&sample_report());
    assert!(text.contains("PAGELENS ANALYSIS REPORT"));
    assert!(text.contains("https://example.com/"));
    assert!(text.contains("End of Report"));
}

#[test]
fn test_text_report_groups_by_severity() {
    let text = generate_text_report(&sample_report());

    let fail_pos = text.find("FAILED CHECKS").expect("failed section");
    let warn_pos = text.find("WARNINGS").expect("warning section");
    let pass_pos = text.find("PASSED CHECKS").expect("passed section");
    assert!(fail_pos < warn_pos);
    assert!(warn_pos < pass_pos);

    assert!(text.contains("No H1 heading found"));
    assert!(text.contains("Add exactly one H1 heading"));
}

#[test]
fn test_text_report_summary_counts() {
    let text = generate_text_report(&sample_report());
    assert!(text.contains("Total Checks: 3"));
    assert!(text.contains("[FAIL]    1"));
    assert!(text.contains("[WARNING] 1"));
    assert!(text.contains("[PASS]    1"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&sample_report()).expect("report should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(value["report"]["metadata"]["generator"], "Pagelens");
    assert_eq!(value["report"]["page"]["url"], "https://example.com/");
    assert_eq!(value["report"]["summary"]["total_checks"], 3);
    assert_eq!(value["report"]["summary"]["overall_score"], 50);
    assert_eq!(value["report"]["summary"]["severity_breakdown"]["fail"], 1);
}

#[test]
fn test_json_report_includes_verdicts() {
    let json = generate_json_report(&sample_report()).expect("report should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(value["report"]["results"]["h1"]["severity"], "fail");
    assert_eq!(
        value["report"]["results"]["meta_description"]["recommendations"][0],
        "Expand the description to 120-160 characters"
    );
}
