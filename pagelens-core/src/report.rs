// Report rendering for analysis results

use pagelens_engine::{AnalysisReport, Severity, Verdict};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub pass: usize,
    pub warning: usize,
    pub fail: usize,
}

pub fn count_severities(report: &AnalysisReport) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for verdict in report.results.values() {
        match verdict.severity {
            Severity::Pass => counts.pass += 1,
            Severity::Warning => counts.warning += 1,
            Severity::Fail => counts.fail += 1,
        }
    }
    counts
}

/// Overall score: the mean of the per-check scores (pass 100, warning 50,
/// fail 0), rounded to the nearest integer. An empty result set scores 0.
pub fn aggregate_score(report: &AnalysisReport) -> u32 {
    if report.results.is_empty() {
        return 0;
    }
    let total: u32 = report.results.values().map(|v| v.severity.score()).sum();
    (total as f64 / report.results.len() as f64).round() as u32
}

pub fn generate_text_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let counts = count_severities(report);

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("                          PAGELENS ANALYSIS REPORT\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    out.push_str(&format!("URL:           {}\n", report.url));
    out.push_str(&format!(
        "Analyzed:      {}\n",
        report.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Load Time:     {} ms\n", report.load_time_ms));
    out.push_str(&format!("Page Size:     {} bytes\n", report.content_length));
    out.push_str(&format!("Overall Score: {}/100\n\n", aggregate_score(report)));

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("SUMMARY\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    out.push_str(&format!("Total Checks: {}\n\n", report.results.len()));
    if counts.fail > 0 {
        out.push_str(&format!("  [FAIL]    {}  (Needs fixing)\n", counts.fail));
    }
    if counts.warning > 0 {
        out.push_str(&format!("  [WARNING] {}  (Should be improved)\n", counts.warning));
    }
    if counts.pass > 0 {
        out.push_str(&format!("  [PASS]    {}\n", counts.pass));
    }
    out.push('\n');

    for (heading, severity) in [
        ("FAILED CHECKS", Severity::Fail),
        ("WARNINGS", Severity::Warning),
        ("PASSED CHECKS", Severity::Pass),
    ] {
        let group: Vec<(&String, &Verdict)> = report
            .results
            .iter()
            .filter(|(_, v)| v.severity == severity)
            .collect();
        if group.is_empty() {
            continue;
        }

        out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        out.push_str(heading);
        out.push('\n');
        out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for (name, verdict) in group {
            out.push_str(&format!("[{}] {}\n", verdict.severity.as_str().to_uppercase(), name));
            for issue in &verdict.issues {
                out.push_str(&wrap_text(issue, 80, "  "));
            }
            if !verdict.recommendations.is_empty() {
                out.push_str("  Recommendations:\n");
                for rec in &verdict.recommendations {
                    out.push_str(&wrap_text(rec, 80, "    - "));
                }
            }
            out.push('\n');
        }
    }

    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("                          End of Report\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str("\nGenerated by Pagelens - single-page SEO/AEO/GEO analyzer\n\n");

    out
}

pub fn generate_json_report(report: &AnalysisReport) -> Result<String, serde_json::Error> {
    let counts = count_severities(report);
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Pagelens",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "page": {
                "url": report.url,
                "analyzed_at": report.analyzed_at.to_rfc3339(),
                "load_time_ms": report.load_time_ms,
                "content_length": report.content_length
            },
            "summary": {
                "total_checks": report.results.len(),
                "overall_score": aggregate_score(report),
                "severity_breakdown": {
                    "pass": counts.pass,
                    "warning": counts.warning,
                    "fail": counts.fail
                }
            },
            "results": report.results
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn wrap_text(text: &str, width: usize, indent: &str) -> String {
    let mut result = String::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.len() + word.len() + 1 > width - indent.len() {
            if !current_line.is_empty() {
                result.push_str(indent);
                result.push_str(&current_line);
                result.push('\n');
                current_line.clear();
            }
        }

        if !current_line.is_empty() {
            current_line.push(' ');
        }
        current_line.push_str(word);
    }

    if !current_line.is_empty() {
        result.push_str(indent);
        result.push_str(&current_line);
        result.push('\n');
    }

    result
}
