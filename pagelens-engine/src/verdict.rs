use serde::{Deserialize, Serialize};

/// Outcome class for a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Pass,
    Warning,
    Fail,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Pass => "pass",
            Severity::Warning => "warning",
            Severity::Fail => "fail",
        }
    }

    /// Scoring convention used by the rendering layer: pass=100, warning=50, fail=0.
    pub fn score(&self) -> u32 {
        match self {
            Severity::Pass => 100,
            Severity::Warning => 50,
            Severity::Fail => 0,
        }
    }
}

/// Result of one analyzer. `issues` is never empty: a passing verdict still
/// carries at least one line stating what was observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub severity: Severity,
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl Verdict {
    pub fn new(severity: Severity, issue: impl Into<String>) -> Self {
        Self {
            severity,
            issues: vec![issue.into()],
            recommendations: Vec::new(),
            details: serde_json::Value::Null,
        }
    }

    pub fn pass(issue: impl Into<String>) -> Self {
        Self::new(Severity::Pass, issue)
    }

    pub fn warning(issue: impl Into<String>) -> Self {
        Self::new(Severity::Warning, issue)
    }

    pub fn fail(issue: impl Into<String>) -> Self {
        Self::new(Severity::Fail, issue)
    }

    /// Build a verdict from a collected issue list; severity applies only when
    /// there is at least one issue, otherwise the `all_clear` pass line is used.
    pub fn from_issues(
        severity: Severity,
        issues: Vec<String>,
        all_clear: impl Into<String>,
    ) -> Self {
        if issues.is_empty() {
            Self::pass(all_clear)
        } else {
            Self {
                severity,
                issues,
                recommendations: Vec::new(),
                details: serde_json::Value::Null,
            }
        }
    }

    pub fn issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn recommend(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_scores() {
        assert_eq!(Severity::Pass.score(), 100);
        assert_eq!(Severity::Warning.score(), 50);
        assert_eq!(Severity::Fail.score(), 0);
    }

    #[test]
    fn test_verdict_always_has_an_issue() {
        let v = Verdict::pass("all good");
        assert!(!v.issues.is_empty());

        let v = Verdict::from_issues(Severity::Warning, vec![], "clean");
        assert_eq!(v.severity, Severity::Pass);
        assert_eq!(v.issues, vec!["clean".to_string()]);
    }

    #[test]
    fn test_verdict_serializes_severity_lowercase() {
        let v = Verdict::fail("missing");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["severity"], "fail");
    }
}
