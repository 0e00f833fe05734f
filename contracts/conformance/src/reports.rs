//! Conformance test reporting

use crate::error::ConformanceResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use specerror::{RequirementLevel, SpecError};
use std::fmt::Write as _;
use std::time::Duration;

/// Test status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
}

/// One named piece of diagnostic evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub key: String,
    pub value: String,
}

/// Individual test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration: Duration,
    pub error: Option<String>,
    /// Violated assertion, when the failure maps to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<RequirementLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub warnings: Vec<String>,
    /// Diagnostics in insertion order.
    pub details: Vec<Detail>,
}

impl TestResult {
    fn with_status(name: impl Into<String>, status: TestStatus, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status,
            duration,
            error: None,
            assertion: None,
            level: None,
            reference: None,
            warnings: Vec::new(),
            details: Vec::new(),
        }
    }

    /// Create a passed test result
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self::with_status(name, TestStatus::Passed, duration)
    }

    /// Create a failed test result
    pub fn failed(name: impl Into<String>, error: impl Into<String>, duration: Duration) -> Self {
        let mut result = Self::with_status(name, TestStatus::Failed, duration);
        result.error = Some(error.into());
        result
    }

    /// Create a failed result for a violated assertion.
    pub fn violation(name: impl Into<String>, violation: &SpecError, duration: Duration) -> Self {
        let mut result = Self::failed(name, violation.to_string(), duration);
        result.assertion = Some(violation.assertion().to_string());
        result.level = Some(violation.level());
        result.reference = Some(violation.reference().to_string());
        result
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Add a detail to the result, replacing an earlier value for the same key
    pub fn add_detail(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.details.iter_mut().find(|detail| detail.key == key) {
            Some(detail) => detail.value = value,
            None => self.details.push(Detail { key, value }),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|detail| detail.key == key)
            .map(|detail| detail.value.as_str())
    }

    /// Whether this failure breaks conformance.
    ///
    /// Failures without an assertion (the runtime could not be driven at all)
    /// and violations of MUST-class assertions do; SHOULD/MAY-class do not.
    pub fn is_blocking(&self) -> bool {
        self.status == TestStatus::Failed && self.level.map_or(true, |level| level.is_mandatory())
    }

    fn tap_diagnostics(&self) -> Mapping {
        let mut map = Mapping::new();
        if let Some(error) = &self.error {
            map.insert("message".into(), error.as_str().into());
        }
        if let Some(level) = self.level {
            map.insert("level".into(), level.keyword().into());
        }
        if let Some(reference) = &self.reference {
            map.insert("reference".into(), reference.as_str().into());
        }
        for detail in &self.details {
            map.insert(detail.key.as_str().into(), detail.value.as_str().into());
        }
        if !self.warnings.is_empty() {
            let warnings: Vec<Value> = self.warnings.iter().map(|w| Value::from(w.as_str())).collect();
            map.insert("warnings".into(), Value::Sequence(warnings));
        }
        map
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub conformant: bool,
}

/// Complete conformance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub runtime_name: String,
    pub spec_version: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub results: Vec<TestResult>,
    pub summary: ReportSummary,
}

impl ConformanceReport {
    /// Create a new report
    pub fn new(runtime_name: impl Into<String>, spec_version: impl Into<String>) -> Self {
        Self {
            runtime_name: runtime_name.into(),
            spec_version: spec_version.into(),
            timestamp: Utc::now(),
            duration: Duration::ZERO,
            results: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    pub fn add_result(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Finalize the report and compute summary
    pub fn finalize(&mut self) {
        let count = |status: TestStatus| self.results.iter().filter(|r| r.status == status).count();

        self.summary = ReportSummary {
            total: self.results.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            conformant: !self.results.iter().any(TestResult::is_blocking),
        };
    }

    /// Get passed count
    pub fn passed_count(&self) -> usize {
        self.summary.passed
    }

    /// Get failed count
    pub fn failed_count(&self) -> usize {
        self.summary.failed
    }

    /// Check if conformant
    pub fn is_conformant(&self) -> bool {
        self.summary.conformant
    }

    /// Generate a text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("╔════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  OCI Runtime Conformance Report                            ║\n");
        output.push_str("╠════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!("║  Runtime: {:<48} ║\n", self.runtime_name));
        output.push_str(&format!("║  Spec version: {:<43} ║\n", self.spec_version));
        output.push_str(&format!(
            "║  Timestamp: {:<46} ║\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "║  Duration: {:<47} ║\n",
            format!("{:?}", self.duration)
        ));
        output.push_str("╟────────────────────────────────────────────────────────────╢\n");

        for result in &self.results {
            let status_icon = match result.status {
                TestStatus::Passed => "✓",
                TestStatus::Failed => "✗",
            };

            output.push_str(&format!(
                "║  {} {:<45} {:>8?}\n",
                status_icon, result.name, result.duration
            ));

            if let Some(error) = &result.error {
                for line in error.lines() {
                    output.push_str(&format!("║      {line}\n"));
                }
            }

            for warning in &result.warnings {
                output.push_str(&format!("║      Warning: {}\n", warning));
            }

            if result.status == TestStatus::Failed {
                for detail in &result.details {
                    output.push_str(&format!("║      {}:\n", detail.key));
                    for line in detail.value.lines() {
                        output.push_str(&format!("║        {line}\n"));
                    }
                }
            }
        }

        output.push_str("╠════════════════════════════════════════════════════════════╣\n");
        output.push_str("║  Summary:                                                  ║\n");
        output.push_str(&format!(
            "║    Total: {:<5}  Passed: {:<5}  Failed: {:<5}              ║\n",
            self.summary.total, self.summary.passed, self.summary.failed
        ));
        output.push_str("║                                                            ║\n");

        if self.summary.conformant {
            output.push_str("║  Result: ✓ CONFORMANT                                      ║\n");
        } else {
            output.push_str("║  Result: ✗ NON-CONFORMANT                                  ║\n");
        }

        output.push_str("╚════════════════════════════════════════════════════════════╝\n");

        output
    }

    /// Generate JSON report
    pub fn to_json(&self) -> ConformanceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate a TAP version 13 report with YAML diagnostics for failures.
    ///
    /// Failures of assertions below MUST carry a `# TODO` directive so TAP
    /// consumers do not count them against the run.
    pub fn to_tap(&self) -> ConformanceResult<String> {
        let mut output = String::from("TAP version 13\n");

        for (index, result) in self.results.iter().enumerate() {
            let number = index + 1;
            let _ = match result.status {
                TestStatus::Passed => writeln!(output, "ok {number} - {}", result.name),
                TestStatus::Failed if !result.is_blocking() => {
                    let keyword = result.level.map(|level| level.keyword()).unwrap_or("");
                    writeln!(output, "not ok {number} - {} # TODO {keyword}", result.name)
                }
                TestStatus::Failed => writeln!(output, "not ok {number} - {}", result.name),
            };

            if result.status == TestStatus::Failed {
                let yaml = serde_yaml::to_string(&Value::Mapping(result.tap_diagnostics()))?;
                output.push_str("  ---\n");
                for line in yaml.lines() {
                    output.push_str("  ");
                    output.push_str(line);
                    output.push('\n');
                }
                output.push_str("  ...\n");
            }
        }

        let _ = writeln!(output, "1..{}", self.results.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_result_passed() {
        let result = TestResult::passed("test_name", Duration::from_millis(100));
        assert_eq!(result.status, TestStatus::Passed);
        assert!(result.error.is_none());
        assert!(!result.is_blocking());
    }

    #[test]
    fn test_test_result_failed() {
        let result = TestResult::failed("test_name", "error message", Duration::from_millis(100));
        assert_eq!(result.status, TestStatus::Failed);
        assert_eq!(result.error, Some("error message".to_string()));
        assert!(result.is_blocking());
    }

    #[test]
    fn test_details_keep_insertion_order() {
        let mut result = TestResult::failed("t", "e", Duration::ZERO);
        result.add_detail("expected", "a");
        result.add_detail("actual", "b");
        result.add_detail("expected", "c");
        let keys: Vec<&str> = result.details.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["expected", "actual"]);
        assert_eq!(result.detail("expected"), Some("c"));
    }

    #[test]
    fn test_non_mandatory_failure_is_not_blocking() {
        let mut result = TestResult::failed("t", "e", Duration::ZERO);
        result.level = Some(RequirementLevel::Should);
        assert!(!result.is_blocking());

        let mut report = ConformanceReport::new("runc", "1.0.2");
        report.add_result(result);
        report.finalize();
        assert_eq!(report.failed_count(), 1);
        assert!(report.is_conformant());
    }

    #[test]
    fn test_report_finalize() {
        let mut report = ConformanceReport::new("test", "1.0.2");
        report.add_result(TestResult::passed("test1", Duration::ZERO));
        report.add_result(TestResult::failed("test2", "error", Duration::ZERO));
        report.finalize();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.passed, 1);
        assert_eq!(report.summary.failed, 1);
        assert!(!report.is_conformant());
    }

    #[test]
    fn test_report_to_text() {
        let mut report = ConformanceReport::new("test-runtime", "1.0.2");
        report.add_result(TestResult::passed("test1", Duration::from_millis(10)));
        report.finalize();

        let text = report.to_text();
        assert!(text.contains("test-runtime"));
        assert!(text.contains("CONFORMANT"));
        assert!(!text.contains("NON-CONFORMANT"));
    }

    #[test]
    fn test_report_to_json() {
        let mut report = ConformanceReport::new("runc", "1.0.2");
        report.add_result(TestResult::passed("hook_ordering", Duration::ZERO));
        report.finalize();

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["runtime_name"], "runc");
        assert_eq!(value["summary"]["conformant"], true);
    }

    #[test]
    fn test_report_to_tap() {
        let mut failed = TestResult::failed("hook_ordering", "out of order", Duration::ZERO);
        failed.level = Some(RequirementLevel::Must);
        failed.add_detail("expected", "a\nb\n");
        failed.add_detail("actual", "b\na\n");

        let mut advisory = TestResult::failed("advisory", "should have", Duration::ZERO);
        advisory.level = Some(RequirementLevel::Should);

        let mut report = ConformanceReport::new("runc", "1.0.2");
        report.add_result(TestResult::passed("first", Duration::ZERO));
        report.add_result(failed);
        report.add_result(advisory);
        report.finalize();

        let tap = report.to_tap().unwrap();
        let lines: Vec<&str> = tap.lines().collect();
        assert_eq!(lines[0], "TAP version 13");
        assert_eq!(lines[1], "ok 1 - first");
        assert_eq!(lines[2], "not ok 2 - hook_ordering");
        assert!(tap.contains("not ok 3 - advisory # TODO SHOULD\n"));
        assert_eq!(*lines.last().unwrap(), "1..3");

        // the diagnostic block is valid YAML carrying the evidence
        let start = lines.iter().position(|l| *l == "  ---").unwrap();
        let end = lines.iter().position(|l| *l == "  ...").unwrap();
        let block: String = lines[start + 1..end]
            .iter()
            .map(|l| format!("{}\n", &l[2..]))
            .collect();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&block).unwrap();
        assert_eq!(yaml["message"].as_str(), Some("out of order"));
        assert_eq!(yaml["level"].as_str(), Some("MUST"));
        assert_eq!(yaml["expected"].as_str(), Some("a\nb\n"));
        assert_eq!(yaml["actual"].as_str(), Some("b\na\n"));
        assert!(yaml.get("warnings").is_none());
    }

    #[test]
    fn test_tap_diagnostics_keep_every_warning() {
        let mut result = TestResult::failed("hook_ordering", "out of order", Duration::ZERO);
        result.add_warning("artifact unreadable");
        result.add_warning("runtime left state behind");

        let mut report = ConformanceReport::new("runc", "1.0.2");
        report.add_result(result);
        report.finalize();

        let tap = report.to_tap().unwrap();
        let block: String = tap
            .lines()
            .skip_while(|l| *l != "  ---")
            .skip(1)
            .take_while(|l| *l != "  ...")
            .map(|l| format!("{}\n", &l[2..]))
            .collect();
        let yaml: serde_yaml::Value = serde_yaml::from_str(&block).unwrap();
        let warnings: Vec<&str> = yaml["warnings"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|w| w.as_str())
            .collect();
        assert_eq!(warnings, ["artifact unreadable", "runtime left state behind"]);
    }
}
