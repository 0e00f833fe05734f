//! Test harness for running conformance tests

use crate::error::ConformanceResult;
use crate::reports::ConformanceReport;
use crate::{ConformanceConfig, ConformanceRunner};

/// Test harness for conformance testing
#[derive(Debug)]
pub struct TestHarness {
    runner: ConformanceRunner,
}

impl TestHarness {
    /// Create a test harness around an existing runner
    pub fn new(runner: ConformanceRunner) -> Self {
        Self { runner }
    }

    /// Create a test harness for the configured runtime binary
    pub fn with_config(config: ConformanceConfig) -> ConformanceResult<Self> {
        Ok(Self::new(ConformanceRunner::new(config)?))
    }

    pub fn runner(&self) -> &ConformanceRunner {
        &self.runner
    }

    /// Run conformance tests and return report
    pub async fn run(&self) -> ConformanceReport {
        self.runner.run().await
    }

    /// Run the scenarios `runs` times, each with fresh instances, in one report
    pub async fn run_repeated(&self, runs: usize) -> ConformanceReport {
        self.runner.run_times(runs).await
    }

    /// Run tests and assert conformance
    pub async fn assert_conformant(&self) -> ConformanceReport {
        let report = self.runner.run().await;

        if !report.is_conformant() {
            panic!(
                "Runtime '{}' is not conformant:\n{}",
                report.runtime_name,
                report.to_text()
            );
        }
        report
    }
}
