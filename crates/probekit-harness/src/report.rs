//! Suite report rendering.

use serde::Serialize;

use crate::runner::{ProbeStatus, ProbeVerdict};

/// Aggregated result of one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub verdicts: Vec<ProbeVerdict>,
}

impl SuiteReport {
    #[must_use]
    pub fn from_verdicts(suite: impl Into<String>, verdicts: Vec<ProbeVerdict>) -> Self {
        let passed = verdicts
            .iter()
            .filter(|v| v.status == ProbeStatus::Passed)
            .count();
        let failed = verdicts
            .iter()
            .filter(|v| v.status == ProbeStatus::Failed)
            .count();
        let skipped = verdicts
            .iter()
            .filter(|v| v.status == ProbeStatus::Skipped)
            .count();
        Self {
            suite: suite.into(),
            total: verdicts.len(),
            passed,
            failed,
            skipped,
            verdicts,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Render a markdown report.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Probe suite report: {}\n\n", self.suite));
        out.push_str(&format!(
            "- total: {}\n- passed: {}\n- failed: {}\n- skipped: {}\n\n",
            self.total, self.passed, self.failed, self.skipped
        ));
        out.push_str("| scenario | status | expected | observed | detail |\n");
        out.push_str("|---|---|---|---|---|\n");
        for v in &self.verdicts {
            let status = match v.status {
                ProbeStatus::Passed => "PASS",
                ProbeStatus::Failed => "FAIL",
                ProbeStatus::Skipped => "SKIP",
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                v.name,
                status,
                v.expected,
                v.observed,
                v.detail.as_deref().unwrap_or("")
            ));
        }
        out
    }

    /// Render machine-readable JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
