//! Probe execution engine.
//!
//! Spawns each probe binary as an isolated child process, captures its
//! exit status and stderr, and classifies the observation against the
//! scenario's expectation. Expected-fatal scenarios pass only when the
//! child died (signal or nonzero exit) *and* stderr carries the expected
//! diagnostic substring.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::Instant;

use serde::Serialize;

use crate::error::HarnessError;
use crate::scenarios::{Expectation, ProbeScenario, ScenarioSet};

/// Environment variable carrying the companion test library path to
/// probes that load it dynamically.
pub const TESTLIB_ENV: &str = "PROBEKIT_TESTLIB";

/// Classified child process termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    ExitedZero,
    Exited(i32),
    /// Terminated by a signal (abort, sanitizer trap); code if known.
    Signaled(Option<i32>),
}

impl Observed {
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ExitedZero => "exit 0".to_string(),
            Self::Exited(code) => format!("exit {code}"),
            Self::Signaled(Some(sig)) => format!("signal {sig}"),
            Self::Signaled(None) => "killed by signal".to_string(),
        }
    }
}

/// How one scenario fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Passed,
    Failed,
    Skipped,
}

/// Verification result for one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeVerdict {
    pub name: String,
    pub status: ProbeStatus,
    pub expected: String,
    pub observed: String,
    /// First stderr line, when any was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub duration_ms: u64,
}

/// Runs scenarios against probe binaries in a directory.
pub struct ProbeRunner {
    bin_dir: PathBuf,
    testlib: Option<PathBuf>,
}

impl ProbeRunner {
    #[must_use]
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            testlib: None,
        }
    }

    /// Configure the companion test library handed to dlopen scenarios.
    #[must_use]
    pub fn with_testlib(mut self, path: impl Into<PathBuf>) -> Self {
        self.testlib = Some(path.into());
        self
    }

    /// Run every scenario in the set, in order.
    pub fn run(&self, set: &ScenarioSet) -> Result<Vec<ProbeVerdict>, HarnessError> {
        set.scenarios
            .iter()
            .map(|scenario| self.run_scenario(scenario))
            .collect()
    }

    /// Run a single scenario.
    ///
    /// Scenarios that need the test library are skipped, not failed, when
    /// none is configured: they are external-harness scenarios and only
    /// meaningful with the companion library present.
    pub fn run_scenario(&self, scenario: &ProbeScenario) -> Result<ProbeVerdict, HarnessError> {
        if scenario.needs_testlib && self.testlib.is_none() {
            return Ok(ProbeVerdict {
                name: scenario.name.clone(),
                status: ProbeStatus::Skipped,
                expected: scenario.expectation.describe(),
                observed: "skipped: no test library configured".to_string(),
                detail: None,
                duration_ms: 0,
            });
        }

        let bin = self.bin_dir.join(&scenario.bin);
        if !bin.exists() {
            return Err(HarnessError::MissingBinary { path: bin });
        }
        execute_probe(&bin, scenario, self.testlib.as_deref())
    }
}

/// Spawn `bin` for `scenario` and classify the outcome.
pub fn execute_probe(
    bin: &Path,
    scenario: &ProbeScenario,
    testlib: Option<&Path>,
) -> Result<ProbeVerdict, HarnessError> {
    let start = Instant::now();
    let mut cmd = Command::new(bin);
    if let Some(lib) = testlib {
        cmd.env(TESTLIB_ENV, lib);
    }
    let output = cmd.output().map_err(|source| HarnessError::Spawn {
        bin: bin.to_path_buf(),
        source,
    })?;
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    let stderr = String::from_utf8_lossy(&output.stderr);
    let observed = classify(output.status);
    let passed = expectation_met(&scenario.expectation, observed, &stderr);

    Ok(ProbeVerdict {
        name: scenario.name.clone(),
        status: if passed {
            ProbeStatus::Passed
        } else {
            ProbeStatus::Failed
        },
        expected: scenario.expectation.describe(),
        observed: observed.describe(),
        detail: stderr.lines().next().map(str::to_string),
        duration_ms,
    })
}

fn classify(status: ExitStatus) -> Observed {
    match status.code() {
        Some(0) => Observed::ExitedZero,
        Some(code) => Observed::Exited(code),
        None => Observed::Signaled(signal_of(status)),
    }
}

#[cfg(unix)]
fn signal_of(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: ExitStatus) -> Option<i32> {
    None
}

/// Pure expectation check, shared by the runner and its tests.
#[must_use]
pub fn expectation_met(expectation: &Expectation, observed: Observed, stderr: &str) -> bool {
    match expectation {
        Expectation::ExitZero => observed == Observed::ExitedZero,
        Expectation::ExitNonZero => observed != Observed::ExitedZero,
        Expectation::DeathWith { stderr_contains } => {
            observed != Observed::ExitedZero && stderr.contains(stderr_contains)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn death(needle: &str) -> Expectation {
        Expectation::DeathWith {
            stderr_contains: needle.to_string(),
        }
    }

    #[test]
    fn exit_zero_expectation() {
        assert!(expectation_met(&Expectation::ExitZero, Observed::ExitedZero, ""));
        assert!(!expectation_met(&Expectation::ExitZero, Observed::Exited(1), ""));
        assert!(!expectation_met(
            &Expectation::ExitZero,
            Observed::Signaled(Some(6)),
            ""
        ));
    }

    #[test]
    fn exit_nonzero_expectation() {
        assert!(expectation_met(&Expectation::ExitNonZero, Observed::Exited(1), ""));
        assert!(expectation_met(
            &Expectation::ExitNonZero,
            Observed::Signaled(None),
            ""
        ));
        assert!(!expectation_met(
            &Expectation::ExitNonZero,
            Observed::ExitedZero,
            ""
        ));
    }

    #[test]
    fn death_requires_both_termination_and_diagnostic() {
        let exp = death("HeapGuard");
        assert!(expectation_met(
            &exp,
            Observed::Signaled(Some(6)),
            "HeapGuard: out-of-bounds write at offset 1 into 1-byte allocation\n"
        ));
        // Dying without the diagnostic is not a pass.
        assert!(!expectation_met(&exp, Observed::Signaled(Some(6)), "unrelated\n"));
        // Printing the diagnostic but exiting zero is not a pass either.
        assert!(!expectation_met(&exp, Observed::ExitedZero, "HeapGuard: x\n"));
        // A plain nonzero exit with the diagnostic counts as death.
        assert!(expectation_met(&exp, Observed::Exited(134), "HeapGuard: x\n"));
    }

    #[test]
    fn skipped_when_testlib_missing() {
        let runner = ProbeRunner::new("/nonexistent-bin-dir");
        let scenario = ProbeScenario {
            name: "needs_lib".to_string(),
            bin: "needs_lib".to_string(),
            expectation: Expectation::ExitZero,
            needs_testlib: true,
            notes: None,
        };
        let verdict = runner.run_scenario(&scenario).expect("skip, not error");
        assert_eq!(verdict.status, ProbeStatus::Skipped);
    }

    #[test]
    fn missing_binary_is_an_error() {
        let runner = ProbeRunner::new("/nonexistent-bin-dir");
        let scenario = ProbeScenario {
            name: "ghost".to_string(),
            bin: "ghost".to_string(),
            expectation: Expectation::ExitZero,
            needs_testlib: false,
            notes: None,
        };
        match runner.run_scenario(&scenario) {
            Err(HarnessError::MissingBinary { path }) => {
                assert!(path.ends_with("ghost"));
            }
            other => panic!("expected MissingBinary, got {other:?}"),
        }
    }
}
