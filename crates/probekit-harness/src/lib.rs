//! Regression probe harness for probekit.
//!
//! This crate provides:
//! - Scenario registry: which probe binaries exist and what outcome each
//!   is expected to produce, including expected-fatal outcomes
//! - Runner: spawn a probe as a child process, capture status and stderr,
//!   classify the result against the expectation
//! - Report generation: human-readable + machine-readable suite reports
//! - Structured logging: JSONL evidence records with artifact integrity

#![forbid(unsafe_code)]

pub mod error;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod structured_log;

pub use error::HarnessError;
pub use report::SuiteReport;
pub use runner::{ProbeRunner, ProbeStatus, ProbeVerdict};
pub use scenarios::{Expectation, ProbeScenario, ScenarioSet};
