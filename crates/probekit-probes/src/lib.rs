//! Shared conventions for the probe binaries.
//!
//! Every probe is an independent process with no arguments: exit 0 on
//! pass, nonzero exit or abort on fail. There is no shared runtime and no
//! cross-probe protocol; this crate only provides the exit helpers so all
//! probes report failures the same way.

use std::process::ExitCode;

/// Probe passed.
#[must_use]
pub fn pass() -> ExitCode {
    ExitCode::SUCCESS
}

/// Probe failed: one diagnostic line on stderr, exit 1.
#[must_use]
pub fn fail(msg: &str) -> ExitCode {
    eprintln!("{msg}");
    ExitCode::from(1)
}
