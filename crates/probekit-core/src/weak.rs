//! Optional (weak) symbol resolution through dynamic loading.
//!
//! Mirrors weak-symbol binding: a reference may resolve to an export that
//! is absent at load time. Callers branch on availability the way an
//! availability-guarded call site does; invoking a missing optional symbol
//! is the expected-death path of the weak-symbol probe.

use std::path::PathBuf;

use libloading::Library;
use thiserror::Error;

/// Environment variable the harness uses to hand probes the companion
/// test library path.
pub const TESTLIB_ENV: &str = "PROBEKIT_TESTLIB";

/// C-ABI entry point shape shared by the testlib exports.
pub type CEntry = unsafe extern "C" fn() -> i32;

#[derive(Debug, Error)]
pub enum WeakError {
    #[error("{TESTLIB_ENV} is not set; no test library configured")]
    NotConfigured,
    #[error("failed to load test library {path}: {source}")]
    Load {
        path: PathBuf,
        source: libloading::Error,
    },
    #[error("symbol {symbol} not found: {source}")]
    Missing {
        symbol: String,
        source: libloading::Error,
    },
}

/// Open the companion test library named by [`TESTLIB_ENV`].
pub fn open_testlib() -> Result<Library, WeakError> {
    let path = std::env::var_os(TESTLIB_ENV).ok_or(WeakError::NotConfigured)?;
    // SAFETY: the testlib is a workspace-built companion library whose
    // initializers are plain Rust statics.
    unsafe { Library::new(&path) }.map_err(|source| WeakError::Load {
        path: PathBuf::from(path),
        source,
    })
}

/// Resolve a required C-ABI entry point.
///
/// The returned pointer is only valid while `lib` stays loaded.
pub fn resolve_entry(lib: &Library, symbol: &[u8]) -> Result<CEntry, WeakError> {
    // SAFETY: all testlib exports share the CEntry signature.
    unsafe { lib.get::<CEntry>(symbol) }
        .map(|s| *s)
        .map_err(|source| WeakError::Missing {
            symbol: String::from_utf8_lossy(symbol).into_owned(),
            source,
        })
}

/// Resolve an optional entry point, treating absence as a valid outcome.
#[must_use]
pub fn resolve_optional(lib: &Library, symbol: &[u8]) -> Option<CEntry> {
    // SAFETY: same signature contract as resolve_entry.
    unsafe { lib.get::<CEntry>(symbol) }.ok().map(|s| *s)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test owns the env var; splitting these would race under the
    // parallel test runner.
    #[test]
    fn open_testlib_honors_the_environment() {
        // SAFETY: only this test mutates TESTLIB_ENV.
        unsafe { std::env::remove_var(TESTLIB_ENV) };
        match open_testlib() {
            Err(WeakError::NotConfigured) => {}
            other => panic!("expected NotConfigured, got {other:?}"),
        }

        unsafe { std::env::set_var(TESTLIB_ENV, "/nonexistent/libprobekit_testlib.so") };
        let err = open_testlib().unwrap_err();
        unsafe { std::env::remove_var(TESTLIB_ENV) };
        assert!(err.to_string().contains("nonexistent"));
    }
}
