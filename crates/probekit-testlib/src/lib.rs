//! Companion dynamic library for the probekit dlopen probes.
//!
//! Exposes C-ABI entry points so the probe binaries can exercise
//! load / call / unload sequences: thread-local state touched from a
//! library that is later unloaded, a contained failure propagated as a
//! status code, and an optional export modeling a weak symbol.
//!
//! Every export shares the `extern "C" fn() -> i32` shape; zero means
//! success.

use std::cell::Cell;
use std::process::abort;
use std::sync::atomic::{AtomicI32, Ordering};

/// Feature level advertised to callers: 1 when the optional export is
/// compiled in, 0 otherwise.
const FEATURE_LEVEL: i32 = if cfg!(feature = "optional-symbol") { 1 } else { 0 };

// Expected values mirror the per-thread counters. The probes drive exactly
// one worker thread through this library, so process-global expectations
// are comparable against that thread's locals.
static EXPECTED1: AtomicI32 = AtomicI32::new(0);
static EXPECTED2: AtomicI32 = AtomicI32::new(20);

/// Per-thread counters with an exit-time self check.
///
/// The `Drop` impl runs at thread exit. If this library's thread-local
/// storage were deallocated (or the library unloaded) before the
/// destructor runs, the reads below would not observe the stored values;
/// the check aborts the process so the probe fails loudly.
struct TlsCounters {
    var1: Cell<i32>,
    var2: Cell<i32>,
    armed: Cell<bool>,
}

impl Drop for TlsCounters {
    fn drop(&mut self) {
        if !self.armed.get() {
            return;
        }
        check_one("thread_exit var1", self.var1.get(), EXPECTED1.load(Ordering::SeqCst));
        check_one("thread_exit var2", self.var2.get(), EXPECTED2.load(Ordering::SeqCst));
    }
}

thread_local! {
    static COUNTERS: TlsCounters = const {
        TlsCounters {
            var1: Cell::new(0),
            var2: Cell::new(20),
            armed: Cell::new(false),
        }
    };
}

fn check_one(title: &str, actual: i32, expected: i32) {
    if actual != expected {
        eprintln!("{title}: {actual} != {expected}");
        abort();
    }
}

/// Bump both thread-local counters and their expectations, then verify.
/// Returns 0 when consistent.
fn bump_and_check() -> i32 {
    let (v1, v2) = COUNTERS.with(|c| {
        c.var1.set(c.var1.get() + 1);
        c.var2.set(c.var2.get() + 1);
        (c.var1.get(), c.var2.get())
    });
    let e1 = EXPECTED1.fetch_add(1, Ordering::SeqCst) + 1;
    let e2 = EXPECTED2.fetch_add(1, Ordering::SeqCst) + 1;
    i32::from(v1 != e1 || v2 != e2)
}

/// Main entry for the atexit/dlclose probe: seed the thread-local state,
/// arm the exit-time check, and verify the counters once in-line.
#[unsafe(no_mangle)]
pub extern "C" fn probekit_entry() -> i32 {
    COUNTERS.with(|c| {
        c.var1.set(10);
        c.armed.set(true);
    });
    EXPECTED1.store(10, Ordering::SeqCst);
    bump_and_check()
}

/// Touch a thread-local with a destructor; used by the probe that unloads
/// this library before the touching thread exits.
#[unsafe(no_mangle)]
pub extern "C" fn probekit_touch_tls() -> i32 {
    COUNTERS.with(|c| c.var2.set(c.var2.get() + 1));
    EXPECTED2.fetch_add(1, Ordering::SeqCst);
    0
}

/// Raise a failure inside the library and contain it, propagating only a
/// C-ABI status code across the boundary.
#[unsafe(no_mangle)]
pub extern "C" fn probekit_raise() -> i32 {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let result = std::panic::catch_unwind(|| panic!("contained failure"));
    std::panic::set_hook(previous);
    match result {
        Err(_) => 86,
        Ok(()) => 0,
    }
}

/// Feature level for availability checks; callers compare against the
/// threshold before using the optional export.
#[unsafe(no_mangle)]
pub extern "C" fn probekit_feature_level() -> i32 {
    FEATURE_LEVEL
}

/// Optional export: the weak symbol under test. Absent entirely when the
/// `optional-symbol` feature is disabled.
#[cfg(feature = "optional-symbol")]
#[unsafe(no_mangle)]
pub extern "C" fn probekit_optional_feature() -> i32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_seeds_and_verifies_counters() {
        assert_eq!(probekit_entry(), 0);
        // A second bump stays consistent with the expectations.
        assert_eq!(bump_and_check(), 0);
    }

    #[test]
    fn raise_contains_the_failure() {
        assert_eq!(probekit_raise(), 86);
    }

    #[test]
    fn feature_level_matches_optional_export() {
        let expected = i32::from(cfg!(feature = "optional-symbol"));
        assert_eq!(probekit_feature_level(), expected);
    }
}
