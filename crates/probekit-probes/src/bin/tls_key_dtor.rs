//! Regression probe: a pthread key destructor must run exactly once per
//! thread and observe the buffer contents written before thread teardown
//! deallocates per-thread storage.
//!
//! The worker thread fills a buffer, hands ownership to the key via
//! `pthread_setspecific`, and exits. The destructor takes the buffer
//! back, tramples the heap, and verifies every byte.

use std::ffi::c_void;
use std::process::ExitCode;
use std::thread;

use probekit_core::tls::{DtorLedger, SLAB_LEN, trample_heap};
use probekit_probes::{fail, pass};

static LEDGER: DtorLedger = DtorLedger::new();
const PATTERN: u8 = 20;

thread_local! {
    // Ensures the thread has TLS with a destructor registered before the
    // pthread key fires, mirroring the ordering under test.
    static TLS_TOUCH: std::cell::Cell<i32> = const { std::cell::Cell::new(0) };
}

unsafe extern "C" fn key_dtor(value: *mut c_void) {
    // SAFETY: value is the Box<[u8; SLAB_LEN]> leaked by the worker below;
    // the key destructor is its single owner from here on.
    let buf = unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(value.cast::<u8>(), SLAB_LEN)) };
    trample_heap(SLAB_LEN);
    LEDGER.record(buf.iter().all(|&b| b == PATTERN));
}

fn main() -> ExitCode {
    let mut key: libc::pthread_key_t = 0;
    // SAFETY: plain key creation with a C-ABI destructor.
    let rc = unsafe { libc::pthread_key_create(&mut key, Some(key_dtor)) };
    if rc != 0 {
        return fail(&format!("pthread_key_create failed: {rc}"));
    }

    let worker = thread::spawn(move || {
        TLS_TOUCH.with(|cell| cell.set(1));
        let mut buf = vec![0u8; SLAB_LEN].into_boxed_slice();
        buf.fill(PATTERN);
        let raw = Box::into_raw(buf);
        // SAFETY: ownership of the buffer moves to the key destructor.
        let rc = unsafe { libc::pthread_setspecific(key, raw.cast::<u8>().cast::<c_void>()) };
        assert_eq!(rc, 0, "pthread_setspecific failed");
    });
    if worker.join().is_err() {
        return fail("probe thread panicked");
    }

    let (runs, corrupt) = LEDGER.snapshot();
    if runs != 1 {
        return fail(&format!("expected 1 key destructor run, saw {runs}"));
    }
    if corrupt != 0 {
        return fail("key destructor observed trampled buffer contents");
    }
    pass()
}
