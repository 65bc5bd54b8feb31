//! Expected-fatal probe: a one-past-the-end write into a one-byte heap
//! allocation must be stopped by the heap guard. The harness asserts
//! death with a `HeapGuard` diagnostic.

use std::process::ExitCode;

use probekit_core::guard::GuardedBuf;
use probekit_probes::fail;

fn main() -> ExitCode {
    let mut x = GuardedBuf::new(1);
    x.write_at(1, b'2');
    fail("heap guard did not stop the out-of-bounds write")
}
