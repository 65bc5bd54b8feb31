//! Expected-fatal probe: a 5-byte fill into a 4-byte stack buffer must be
//! stopped by the runtime write guard. The harness asserts death with the
//! `memset: prevented 5-byte write into 4-byte buffer` diagnostic.

use std::process::ExitCode;

use probekit_core::guard::checked_fill;
use probekit_probes::fail;

fn main() -> ExitCode {
    let mut cs = [0u8; 4];
    checked_fill(&mut cs, 0, 5);
    // Reaching this point means the guard failed to trigger.
    fail("guard did not stop the overflowing fill")
}
