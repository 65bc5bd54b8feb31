//! Regression probe: load the companion library on a worker thread, run
//! its entry point (which seeds thread-local state and arms an exit-time
//! self check), unload the library, and join. The process must exit
//! cleanly: the library's thread-local destructor still runs and still
//! observes the seeded values even though the unload was requested first.

use std::process::ExitCode;
use std::thread;

use probekit_core::weak::{open_testlib, resolve_entry};
use probekit_probes::{fail, pass};

fn main() -> ExitCode {
    let joined = thread::spawn(|| -> Result<i32, String> {
        let lib = open_testlib().map_err(|e| e.to_string())?;
        let entry = resolve_entry(&lib, b"probekit_entry").map_err(|e| e.to_string())?;
        // SAFETY: probekit_entry is a no-argument status-returning export.
        let rc = unsafe { entry() };
        // Unload while this thread still has the library's TLS destructor
        // pending; the runtime must defer teardown, not crash.
        drop(lib);
        Ok(rc)
    })
    .join();

    match joined {
        Err(_) => fail("probe thread panicked"),
        Ok(Err(msg)) => fail(&msg),
        Ok(Ok(0)) => pass(),
        Ok(Ok(rc)) => fail(&format!("probekit_entry returned {rc}")),
    }
}
