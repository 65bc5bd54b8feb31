//! Regression probe: an optional export must resolve exactly when the
//! library advertises the feature. When both agree and the export exists,
//! calling it must succeed; a missing export is never called.

use std::process::ExitCode;

use probekit_core::weak::{open_testlib, resolve_entry, resolve_optional};
use probekit_probes::{fail, pass};

fn main() -> ExitCode {
    let lib = match open_testlib() {
        Ok(lib) => lib,
        Err(e) => return fail(&e.to_string()),
    };
    let feature_level = match resolve_entry(&lib, b"probekit_feature_level") {
        // SAFETY: no-argument status-returning export.
        Ok(f) => unsafe { f() },
        Err(e) => return fail(&e.to_string()),
    };
    let advertised = feature_level >= 1;

    let optional = resolve_optional(&lib, b"probekit_optional_feature");
    if advertised != optional.is_some() {
        return fail(&format!(
            "availability disagrees with resolution: level {feature_level}, resolved {}",
            optional.is_some()
        ));
    }

    if let Some(f) = optional {
        // SAFETY: the symbol resolved and the library is still loaded.
        let rc = unsafe { f() };
        if rc != 0 {
            return fail(&format!("optional feature call returned {rc}"));
        }
    }
    pass()
}
