//! Regression probe: a panic raised below main, through a frame that
//! builds and prints a heap-allocated string, must unwind cleanly and be
//! catchable at the top. Exits 0 when the panic was caught.

use std::process::ExitCode;

use probekit_probes::{fail, pass};

fn raise() {
    let s = String::from("test");
    println!("{s}");
    panic!("probe panic");
}

fn main() -> ExitCode {
    // Quiet hook: the panic is expected, its backtrace is not a failure.
    std::panic::set_hook(Box::new(|_| {}));
    match std::panic::catch_unwind(raise) {
        Err(_) => pass(),
        Ok(()) => fail("no panic raised"),
    }
}
