//! Runs the self-contained probe binaries through the harness expectation
//! machinery and checks each delivers the outcome its scenario promises.

use std::path::Path;

use probekit_harness::runner::execute_probe;
use probekit_harness::{ProbeStatus, ScenarioSet};

fn scenario(name: &str) -> probekit_harness::ProbeScenario {
    ScenarioSet::builtin()
        .scenarios
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no builtin scenario named {name}"))
}

fn assert_probe_passes(bin: &str, name: &str) {
    let verdict = execute_probe(Path::new(bin), &scenario(name), None).expect("spawn probe");
    assert_eq!(
        verdict.status,
        ProbeStatus::Passed,
        "{name}: expected {}, observed {} ({:?})",
        verdict.expected,
        verdict.observed,
        verdict.detail
    );
}

#[test]
fn tls_object_dtor_runs_clean() {
    assert_probe_passes(env!("CARGO_BIN_EXE_tls_object_dtor"), "tls_object_dtor");
}

#[test]
fn tls_key_dtor_runs_clean() {
    assert_probe_passes(env!("CARGO_BIN_EXE_tls_key_dtor"), "tls_key_dtor");
}

#[test]
fn stack_alignment_holds_on_main_and_spawned_threads() {
    assert_probe_passes(env!("CARGO_BIN_EXE_stack_alignment"), "stack_alignment");
}

#[test]
fn static_init_observes_the_side_effect() {
    assert_probe_passes(env!("CARGO_BIN_EXE_static_init"), "static_init");
}

#[test]
fn panic_catch_contains_the_unwind() {
    assert_probe_passes(env!("CARGO_BIN_EXE_panic_catch"), "panic_catch");
}

#[test]
fn race_smoke_exits_clean_without_a_race_detector() {
    assert_probe_passes(env!("CARGO_BIN_EXE_race_smoke"), "race_smoke");
}

#[test]
fn guard_smoke_dies_with_the_memset_diagnostic() {
    let verdict = execute_probe(
        Path::new(env!("CARGO_BIN_EXE_guard_smoke")),
        &scenario("guard_smoke"),
        None,
    )
    .expect("spawn probe");
    assert_eq!(
        verdict.status,
        ProbeStatus::Passed,
        "observed {} ({:?})",
        verdict.observed,
        verdict.detail
    );
    assert!(
        verdict
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("memset: prevented")),
        "first stderr line: {:?}",
        verdict.detail
    );
}

#[test]
fn heap_guard_smoke_dies_with_the_heap_guard_diagnostic() {
    let verdict = execute_probe(
        Path::new(env!("CARGO_BIN_EXE_heap_guard_smoke")),
        &scenario("heap_guard_smoke"),
        None,
    )
    .expect("spawn probe");
    assert_eq!(verdict.status, ProbeStatus::Passed);
}

#[test]
fn testlib_probes_skip_without_a_library() {
    use probekit_harness::ProbeRunner;

    let bin_dir = Path::new(env!("CARGO_BIN_EXE_tls_atexit_dlclose"))
        .parent()
        .expect("bin dir");
    let runner = ProbeRunner::new(bin_dir);
    let verdict = runner
        .run_scenario(&scenario("tls_atexit_dlclose"))
        .expect("run scenario");
    assert_eq!(verdict.status, ProbeStatus::Skipped);
}
