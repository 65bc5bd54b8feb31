//! CLI entrypoint for the probekit regression harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use probekit_harness::structured_log::{ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome};
use probekit_harness::{ProbeRunner, ProbeStatus, ScenarioSet, SuiteReport};

/// Regression probe tooling for probekit.
#[derive(Debug, Parser)]
#[command(name = "probekit-harness")]
#[command(about = "Runs native-toolchain regression probes and reports outcomes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the scenarios in the built-in registry.
    List {
        /// Emit the scenario set as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Run probe scenarios against built binaries.
    Run {
        /// Directory containing the probe binaries.
        #[arg(long)]
        bin_dir: PathBuf,
        /// Path to the companion test library (enables dlopen scenarios).
        #[arg(long)]
        testlib: Option<PathBuf>,
        /// Only run scenarios whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,
        /// Scenario set JSON file (defaults to the built-in registry).
        #[arg(long)]
        scenarios: Option<PathBuf>,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Markdown report output path.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print the suite report as JSON to stdout.
        #[arg(long)]
        json: bool,
    },
    /// Validate a structured JSONL log against the schema.
    ValidateLog {
        /// Structured JSONL log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> std::process::ExitCode {
    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::List { json } => {
            let set = ScenarioSet::builtin();
            if json {
                println!("{}", set.to_json()?);
            } else {
                println!("suite: {} ({} scenarios)", set.suite, set.scenarios.len());
                for scenario in &set.scenarios {
                    let lib = if scenario.needs_testlib {
                        " [needs testlib]"
                    } else {
                        ""
                    };
                    println!(
                        "  {:<22} {}{}",
                        scenario.name,
                        scenario.expectation.describe(),
                        lib
                    );
                }
            }
        }
        Command::Run {
            bin_dir,
            testlib,
            filter,
            scenarios,
            log,
            report,
            json,
        } => {
            let mut set = match scenarios {
                Some(path) => ScenarioSet::from_file(&path)?,
                None => ScenarioSet::builtin(),
            };
            if let Some(needle) = filter {
                set = set.filtered(&needle);
            }
            if set.scenarios.is_empty() {
                return Err("no scenarios selected".into());
            }

            let mut runner = ProbeRunner::new(&bin_dir);
            if let Some(lib) = testlib {
                runner = runner.with_testlib(lib);
            }

            let run_id = format!("run-{}", std::process::id());
            let mut emitter = match &log {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    Some(LogEmitter::to_file(path, &run_id)?)
                }
                None => None,
            };
            if let Some(emitter) = emitter.as_mut() {
                emitter.emit_entry(
                    LogEntry::new("", LogLevel::Info, "suite_start").with_details(
                        serde_json::json!({
                            "suite": set.suite,
                            "scenarios": set.scenarios.len(),
                        }),
                    ),
                )?;
            }

            let verdicts = runner.run(&set)?;
            if let Some(emitter) = emitter.as_mut() {
                for v in &verdicts {
                    let outcome = match v.status {
                        ProbeStatus::Passed => Outcome::Pass,
                        ProbeStatus::Failed => Outcome::Fail,
                        ProbeStatus::Skipped => Outcome::Skip,
                    };
                    let level = match v.status {
                        ProbeStatus::Failed => LogLevel::Error,
                        _ => LogLevel::Info,
                    };
                    let mut details = serde_json::json!({
                        "expected": v.expected,
                        "observed": v.observed,
                    });
                    if let Some(detail) = &v.detail {
                        details["stderr_first_line"] = serde_json::json!(detail);
                    }
                    emitter.emit_entry(
                        LogEntry::new("", level, "probe_done")
                            .with_probe(&v.name)
                            .with_outcome(outcome)
                            .with_duration_ms(v.duration_ms)
                            .with_details(details),
                    )?;
                }
            }

            let suite_report = SuiteReport::from_verdicts(&set.suite, verdicts);

            let mut report_paths: Vec<PathBuf> = Vec::new();
            if let Some(path) = report {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, suite_report.to_markdown())?;
                let json_path = path.with_extension("json");
                std::fs::write(&json_path, suite_report.to_json()?)?;
                eprintln!("Wrote report to {}", path.display());
                report_paths.push(path);
                report_paths.push(json_path);
            }

            if let Some(emitter) = emitter.as_mut() {
                let outcome = if suite_report.all_passed() {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                };
                let mut entry = LogEntry::new("", LogLevel::Info, "suite_done")
                    .with_outcome(outcome)
                    .with_details(serde_json::json!({
                        "total": suite_report.total,
                        "passed": suite_report.passed,
                        "failed": suite_report.failed,
                        "skipped": suite_report.skipped,
                    }));
                if !report_paths.is_empty() {
                    entry = entry.with_artifacts(
                        report_paths.iter().map(|p| p.display().to_string()).collect(),
                    );
                }
                emitter.emit_entry(entry)?;
                emitter.flush()?;
            }

            // Evidence bundle: hash the flushed log and the report artifacts
            // into an index written next to the log.
            if let Some(log_path) = &log {
                let mut index = ArtifactIndex::new(&run_id);
                index.index_file(log_path, "log")?;
                for path in &report_paths {
                    index.index_file(path, "report")?;
                }
                std::fs::write(log_path.with_extension("artifacts.json"), index.to_json()?)?;
            }

            if json {
                println!("{}", suite_report.to_json()?);
            } else {
                print!("{}", suite_report.to_markdown());
            }

            eprintln!(
                "Suite complete: total={}, passed={}, failed={}, skipped={}",
                suite_report.total,
                suite_report.passed,
                suite_report.failed,
                suite_report.skipped
            );
            if !suite_report.all_passed() {
                return Err("probe suite failed".into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = probekit_harness::structured_log::validate_log_file(&log)?;
            if errors.is_empty() {
                eprintln!("OK: {lines} log line(s) valid in {}", log.display());
            } else {
                for err in &errors {
                    eprintln!("{err}");
                }
                return Err(format!(
                    "log validation failed: {} error(s) across {} line(s)",
                    errors.len(),
                    lines
                )
                .into());
            }
        }
    }

    Ok(())
}
