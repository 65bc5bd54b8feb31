//! Scenario registry and JSON loading.
//!
//! A scenario names one probe binary and its expected process outcome.
//! "Death" is a first-class expectation: several probes signal success by
//! aborting with a diagnostic, and that contract lives here rather than
//! in the probes' own control flow.

use serde::{Deserialize, Serialize};

/// Expected process outcome for one probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    /// Probe passes by exiting zero.
    ExitZero,
    /// Probe passes by exiting nonzero, without a specific diagnostic.
    ExitNonZero,
    /// Probe passes by dying — abort/signal or nonzero exit — with a
    /// diagnostic substring on stderr.
    DeathWith { stderr_contains: String },
}

impl Expectation {
    /// Short human-readable form for reports.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::ExitZero => "exit 0".to_string(),
            Self::ExitNonZero => "exit nonzero".to_string(),
            Self::DeathWith { stderr_contains } => {
                format!("death with stderr containing {stderr_contains:?}")
            }
        }
    }
}

/// A single probe scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeScenario {
    /// Scenario identifier.
    pub name: String,
    /// Binary name under the probe directory.
    pub bin: String,
    pub expectation: Expectation,
    /// Scenario needs the companion test library to be configured.
    #[serde(default)]
    pub needs_testlib: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A collection of probe scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    /// Schema version.
    pub version: String,
    /// Suite name.
    pub suite: String,
    pub scenarios: Vec<ProbeScenario>,
}

impl ScenarioSet {
    /// Load a scenario set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a scenario set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Keep only scenarios whose name contains `needle`.
    #[must_use]
    pub fn filtered(&self, needle: &str) -> Self {
        Self {
            version: self.version.clone(),
            suite: self.suite.clone(),
            scenarios: self
                .scenarios
                .iter()
                .filter(|s| s.name.contains(needle))
                .cloned()
                .collect(),
        }
    }

    /// The built-in registry covering every probe binary in the suite.
    #[must_use]
    pub fn builtin() -> Self {
        fn pass(name: &str) -> ProbeScenario {
            ProbeScenario {
                name: name.to_string(),
                bin: name.to_string(),
                expectation: Expectation::ExitZero,
                needs_testlib: false,
                notes: None,
            }
        }
        fn pass_with_testlib(name: &str) -> ProbeScenario {
            ProbeScenario {
                needs_testlib: true,
                ..pass(name)
            }
        }
        fn death(name: &str, stderr_contains: &str) -> ProbeScenario {
            ProbeScenario {
                expectation: Expectation::DeathWith {
                    stderr_contains: stderr_contains.to_string(),
                },
                ..pass(name)
            }
        }

        let mut race = pass("race_smoke");
        race.notes = Some(
            "pure sanitizer trigger: exits 0 on an uninstrumented host, traps under a race detector"
                .to_string(),
        );

        Self {
            version: "v1".to_string(),
            suite: "toolchain-regression".to_string(),
            scenarios: vec![
                pass("tls_object_dtor"),
                pass("tls_key_dtor"),
                pass_with_testlib("tls_atexit_dlclose"),
                pass_with_testlib("thread_local_dlclose"),
                pass("stack_alignment"),
                pass("static_init"),
                pass("panic_catch"),
                pass_with_testlib("panic_dlopen"),
                pass_with_testlib("weak_symbol"),
                race,
                death(
                    "guard_smoke",
                    "memset: prevented 5-byte write into 4-byte buffer",
                ),
                death("heap_guard_smoke", "HeapGuard"),
            ],
        }
    }
}
