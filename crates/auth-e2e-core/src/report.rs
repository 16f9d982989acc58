// crates/auth-e2e-core/src/report.rs
// ============================================================================
// Module: Run Reports
// Description: Per-run result model and artifact writers.
// Purpose: Persist deterministic summaries and the request transcript.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! A [`RunReport`] collects one [`ScenarioRecord`] per scheduled scenario.
//! [`RunArtifacts`] writes it under the run root as canonical JSON
//! (`summary.json`), Markdown (`summary.md`), and the redacted request
//! transcript (`transcript.json`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::client::TranscriptEntry;
use crate::readiness::ReadinessState;
use crate::scenario::SuiteKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Canonical JSON summary file name.
pub const SUMMARY_JSON: &str = "summary.json";
/// Markdown summary file name.
pub const SUMMARY_MARKDOWN: &str = "summary.md";
/// Transcript file name.
pub const TRANSCRIPT_JSON: &str = "transcript.json";
/// Parent directory for default run roots.
pub const DEFAULT_RUN_PARENT: &str = "target/auth-e2e";

// ============================================================================
// SECTION: Report Model
// ============================================================================

/// Final state of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// All checks held.
    Passed,
    /// Every attempt failed.
    Failed,
    /// Not runnable in this configuration.
    Skipped,
}

impl ScenarioStatus {
    /// Returns the stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Outcome of one scenario across its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioRecord {
    /// Scenario name.
    pub name: String,
    /// Owning suite.
    pub suite: SuiteKind,
    /// Final status.
    pub status: ScenarioStatus,
    /// Attempts made, including retries.
    pub attempts: u32,
    /// Wall time across all attempts.
    pub duration_ms: u64,
    /// Failure class of the last attempt, when failed.
    pub failure_kind: Option<&'static str>,
    /// Failure text of the last attempt, when failed.
    pub failure: Option<String>,
    /// Notes, skip reasons, and earlier attempt failures.
    pub notes: Vec<String>,
}

/// Service endpoints a run targeted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunTargets {
    /// API base URL.
    pub auth_base_url: String,
    /// UI page URL.
    pub ui_base_url: String,
    /// Companion application URL, when configured.
    pub app_base_url: Option<String>,
}

/// Scenario totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    /// Scenarios run.
    pub total: usize,
    /// Passed scenarios.
    pub passed: usize,
    /// Failed scenarios.
    pub failed: usize,
    /// Skipped scenarios.
    pub skipped: usize,
}

/// Result of a complete run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Targets.
    pub targets: RunTargets,
    /// Readiness gate outcome.
    pub readiness: ReadinessState,
    /// Run start, Unix milliseconds.
    pub started_at_ms: u64,
    /// Run end, Unix milliseconds.
    pub ended_at_ms: u64,
    /// Totals over `scenarios`.
    pub counts: RunCounts,
    /// Per-scenario records in catalog order.
    pub scenarios: Vec<ScenarioRecord>,
}

impl RunReport {
    /// Builds a report and computes its totals.
    #[must_use]
    pub fn new(
        targets: RunTargets,
        readiness: ReadinessState,
        started_at_ms: u64,
        ended_at_ms: u64,
        scenarios: Vec<ScenarioRecord>,
    ) -> Self {
        let mut counts = RunCounts {
            total: scenarios.len(),
            ..RunCounts::default()
        };
        for record in &scenarios {
            match record.status {
                ScenarioStatus::Passed => counts.passed += 1,
                ScenarioStatus::Failed => counts.failed += 1,
                ScenarioStatus::Skipped => counts.skipped += 1,
            }
        }
        Self {
            targets,
            readiness,
            started_at_ms,
            ended_at_ms,
            counts,
            scenarios,
        }
    }

    /// Returns true when no scenario failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.counts.failed == 0
    }

    /// Returns the failed records.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.scenarios.iter().filter(|record| record.status == ScenarioStatus::Failed)
    }

    /// Renders the Markdown summary.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Auth E2E Summary\n\n");
        out.push_str("## Status\n\n");
        let status = if self.is_success() { "passed" } else { "failed" };
        let _ = writeln!(out, "- Status: {status}");
        let _ = writeln!(out, "- Target: {}", self.targets.auth_base_url);
        let _ = writeln!(out, "- UI: {}", self.targets.ui_base_url);
        if let Some(app) = &self.targets.app_base_url {
            let _ = writeln!(out, "- App: {app}");
        }
        let _ = writeln!(
            out,
            "- Readiness: ready after {} of {} attempts",
            self.readiness.attempts_made, self.readiness.max_attempts
        );
        let _ = writeln!(
            out,
            "- Duration (ms): {}",
            self.ended_at_ms.saturating_sub(self.started_at_ms)
        );
        let _ = writeln!(
            out,
            "- Scenarios: {} total, {} passed, {} failed, {} skipped",
            self.counts.total, self.counts.passed, self.counts.failed, self.counts.skipped
        );
        out.push_str("\n## Scenarios\n\n");
        if self.scenarios.is_empty() {
            out.push_str("- None\n");
        }
        for record in &self.scenarios {
            let _ = writeln!(
                out,
                "- [{}] {} ({}, {} attempt(s), {} ms)",
                record.status.as_str(),
                record.name,
                record.suite,
                record.attempts,
                record.duration_ms
            );
            if let Some(failure) = &record.failure {
                let _ = writeln!(out, "  - failure: {failure}");
            }
            for note in &record.notes {
                let _ = writeln!(out, "  - {note}");
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Returns `target/auth-e2e/run_<ms>`.
#[must_use]
pub fn default_run_root() -> PathBuf {
    PathBuf::from(DEFAULT_RUN_PARENT).join(format!("run_{}", now_millis()))
}

/// Paths written for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    /// Canonical JSON summary.
    pub summary_json: PathBuf,
    /// Markdown summary.
    pub summary_markdown: PathBuf,
    /// Request transcript.
    pub transcript: PathBuf,
}

/// Artifact directory for one run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates `root` (and parents) when missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }

    /// Writes the summaries and transcript for a finished run.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when any artifact cannot be written.
    pub fn write_run(
        &self,
        report: &RunReport,
        transcript: &[TranscriptEntry],
    ) -> io::Result<WrittenArtifacts> {
        let written = WrittenArtifacts {
            summary_json: self.write_json(SUMMARY_JSON, report)?,
            summary_markdown: self.write_text(SUMMARY_MARKDOWN, &report.to_markdown())?,
            transcript: self.write_json(TRANSCRIPT_JSON, &transcript)?,
        };
        tracing::info!(root = %self.root.display(), "run artifacts written");
        Ok(written)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
