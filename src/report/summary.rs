use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal classification of one task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Skipped,
    UpToDate,
    Updated,
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Skipped => "skipped",
            Outcome::UpToDate => "up-to-date",
            Outcome::Updated => "updated",
            Outcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    pub task_name: String,
    pub outcome: Outcome,
    pub message: String,
    pub required: bool,
    pub elapsed_ms: u64,
}

/// Overall classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    PartialFailure,
    Fatal,
}

/// How a run with only non-required failures maps to the process exit status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitPolicy {
    /// Non-required failures are reported but the process exits 0.
    #[default]
    Lenient,
    /// Any failed task makes the process exit 1.
    Strict,
}

/// Ordered results of one orchestrator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub results: Vec<TaskResult>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: TaskResult) {
        self.results.push(result);
    }

    pub fn any_update_performed(&self) -> bool {
        self.results.iter().any(|r| r.outcome == Outcome::Updated)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| r.outcome == Outcome::Failed)
    }

    /// The required task whose failure halted the run, if any.
    pub fn fatal_failure(&self) -> Option<&TaskResult> {
        self.failures().find(|r| r.required)
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.fatal_failure().is_some() {
            RunOutcome::Fatal
        } else if self.failures().next().is_some() {
            RunOutcome::PartialFailure
        } else {
            RunOutcome::Success
        }
    }

    pub fn exit_code(&self, policy: ExitPolicy) -> i32 {
        match (self.outcome(), policy) {
            (RunOutcome::Success, _) => 0,
            (RunOutcome::PartialFailure, ExitPolicy::Lenient) => 0,
            (RunOutcome::PartialFailure, ExitPolicy::Strict) => 1,
            (RunOutcome::Fatal, _) => 1,
        }
    }
}

/// JSON shape printed by `--json`.
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub started_at: &'a str,
    pub outcome: RunOutcome,
    pub any_update_performed: bool,
    pub exit_code: i32,
    pub results: &'a [TaskResult],
}

impl<'a> SummaryDocument<'a> {
    pub fn new(summary: &'a RunSummary, started_at: &'a str, policy: ExitPolicy) -> Self {
        Self {
            started_at,
            outcome: summary.outcome(),
            any_update_performed: summary.any_update_performed(),
            exit_code: summary.exit_code(policy),
            results: &summary.results,
        }
    }
}
