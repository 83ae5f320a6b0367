use crate::agents::command_runner::{CommandRunner, ToolLocator};
use crate::error::Result;
use crate::report::{Outcome, Reporter, RunSummary, TaskResult};
use crate::tasks::{CheckCommand, Task, UpdateSignal};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

/// What a check-only pass learned about a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    UpToDate,
    /// No check command, or the task's tool is not installed.
    Unchecked,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub task_name: String,
    pub availability: Availability,
    pub message: String,
}

/// Runs tasks one at a time in declared order.
pub struct Orchestrator<'a> {
    runner: &'a dyn CommandRunner,
    locator: &'a dyn ToolLocator,
}

impl<'a> Orchestrator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, locator: &'a dyn ToolLocator) -> Self {
        Self { runner, locator }
    }

    /// Execute every task, stopping after the first failed required task.
    ///
    /// `Err` is only returned when a status line cannot be written; task
    /// failures are recorded in the summary.
    pub fn run<O: Write, E: Write>(
        &self,
        tasks: &[Task],
        reporter: &mut Reporter<O, E>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::new();

        for task in tasks {
            let started = Instant::now();
            let (outcome, message) = self.execute(task, reporter)?;
            tracing::debug!("Task '{}' finished: {}", task.name, outcome);

            summary.push(TaskResult {
                task_name: task.name.clone(),
                outcome,
                message,
                required: task.required,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });

            if outcome == Outcome::Failed && task.required {
                tracing::debug!("Required task '{}' failed, halting", task.name);
                break;
            }
        }

        Ok(summary)
    }

    /// Run only the check commands. Nothing is applied and nothing halts.
    pub fn check<O: Write, E: Write>(
        &self,
        tasks: &[Task],
        reporter: &mut Reporter<O, E>,
    ) -> Result<Vec<CheckResult>> {
        let mut results = Vec::with_capacity(tasks.len());

        for task in tasks {
            let (availability, message) = if let Some(reason) = self.missing_tool(task) {
                let message = format!("Skipping {}: {}", task.label, reason);
                reporter.info(&message)?;
                (Availability::Unchecked, message)
            } else if let Some(check) = &task.check {
                reporter.info(&format!("Checking for {} updates...", task.label))?;
                match self.updates_available(check) {
                    Ok(true) => {
                        let message = format!("{} has updates available.", task.label);
                        reporter.success(&message)?;
                        (Availability::Available, message)
                    }
                    Ok(false) => {
                        let message = format!("{} is up-to-date.", task.label);
                        reporter.success(&message)?;
                        (Availability::UpToDate, message)
                    }
                    Err(detail) => {
                        let message =
                            format!("Failed to check for {} updates ({detail})", task.label);
                        reporter.error(&message)?;
                        (Availability::Failed, message)
                    }
                }
            } else {
                let message = if task.apply.is_empty() {
                    format!("{} has no update commands configured.", task.label)
                } else {
                    format!("{} has no check command; updates always run.", task.label)
                };
                reporter.info(&message)?;
                (Availability::Unchecked, message)
            };

            results.push(CheckResult {
                task_name: task.name.clone(),
                availability,
                message,
            });
        }

        Ok(results)
    }

    fn execute<O: Write, E: Write>(
        &self,
        task: &Task,
        reporter: &mut Reporter<O, E>,
    ) -> Result<(Outcome, String)> {
        if let Some(reason) = self.missing_tool(task) {
            reporter.info(&format!("Skipping {}: {}", task.label, reason))?;
            return Ok((Outcome::Skipped, reason));
        }

        if task.check.is_none() && task.apply.is_empty() {
            let message = "no update commands configured".to_string();
            reporter.info(&format!("Skipping {}: {}", task.label, message))?;
            return Ok((Outcome::Skipped, message));
        }

        if let Some(check) = &task.check {
            reporter.info(&format!("Checking for {} updates...", task.label))?;
            match self.updates_available(check) {
                Ok(true) => {}
                Ok(false) => {
                    let message = format!("{} is up-to-date.", task.label);
                    reporter.success(&message)?;
                    return Ok((Outcome::UpToDate, message));
                }
                Err(detail) => {
                    let message = format!("Failed to check for {} updates ({detail})", task.label);
                    reporter.error(&message)?;
                    return Ok((Outcome::Failed, message));
                }
            }

            if task.apply.is_empty() {
                let message = "updates available but no apply commands configured".to_string();
                reporter.info(&format!("Skipping {}: {}", task.label, message))?;
                return Ok((Outcome::Skipped, message));
            }
        }

        reporter.info(&format!("Updating {}...", task.label))?;
        for command in &task.apply {
            let detail = match self.runner.run(command) {
                Ok(output) if output.success() => continue,
                Ok(output) => output.failure_detail(),
                Err(e) => e.to_string(),
            };

            let message = format!("Failed to update {} (`{command}` {detail})", task.label);
            reporter.error(&message)?;
            return Ok((Outcome::Failed, message));
        }

        let message = format!("{} updated successfully.", task.label);
        reporter.success(&message)?;
        Ok((Outcome::Updated, message))
    }

    fn missing_tool(&self, task: &Task) -> Option<String> {
        let tool = task.tool.as_deref()?;
        if self.locator.is_available(tool) {
            None
        } else {
            Some(format!("{tool} not found on PATH"))
        }
    }

    /// `Ok(true)` when updates are available, `Err` with a detail when the check itself failed.
    fn updates_available(&self, check: &CheckCommand) -> std::result::Result<bool, String> {
        let output = self.runner.run(&check.command).map_err(|e| e.to_string())?;

        match &check.signal {
            UpdateSignal::ExitSuccess => Ok(output.success()),
            UpdateSignal::ExitFailure => match output.status {
                Some(_) => Ok(!output.success()),
                None => Err(output.failure_detail()),
            },
            _ if !output.success() => Err(output.failure_detail()),
            UpdateSignal::NonEmptyOutput => Ok(!output.stdout.trim().is_empty()),
            UpdateSignal::OutputContains(text) => Ok(output.combined().contains(text.as_str())),
            UpdateSignal::OutputLacks(text) => Ok(!output.combined().contains(text.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{FakeLocator, ScriptedRunner};
    use crate::agents::CommandOutput;
    use crate::report::{ExitPolicy, RunOutcome};
    use crate::tasks::CommandSpec;

    fn cmd(line: &str) -> CommandSpec {
        CommandSpec::parse(line).unwrap()
    }

    fn homebrew(required: bool) -> Task {
        Task::new("homebrew", "Homebrew packages")
            .check(cmd("brew outdated --quiet"), UpdateSignal::NonEmptyOutput)
            .apply(cmd("brew update"))
            .apply(cmd("brew upgrade"))
            .required(required)
    }

    fn npm() -> Task {
        Task::new("npm", "npm and global packages")
            .check(cmd("npm outdated -g"), UpdateSignal::ExitFailure)
            .apply(cmd("npm update -g"))
    }

    fn pip() -> Task {
        Task::new("pip", "pip and Python packages")
            .apply(cmd("pip3 install --upgrade pip"))
            .apply(cmd("pip3 install --upgrade setuptools"))
    }

    fn run(
        tasks: &[Task],
        runner: &ScriptedRunner,
        locator: &FakeLocator,
    ) -> (RunSummary, String, String) {
        let mut reporter = Reporter::new(Vec::new(), Vec::new());
        let summary = Orchestrator::new(runner, locator)
            .run(tasks, &mut reporter)
            .unwrap();
        let (out, err) = reporter.into_inner();
        (
            summary,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn outcomes(summary: &RunSummary) -> Vec<(&str, Outcome)> {
        summary
            .results
            .iter()
            .map(|r| (r.task_name.as_str(), r.outcome))
            .collect()
    }

    #[test]
    fn updates_available_then_up_to_date() {
        let runner = ScriptedRunner::new()
            .ok("brew outdated --quiet", "wget\ngit\n")
            .ok("brew update", "")
            .ok("brew upgrade", "")
            .output("npm outdated -g", CommandOutput::exited(0, "", ""));

        let (summary, out, err) = run(&[homebrew(false), npm()], &runner, &FakeLocator::all());

        assert_eq!(
            outcomes(&summary),
            vec![("homebrew", Outcome::Updated), ("npm", Outcome::UpToDate)]
        );
        assert!(summary.any_update_performed());
        assert_eq!(summary.exit_code(ExitPolicy::Lenient), 0);
        assert!(out.contains("Homebrew packages updated successfully."));
        assert!(out.contains("npm and global packages is up-to-date."));
        assert!(err.is_empty());
        assert!(!runner.calls().contains(&"npm update -g".to_string()));
    }

    #[test]
    fn required_failure_halts_the_run() {
        let runner = ScriptedRunner::new()
            .ok("brew outdated --quiet", "wget\n")
            .ok("brew update", "")
            .output("brew upgrade", CommandOutput::exited(1, "", "Error: disk full\n"))
            .ok("npm outdated -g", "");

        let (summary, out, err) = run(&[homebrew(true), npm()], &runner, &FakeLocator::all());

        assert_eq!(outcomes(&summary), vec![("homebrew", Outcome::Failed)]);
        assert_eq!(summary.outcome(), RunOutcome::Fatal);
        assert_ne!(summary.exit_code(ExitPolicy::Lenient), 0);
        assert!(err.contains("Failed to update Homebrew packages"));
        assert!(err.contains("disk full"));
        assert!(!out.contains("npm"));
        assert_eq!(
            runner.calls(),
            vec!["brew outdated --quiet", "brew update", "brew upgrade"]
        );
    }

    #[test]
    fn optional_failure_continues_with_remaining_tasks() {
        let runner = ScriptedRunner::new()
            .output("npm outdated -g", CommandOutput::exited(1, "eslint\n", ""))
            .output("npm update -g", CommandOutput::exited(243, "", "EACCES\n"))
            .ok("pip3 install --upgrade pip", "")
            .ok("pip3 install --upgrade setuptools", "");

        let (summary, out, err) = run(&[npm(), pip()], &runner, &FakeLocator::all());

        assert_eq!(
            outcomes(&summary),
            vec![("npm", Outcome::Failed), ("pip", Outcome::Updated)]
        );
        assert!(summary.any_update_performed());
        assert_eq!(summary.outcome(), RunOutcome::PartialFailure);
        assert_eq!(summary.exit_code(ExitPolicy::Lenient), 0);
        assert_eq!(summary.exit_code(ExitPolicy::Strict), 1);
        assert!(err.contains("exit code 243: EACCES"));
        assert!(out.contains("pip and Python packages updated successfully."));
    }

    #[test]
    fn failing_apply_command_skips_rest_of_task() {
        let runner = ScriptedRunner::new()
            .output("pip3 install --upgrade pip", CommandOutput::exited(1, "", ""));

        let (summary, _, _) = run(&[pip()], &runner, &FakeLocator::all());

        assert_eq!(outcomes(&summary), vec![("pip", Outcome::Failed)]);
        assert_eq!(runner.calls(), vec!["pip3 install --upgrade pip"]);
    }

    #[test]
    fn missing_program_is_a_task_failure() {
        let runner = ScriptedRunner::new();
        let (summary, _, err) = run(&[pip()], &runner, &FakeLocator::all());
        assert_eq!(outcomes(&summary), vec![("pip", Outcome::Failed)]);
        assert!(err.contains("Failed to update pip and Python packages"));
    }

    #[test]
    fn status_lines_follow_declared_order() {
        let runner = ScriptedRunner::new()
            .ok("pip3 install --upgrade pip", "")
            .ok("pip3 install --upgrade setuptools", "")
            .ok("npm outdated -g", "")
            .ok("brew outdated --quiet", "");

        let (_, out, _) = run(&[pip(), npm(), homebrew(false)], &runner, &FakeLocator::all());

        let pip_at = out.find("Updating pip").unwrap();
        let npm_at = out.find("Checking for npm").unwrap();
        let brew_at = out.find("Checking for Homebrew").unwrap();
        assert!(pip_at < npm_at && npm_at < brew_at);
    }

    #[test]
    fn second_run_on_current_system_updates_nothing() {
        let runner = ScriptedRunner::new()
            .ok("brew outdated --quiet", "")
            .ok("npm outdated -g", "");
        let tasks = [homebrew(true), npm()];

        for _ in 0..2 {
            let (summary, _, _) = run(&tasks, &runner, &FakeLocator::all());
            assert!(!summary.any_update_performed());
            assert!(summary
                .results
                .iter()
                .all(|r| r.outcome == Outcome::UpToDate));
        }
    }

    #[test]
    fn missing_tool_skips_task() {
        let runner = ScriptedRunner::new();
        let task = homebrew(true).tool("brew");

        let (summary, out, _) = run(&[task], &runner, &FakeLocator::only(&[]));

        assert_eq!(outcomes(&summary), vec![("homebrew", Outcome::Skipped)]);
        assert!(out.contains("brew not found on PATH"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn task_without_commands_is_skipped() {
        let runner = ScriptedRunner::new();
        let (summary, _, _) = run(
            &[Task::new("go_packages", "Go packages")],
            &runner,
            &FakeLocator::all(),
        );
        assert_eq!(outcomes(&summary), vec![("go_packages", Outcome::Skipped)]);
        assert_eq!(summary.outcome(), RunOutcome::Success);
    }

    #[test]
    fn failed_check_is_a_task_failure() {
        let runner = ScriptedRunner::new().output(
            "softwareupdate -l",
            CommandOutput::exited(1, "", "Cannot reach server\n"),
        );
        let task = Task::new("macos_system", "macOS system software")
            .check(
                cmd("softwareupdate -l"),
                UpdateSignal::OutputLacks("No new software available".into()),
            )
            .apply(cmd("sudo softwareupdate -ia"))
            .required(true);

        let (summary, _, err) = run(&[task], &runner, &FakeLocator::all());

        assert_eq!(outcomes(&summary), vec![("macos_system", Outcome::Failed)]);
        assert!(err.contains("Failed to check for macOS system software updates"));
        assert_eq!(runner.calls(), vec!["softwareupdate -l"]);
    }

    #[test]
    fn output_signals_inspect_stdout_and_stderr() {
        let runner = ScriptedRunner::new().output(
            "softwareupdate -l",
            CommandOutput::exited(0, "Software Update Tool\n", "No new software available.\n"),
        );
        let task = Task::new("macos_system", "macOS system software")
            .check(
                cmd("softwareupdate -l"),
                UpdateSignal::OutputLacks("No new software available".into()),
            )
            .apply(cmd("sudo softwareupdate -ia"));

        let (summary, _, _) = run(&[task], &runner, &FakeLocator::all());
        assert_eq!(outcomes(&summary), vec![("macos_system", Outcome::UpToDate)]);
    }

    #[test]
    fn output_contains_signal_decides_availability() {
        let task = Task::new("macos_system", "macOS system software")
            .check(
                cmd("softwareupdate -l"),
                UpdateSignal::OutputContains("Label:".into()),
            )
            .apply(cmd("sudo softwareupdate -ia"));

        let pending = ScriptedRunner::new()
            .output(
                "softwareupdate -l",
                CommandOutput::exited(0, "", "* Label: Safari 18.1\n"),
            )
            .ok("sudo softwareupdate -ia", "");
        let (summary, _, _) = run(std::slice::from_ref(&task), &pending, &FakeLocator::all());
        assert_eq!(outcomes(&summary), vec![("macos_system", Outcome::Updated)]);

        let current = ScriptedRunner::new().ok("softwareupdate -l", "Finding available software\n");
        let (summary, _, _) = run(&[task], &current, &FakeLocator::all());
        assert_eq!(outcomes(&summary), vec![("macos_system", Outcome::UpToDate)]);
        assert_eq!(current.calls(), vec!["softwareupdate -l"]);
    }

    #[test]
    fn exit_failure_check_killed_by_signal_is_a_failure() {
        let runner = ScriptedRunner::new().output(
            "npm outdated -g",
            CommandOutput {
                status: None,
                ..Default::default()
            },
        );

        let (summary, _, err) = run(&[npm()], &runner, &FakeLocator::all());

        assert_eq!(outcomes(&summary), vec![("npm", Outcome::Failed)]);
        assert!(err.contains("terminated by signal"));
        assert_eq!(runner.calls(), vec!["npm outdated -g"]);
    }

    #[test]
    fn exit_success_signal_treats_failure_as_current() {
        let runner = ScriptedRunner::new()
            .output("needs-update", CommandOutput::exited(1, "", ""));
        let task = Task::new("custom", "Custom")
            .check(cmd("needs-update"), UpdateSignal::ExitSuccess)
            .apply(cmd("do-update"));

        let (summary, _, _) = run(&[task], &runner, &FakeLocator::all());
        assert_eq!(outcomes(&summary), vec![("custom", Outcome::UpToDate)]);
    }

    #[test]
    fn check_pass_never_applies() {
        let runner = ScriptedRunner::new()
            .ok("brew outdated --quiet", "wget\n")
            .output("npm outdated -g", CommandOutput::exited(0, "", ""));
        let tasks = [homebrew(true), npm(), pip(), Task::new("go_packages", "Go packages")];

        let mut reporter = Reporter::new(Vec::new(), Vec::new());
        let results = Orchestrator::new(&runner, &FakeLocator::all())
            .check(&tasks, &mut reporter)
            .unwrap();

        let availability: Vec<Availability> = results.iter().map(|r| r.availability).collect();
        assert_eq!(
            availability,
            vec![
                Availability::Available,
                Availability::UpToDate,
                Availability::Unchecked,
                Availability::Unchecked
            ]
        );
        assert_eq!(runner.calls(), vec!["brew outdated --quiet", "npm outdated -g"]);
    }
}
