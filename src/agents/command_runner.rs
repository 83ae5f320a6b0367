use crate::error::{Result, UpkeepError};
use crate::tasks::CommandSpec;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

/// Exit status and captured streams of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Both streams, newline separated so a match cannot span the boundary.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Short description of why the command failed, for status lines.
    pub fn failure_detail(&self) -> String {
        let status = match self.status {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };

        let last_line = [&self.stderr, &self.stdout]
            .into_iter()
            .find_map(|stream| stream.lines().rev().find(|l| !l.trim().is_empty()))
            .map(str::trim);

        match last_line {
            Some(line) => format!("{status}: {line}"),
            None => status,
        }
    }
}

#[cfg(test)]
impl CommandOutput {
    pub fn exited(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            status: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs one external command to completion.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// Answers whether an executable can be found.
pub trait ToolLocator {
    fn is_available(&self, tool: &str) -> bool;
}

/// Blocking runner backed by `std::process`.
///
/// There is no timeout: a command that never exits blocks the run.
pub struct SystemRunner {
    show_progress: bool,
}

impl SystemRunner {
    pub fn new(show_progress: bool) -> Self {
        Self { show_progress }
    }

    /// A redrawing spinner would erase a password prompt, so prompting commands get none.
    fn shows_spinner(&self, command: &CommandSpec) -> bool {
        self.show_progress && !command.may_prompt()
    }

    fn spinner(&self, command: &CommandSpec) -> ProgressBar {
        if !self.shows_spinner(command) {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Running {command}"));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Executing: {}", command);

        let pb = self.spinner(command);
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::inherit())
            .output();
        pb.finish_and_clear();

        let output = output.map_err(|e| {
            UpkeepError::CommandExecution(format!("Failed to execute '{command}': {e}"))
        })?;

        let output = CommandOutput::from(output);
        tracing::debug!("'{}' exited with {:?}", command, output.status);
        Ok(output)
    }
}

/// Looks tools up on PATH.
pub struct SystemLocator;

impl ToolLocator for SystemLocator {
    fn is_available(&self, tool: &str) -> bool {
        let found = which::which(tool);
        tracing::debug!("PATH lookup for '{}': {:?}", tool, found);
        found.is_ok()
    }
}
