pub mod catalog;
pub mod config;

pub use catalog::{default_prerequisites, default_tasks};
pub use config::UpkeepConfig;

use crate::error::{Result, UpkeepError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a command line on whitespace. Quoting is not interpreted;
    /// use the argv form when an argument contains spaces.
    pub fn parse(line: &str) -> Result<Self> {
        Self::from_argv(line.split_whitespace().map(str::to_string).collect())
    }

    /// Whether the program may ask for input on the terminal (a `sudo` password).
    pub fn may_prompt(&self) -> bool {
        Path::new(&self.program)
            .file_name()
            .is_some_and(|name| name == "sudo")
    }

    pub fn from_argv(argv: Vec<String>) -> Result<Self> {
        let mut parts = argv.into_iter();
        match parts.next() {
            Some(program) if !program.trim().is_empty() => Ok(Self {
                program,
                args: parts.collect(),
            }),
            _ => Err(UpkeepError::Config("Command must not be empty".to_string())),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a check command reports that updates are available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateSignal {
    /// Anything on stdout means updates are pending.
    #[default]
    NonEmptyOutput,
    /// Exit status 0 means updates are pending.
    ExitSuccess,
    /// A non-zero exit status means updates are pending (`npm outdated`).
    ExitFailure,
    /// Combined output contains the text.
    OutputContains(String),
    /// Combined output does not contain the text.
    OutputLacks(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCommand {
    pub command: CommandSpec,
    pub signal: UpdateSignal,
}

/// One package ecosystem's unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    /// Human readable name used in status lines.
    pub label: String,
    /// Executable that must be on PATH for the task to run at all.
    pub tool: Option<String>,
    pub check: Option<CheckCommand>,
    pub apply: Vec<CommandSpec>,
    pub required: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            tool: None,
            check: None,
            apply: Vec::new(),
            required: false,
        }
    }

    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn check(mut self, command: CommandSpec, signal: UpdateSignal) -> Self {
        self.check = Some(CheckCommand { command, signal });
        self
    }

    pub fn apply(mut self, command: CommandSpec) -> Self {
        self.apply.push(command);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A tool that must exist before any task runs, with the command that installs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisite {
    pub tool: String,
    pub install: CommandSpec,
}

/// Narrow the task list to `only` (when non-empty) minus `skip`, keeping declared order.
pub fn select(tasks: Vec<Task>, only: &[String], skip: &[String]) -> Result<Vec<Task>> {
    for name in only.iter().chain(skip) {
        if !tasks.iter().any(|task| &task.name == name) {
            let known: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
            return Err(UpkeepError::Config(format!(
                "Unknown task '{}' (known tasks: {})",
                name,
                known.join(", ")
            )));
        }
    }

    let selected: Vec<Task> = tasks
        .into_iter()
        .filter(|task| only.is_empty() || only.contains(&task.name))
        .filter(|task| !skip.contains(&task.name))
        .collect();

    tracing::debug!(
        "Selected tasks: {:?}",
        selected.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
    );

    Ok(selected)
}
