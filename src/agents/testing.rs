//! In-memory stand-ins for process execution and PATH lookup.

use super::command_runner::{CommandOutput, CommandRunner, ToolLocator};
use crate::error::{Result, UpkeepError};
use crate::tasks::CommandSpec;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Replays canned outputs keyed by the rendered command line and records every call.
/// Unscripted commands behave like a program that cannot be spawned.
#[derive(Default)]
pub struct ScriptedRunner {
    outputs: HashMap<String, CommandOutput>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, command: &str, stdout: &str) -> Self {
        self.output(command, CommandOutput::exited(0, stdout, ""))
    }

    pub fn output(mut self, command: &str, output: CommandOutput) -> Self {
        self.outputs.insert(command.to_string(), output);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let line = command.to_string();
        self.calls.borrow_mut().push(line.clone());
        self.outputs.get(&line).cloned().ok_or_else(|| {
            UpkeepError::CommandExecution(format!("Failed to execute '{line}': not found"))
        })
    }
}

pub enum FakeLocator {
    All,
    Only(HashSet<String>),
}

impl FakeLocator {
    pub fn all() -> Self {
        FakeLocator::All
    }

    pub fn only(tools: &[&str]) -> Self {
        FakeLocator::Only(tools.iter().map(|t| t.to_string()).collect())
    }
}

impl ToolLocator for FakeLocator {
    fn is_available(&self, tool: &str) -> bool {
        match self {
            FakeLocator::All => true,
            FakeLocator::Only(tools) => tools.contains(tool),
        }
    }
}
