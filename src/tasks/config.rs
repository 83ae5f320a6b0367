use super::{
    CheckCommand, CommandSpec, Prerequisite, Task, UpdateSignal, default_prerequisites,
    default_tasks,
};
use crate::error::{Result, UpkeepError};
use crate::report::ExitPolicy;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Effective configuration for one invocation.
#[derive(Debug, Clone)]
pub struct UpkeepConfig {
    pub exit_policy: ExitPolicy,
    pub show_versions: bool,
    pub prerequisites: Vec<Prerequisite>,
    pub tasks: Vec<Task>,
}

impl Default for UpkeepConfig {
    fn default() -> Self {
        Self {
            exit_policy: ExitPolicy::default(),
            show_versions: true,
            prerequisites: default_prerequisites(),
            tasks: default_tasks(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    exit_policy: Option<ExitPolicy>,
    show_versions: Option<bool>,
    prerequisites: Option<Vec<RawPrerequisite>>,
    tasks: Option<Vec<RawTask>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommand {
    Line(String),
    Argv(Vec<String>),
}

impl RawCommand {
    fn into_spec(self, context: &str) -> Result<CommandSpec> {
        let parsed = match self {
            RawCommand::Line(line) => CommandSpec::parse(&line),
            RawCommand::Argv(argv) => CommandSpec::from_argv(argv),
        };
        parsed.map_err(|e| UpkeepError::Config(format!("{context}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCheck {
    command: RawCommand,
    #[serde(default)]
    signal: UpdateSignal,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTask {
    name: String,
    label: Option<String>,
    tool: Option<String>,
    #[serde(default)]
    required: bool,
    check: Option<RawCheck>,
    #[serde(default)]
    apply: Vec<RawCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPrerequisite {
    tool: String,
    install: RawCommand,
}

impl UpkeepConfig {
    /// Load the configuration file if one was given, otherwise use the built-in catalog.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            tracing::debug!("No config file given, using built-in task catalog");
            return Ok(Self::default());
        };

        tracing::debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            UpkeepError::Config(format!("Failed to read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let prerequisites = match raw.prerequisites {
            Some(entries) => entries
                .into_iter()
                .map(|p| {
                    let install = p.install.into_spec(&format!("prerequisite '{}'", p.tool))?;
                    Ok(Prerequisite {
                        tool: p.tool,
                        install,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            None => defaults.prerequisites,
        };

        let tasks = match raw.tasks {
            Some(entries) => convert_tasks(entries)?,
            None => defaults.tasks,
        };

        Ok(Self {
            exit_policy: raw.exit_policy.unwrap_or(defaults.exit_policy),
            show_versions: raw.show_versions.unwrap_or(defaults.show_versions),
            prerequisites,
            tasks,
        })
    }
}

fn convert_tasks(entries: Vec<RawTask>) -> Result<Vec<Task>> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(entries.len());

    for raw in entries {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(UpkeepError::Config("Task name must not be empty".into()));
        }
        if !seen.insert(name.clone()) {
            return Err(UpkeepError::Config(format!("Duplicate task name '{name}'")));
        }

        let context = format!("task '{name}'");
        let check = match raw.check {
            Some(check) => Some(CheckCommand {
                command: check.command.into_spec(&context)?,
                signal: check.signal,
            }),
            None => None,
        };
        let apply = raw
            .apply
            .into_iter()
            .map(|cmd| cmd.into_spec(&context))
            .collect::<Result<Vec<_>>>()?;

        tasks.push(Task {
            label: raw.label.unwrap_or_else(|| name.clone()),
            name,
            tool: raw.tool,
            check,
            apply,
            required: raw.required,
        });
    }

    Ok(tasks)
}
