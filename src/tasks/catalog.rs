use super::{CommandSpec, Prerequisite, Task, UpdateSignal};

/// The built-in update sequence for a macOS workstation.
pub fn default_tasks() -> Vec<Task> {
    vec![
        // `brew outdated` reads the local index, so it has to be refreshed first.
        Task::new("homebrew_index", "Homebrew index")
            .tool("brew")
            .apply(CommandSpec::new("brew", ["update"]))
            .required(true),
        Task::new("homebrew", "Homebrew packages")
            .tool("brew")
            .check(
                CommandSpec::new("brew", ["outdated", "--quiet"]),
                UpdateSignal::NonEmptyOutput,
            )
            .apply(CommandSpec::new("brew", ["upgrade"]))
            .required(true),
        Task::new("macos_system", "macOS system software")
            .tool("softwareupdate")
            .check(
                CommandSpec::new("softwareupdate", ["-l"]),
                UpdateSignal::OutputLacks("No new software available".to_string()),
            )
            .apply(CommandSpec::new("sudo", ["softwareupdate", "-ia"]))
            .required(true),
        Task::new("ruby_gems", "Ruby gems")
            .tool("gem")
            .apply(CommandSpec::new("gem", ["update", "--system"])),
        Task::new("npm", "npm and global packages")
            .tool("npm")
            .check(
                CommandSpec::new("npm", ["outdated", "-g"]),
                UpdateSignal::ExitFailure,
            )
            .apply(CommandSpec::new("npm", ["update", "-g"])),
        Task::new("pip", "pip and Python packages")
            .tool("pip3")
            .apply(CommandSpec::new("pip3", ["install", "--upgrade", "pip"]))
            .apply(CommandSpec::new(
                "pip3",
                ["install", "--upgrade", "setuptools"],
            )),
        Task::new("go_packages", "Go packages").tool("go"),
        Task::new("cleanup", "Homebrew cleanup")
            .tool("brew")
            .apply(CommandSpec::new("brew", ["cleanup"]))
            .required(true),
    ]
}

pub fn default_prerequisites() -> Vec<Prerequisite> {
    vec![Prerequisite {
        tool: "npm".to_string(),
        install: CommandSpec::new("brew", ["install", "npm"]),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_order_matches_update_sequence() {
        let names: Vec<String> = default_tasks().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "homebrew_index",
                "homebrew",
                "macos_system",
                "ruby_gems",
                "npm",
                "pip",
                "go_packages",
                "cleanup"
            ]
        );
    }

    #[test]
    fn catalog_names_are_unique() {
        let tasks = default_tasks();
        let unique: HashSet<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(unique.len(), tasks.len());
    }

    #[test]
    fn system_level_tasks_are_required() {
        let required: Vec<String> = default_tasks()
            .into_iter()
            .filter(|t| t.required)
            .map(|t| t.name)
            .collect();
        assert_eq!(
            required,
            vec!["homebrew_index", "homebrew", "macos_system", "cleanup"]
        );
    }

    #[test]
    fn brew_index_refresh_runs_before_outdated_check() {
        let tasks = default_tasks();
        let position = |wanted: &CommandSpec| {
            tasks.iter().position(|t| {
                t.apply.contains(wanted) || t.check.as_ref().is_some_and(|c| &c.command == wanted)
            })
        };

        let refresh = position(&CommandSpec::new("brew", ["update"])).unwrap();
        let outdated = position(&CommandSpec::new("brew", ["outdated", "--quiet"])).unwrap();
        assert!(refresh < outdated);
        assert!(tasks[refresh].check.is_none());
    }

    #[test]
    fn go_packages_has_nothing_to_run() {
        let go = default_tasks()
            .into_iter()
            .find(|t| t.name == "go_packages")
            .unwrap();
        assert!(go.check.is_none());
        assert!(go.apply.is_empty());
    }
}
