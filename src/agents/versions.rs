use crate::agents::command_runner::{CommandRunner, ToolLocator};
use crate::error::Result;
use crate::report::Reporter;
use crate::tasks::CommandSpec;
use regex::Regex;
use std::io::Write;

/// Prints the installed package versions after a run.
pub struct VersionReporter<'a> {
    runner: &'a dyn CommandRunner,
    locator: &'a dyn ToolLocator,
}

impl<'a> VersionReporter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, locator: &'a dyn ToolLocator) -> Self {
        Self { runner, locator }
    }

    pub fn display<O: Write, E: Write>(&self, reporter: &mut Reporter<O, E>) -> Result<()> {
        reporter.info("Displaying current package versions...")?;
        reporter.plain("Package\t\tVersion")?;
        reporter.plain("----------------------------------")?;

        if let Some(listing) = self.capture("brew", &["list", "--versions"]) {
            for (name, version) in parse_brew_versions(&listing) {
                reporter.plain(&format!("{name:<20} {version}"))?;
            }
        }

        if let Some(version) = self
            .capture("ruby", &["--version"])
            .as_deref()
            .and_then(parse_ruby_version)
        {
            reporter.plain(&format!("ruby\t\t{version}"))?;
        }

        Ok(())
    }

    fn capture(&self, program: &str, args: &[&str]) -> Option<String> {
        if !self.locator.is_available(program) {
            tracing::debug!("{} not on PATH, omitting its versions", program);
            return None;
        }

        let command = CommandSpec::new(program, args.iter().copied());
        match self.runner.run(&command) {
            Ok(output) if output.success() => Some(output.stdout),
            Ok(output) => {
                tracing::debug!("'{}' failed: {}", command, output.failure_detail());
                None
            }
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        }
    }
}

/// `brew list --versions` prints `name v1 [v2 ...]`; the last version is the active one.
pub fn parse_brew_versions(listing: &str) -> Vec<(String, String)> {
    listing
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let name = fields.next()?;
            let version = fields.last()?;
            Some((name.to_string(), version.to_string()))
        })
        .collect()
}

pub fn parse_ruby_version(output: &str) -> Option<String> {
    let re = Regex::new(r"^ruby\s+(\S+)").ok()?;
    re.captures(output.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
