use crate::agents::command_runner::{CommandRunner, ToolLocator};
use crate::error::{Result, UpkeepError};
use crate::report::Reporter;
use crate::tasks::Prerequisite;
use std::io::Write;

/// Makes sure every prerequisite tool exists, installing missing ones.
pub struct PrerequisiteInstaller<'a> {
    runner: &'a dyn CommandRunner,
    locator: &'a dyn ToolLocator,
}

impl<'a> PrerequisiteInstaller<'a> {
    pub fn new(runner: &'a dyn CommandRunner, locator: &'a dyn ToolLocator) -> Self {
        Self { runner, locator }
    }

    /// Install whatever is missing. The first failed install aborts with `ToolMissing`.
    pub fn ensure<O: Write, E: Write>(
        &self,
        prerequisites: &[Prerequisite],
        reporter: &mut Reporter<O, E>,
    ) -> Result<()> {
        for prerequisite in prerequisites {
            if self.locator.is_available(&prerequisite.tool) {
                continue;
            }

            reporter.info(&format!("Installing {}...", prerequisite.tool))?;

            let failure = match self.runner.run(&prerequisite.install) {
                Ok(output) if output.success() => None,
                Ok(output) => Some(output.failure_detail()),
                Err(e) => Some(e.to_string()),
            };

            if let Some(reason) = failure {
                reporter.error(&format!("Failed to install {}", prerequisite.tool))?;
                return Err(UpkeepError::ToolMissing {
                    tool: prerequisite.tool.clone(),
                    reason: format!("`{}` failed ({reason})", prerequisite.install),
                });
            }

            reporter.success(&format!("{} installed successfully.", prerequisite.tool))?;
        }

        Ok(())
    }
}
