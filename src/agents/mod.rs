pub mod command_runner;
pub mod orchestrator;
pub mod prerequisites;
pub mod versions;

#[cfg(test)]
pub mod testing;

pub use command_runner::{
    CommandOutput, CommandRunner, SystemLocator, SystemRunner, ToolLocator,
};
pub use orchestrator::{Availability, CheckResult, Orchestrator};
pub use prerequisites::PrerequisiteInstaller;
pub use versions::VersionReporter;
