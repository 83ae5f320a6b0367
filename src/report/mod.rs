pub mod reporter;
pub mod summary;

pub use reporter::Reporter;
pub use summary::{ExitPolicy, Outcome, RunOutcome, RunSummary, SummaryDocument, TaskResult};
