use super::summary::{RunOutcome, RunSummary};
use colored::Colorize;
use std::io::{self, Stderr, Stdout, Write};

pub const ALL_DONE: &str = "All updates and cleanup completed successfully.";
pub const NOTHING_DONE: &str = "No updates or cleanup performed.";
pub const HALTED: &str = "Update run halted before completion.";

/// Writes categorized status lines.
///
/// Informational and success lines go to the standard sink, errors and
/// warnings go to the diagnostic sink.
pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl Reporter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn heading(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message.cyan().bold())
    }

    /// An action is starting.
    pub fn info(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message.yellow())
    }

    /// An action completed.
    pub fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message.green())
    }

    /// An action failed.
    pub fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.err, "{} {}", "Error:".red(), message)
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.err, "{} {}", "Warning:".yellow().bold(), message)
    }

    /// Uncolored line on the standard sink.
    pub fn plain(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    /// Final summary line plus a diagnostic line naming failed tasks.
    ///
    /// A halted run never claims completion, even if earlier tasks updated.
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        let outcome = summary.outcome();
        if outcome == RunOutcome::Fatal {
            writeln!(self.out, "{}", HALTED.red().bold())?;
        } else if summary.any_update_performed() {
            writeln!(self.out, "{}", ALL_DONE.green().bold())?;
        } else {
            writeln!(self.out, "{}", NOTHING_DONE.yellow())?;
        }

        match outcome {
            RunOutcome::Success => {}
            RunOutcome::PartialFailure => {
                let names: Vec<&str> = summary.failures().map(|r| r.task_name.as_str()).collect();
                self.warn(&format!(
                    "{} task(s) failed: {}",
                    names.len(),
                    names.join(", ")
                ))?;
            }
            // The caller turns this into `FatalTaskFailure`.
            RunOutcome::Fatal => {}
        }

        self.out.flush()?;
        self.err.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
