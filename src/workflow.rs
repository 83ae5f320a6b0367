use crate::agents::{
    Availability, CheckResult, Orchestrator, PrerequisiteInstaller, SystemLocator, SystemRunner,
    VersionReporter,
};
use crate::cli::{Selection, UpdateArgs};
use crate::error::{Result, UpkeepError};
use crate::report::{ExitPolicy, Outcome, Reporter, RunSummary, SummaryDocument};
use crate::tasks::{self, Task, UpdateSignal, UpkeepConfig};
use colored::Colorize;
use jiff::Zoned;
use std::io::{self, IsTerminal, Write};

type DynReporter = Reporter<Box<dyn Write>, Box<dyn Write>>;

/// With `--json` stdout is reserved for the document, so status lines go to stderr.
fn reporter_for(json: bool) -> DynReporter {
    if json {
        Reporter::new(Box::new(io::stderr()), Box::new(io::stderr()))
    } else {
        Reporter::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }
}

fn now() -> String {
    Zoned::now().strftime("%Y-%m-%d %H:%M:%S").to_string()
}

/// Execute the update workflow and return the process exit code
pub fn execute_update(config: UpkeepConfig, args: &UpdateArgs) -> Result<i32> {
    let UpkeepConfig {
        exit_policy,
        show_versions,
        prerequisites,
        tasks,
    } = config;
    let exit_policy = if args.strict {
        ExitPolicy::Strict
    } else {
        exit_policy
    };
    let tasks = tasks::select(tasks, &args.selection.only, &args.selection.skip)?;

    let started_at = now();
    let runner = SystemRunner::new(io::stderr().is_terminal());
    let locator = SystemLocator;
    let mut reporter = reporter_for(args.json);

    reporter.heading(&format!("Starting package updates ({started_at})..."))?;

    // Step 1: Prerequisites
    if args.skip_prerequisites {
        reporter.plain(&format!("\n{}", "1. Skipping prerequisite checks".yellow()))?;
    } else {
        reporter.plain(&format!("\n{}", "1. Checking prerequisites...".yellow()))?;
        PrerequisiteInstaller::new(&runner, &locator).ensure(&prerequisites, &mut reporter)?;
        reporter.success("✓ Prerequisites are installed")?;
    }

    // Step 2: Run tasks
    reporter.plain(&format!(
        "\n{}",
        format!("2. Running {} update task(s)...", tasks.len()).yellow()
    ))?;
    let summary = Orchestrator::new(&runner, &locator).run(&tasks, &mut reporter)?;

    // Step 3: Summary
    print_run_report(&mut reporter, &summary)?;
    reporter.summary(&summary)?;

    if args.json {
        let document = SummaryDocument::new(&summary, &started_at, exit_policy);
        println!("{}", serde_json::to_string_pretty(&document)?);
    }

    if let Some(fatal) = summary.fatal_failure() {
        return Err(UpkeepError::FatalTaskFailure(fatal.task_name.clone()));
    }

    if show_versions && !args.no_versions && !args.json {
        reporter.plain("")?;
        VersionReporter::new(&runner, &locator).display(&mut reporter)?;
    }

    Ok(summary.exit_code(exit_policy))
}

fn print_run_report(reporter: &mut DynReporter, summary: &RunSummary) -> io::Result<()> {
    reporter.plain(&format!("\n{}", "Update Summary:".cyan().bold()))?;

    for result in &summary.results {
        let outcome = match result.outcome {
            Outcome::Updated => result.outcome.to_string().green().bold(),
            Outcome::UpToDate => result.outcome.to_string().green(),
            Outcome::Skipped => result.outcome.to_string().dimmed(),
            Outcome::Failed => result.outcome.to_string().red().bold(),
        };
        let elapsed = format!("{:.1}s", result.elapsed_ms as f64 / 1000.0);
        reporter.plain(&format!(
            "  • {:<16} {} {}",
            result.task_name.white().bold(),
            outcome,
            elapsed.dimmed()
        ))?;
    }

    Ok(())
}

/// Execute the check workflow (nothing is applied)
pub fn execute_check(config: UpkeepConfig, selection: &Selection, json: bool) -> Result<i32> {
    let tasks = tasks::select(config.tasks, &selection.only, &selection.skip)?;

    let runner = SystemRunner::new(io::stderr().is_terminal());
    let locator = SystemLocator;
    let mut reporter = reporter_for(json);

    reporter.heading(&format!("Checking for available updates ({})...", now()))?;
    reporter.plain("")?;
    let results = Orchestrator::new(&runner, &locator).check(&tasks, &mut reporter)?;

    print_available_updates(&mut reporter, &results)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    let failed = results
        .iter()
        .any(|r| r.availability == Availability::Failed);
    Ok(if failed { 1 } else { 0 })
}

fn print_available_updates(reporter: &mut DynReporter, results: &[CheckResult]) -> io::Result<()> {
    let pending: Vec<&str> = results
        .iter()
        .filter(|r| r.availability == Availability::Available)
        .map(|r| r.task_name.as_str())
        .collect();

    if pending.is_empty() {
        reporter.plain(&format!(
            "\n{}",
            "✨ No checked task has pending updates!".green().bold()
        ))?;
        return Ok(());
    }

    reporter.plain(&format!(
        "\n{}",
        format!("📦 {} task(s) have updates available:", pending.len())
            .cyan()
            .bold()
    ))?;
    for name in &pending {
        reporter.plain(&format!("  • {}", name.white().bold()))?;
    }
    reporter.plain(&format!("\n{}", "To apply these updates, run:".dimmed()))?;
    reporter.plain(&format!(
        "  {}",
        format!("upkeep update --only {}", pending.join(",")).cyan()
    ))
}

/// Execute the list workflow - display the configured tasks
pub fn execute_list(config: &UpkeepConfig) -> Result<()> {
    println!("{}", "Configured update tasks:".cyan().bold());

    for (index, task) in config.tasks.iter().enumerate() {
        print_task(index + 1, task);
    }

    if !config.prerequisites.is_empty() {
        println!("\n{}", "Prerequisites:".yellow().bold());
        for prerequisite in &config.prerequisites {
            println!(
                "  • {} {}",
                prerequisite.tool.white().bold(),
                format!("(installed with `{}`)", prerequisite.install).dimmed()
            );
        }
    }

    let policy = match config.exit_policy {
        ExitPolicy::Lenient => "lenient (only required task failures exit non-zero)",
        ExitPolicy::Strict => "strict (any task failure exits non-zero)",
    };
    println!("\n{} {}", "Exit policy:".cyan().bold(), policy);

    Ok(())
}

fn print_task(position: usize, task: &Task) {
    let required = if task.required {
        " [required]".red().to_string()
    } else {
        String::new()
    };
    println!(
        "\n{}. {} {}{}",
        position,
        task.name.white().bold(),
        format!("({})", task.label).dimmed(),
        required
    );

    if let Some(tool) = &task.tool {
        println!("     needs:  {}", tool.bright_cyan());
    }

    if let Some(check) = &task.check {
        let signal = match &check.signal {
            UpdateSignal::NonEmptyOutput => "updates when output is non-empty".to_string(),
            UpdateSignal::ExitSuccess => "updates when exit code is 0".to_string(),
            UpdateSignal::ExitFailure => "updates when exit code is non-zero".to_string(),
            UpdateSignal::OutputContains(text) => format!("updates when output contains '{text}'"),
            UpdateSignal::OutputLacks(text) => format!("updates unless output contains '{text}'"),
        };
        println!(
            "     check:  {} {}",
            check.command.to_string().cyan(),
            format!("({signal})").dimmed()
        );
    } else if !task.apply.is_empty() {
        println!("     check:  {}", "none, always applied".dimmed());
    }

    if task.apply.is_empty() {
        println!("     apply:  {}", "nothing configured".dimmed());
    }
    for command in &task.apply {
        println!("     apply:  {}", command.to_string().cyan());
    }
}

/// Execute the versions workflow
pub fn execute_versions() -> Result<()> {
    let runner = SystemRunner::new(false);
    let mut reporter = Reporter::stdio();
    VersionReporter::new(&runner, &SystemLocator).display(&mut reporter)?;
    Ok(())
}
