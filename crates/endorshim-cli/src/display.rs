use colored::*;
use endorshim_core::export::ExportOutcome;
use endorshim_core::options::{Diagnostic, DiagnosticSeverity};
use endorshim_core::{InstalledBinary, Subcommand};

/// Everything worth showing once a local run has finished.
pub struct RunSummary<'a> {
    pub subcommand: Subcommand,
    pub installed: &'a InstalledBinary,
    pub invocation: &'a [String],
    pub diagnostics: &'a [Diagnostic],
    pub export: Option<&'a ExportOutcome>,
    pub succeeded: bool,
}

/// Print a run summary to stderr, leaving stdout to endorctl's output.
pub fn print_run_summary(summary: &RunSummary) {
    eprintln!();
    eprintln!(
        "{}",
        format!(
            " endorshim v{} | endorctl {}",
            env!("CARGO_PKG_VERSION"),
            summary.subcommand
        )
        .bold()
    );
    eprintln!();

    eprintln!(" {}", "Binary".bold().underline());
    eprintln!(
        " {} Version: {}",
        "|-".dimmed(),
        summary.installed.version.cyan()
    );
    eprintln!(" {} Platform: {}", "|-".dimmed(), summary.installed.platform);
    eprintln!(
        " {} Installed at: {}",
        "|-".dimmed(),
        summary.installed.path.display()
    );
    eprintln!(
        " {} Command: {}",
        "|-".dimmed(),
        summary.invocation.join(" ").dimmed()
    );
    eprintln!();

    eprintln!(" {}", "=".repeat(60).dimmed());
    eprintln!();

    if summary.diagnostics.is_empty() {
        eprintln!(" {} No configuration problems found.", "OK".green().bold());
    } else {
        for diagnostic in summary.diagnostics {
            print_diagnostic(diagnostic);
        }
    }
    eprintln!();

    if let Some(outcome) = summary.export {
        match outcome {
            ExportOutcome::Exported { name, receipt, .. } => eprintln!(
                " {} Scan result exported to artifact {} ({} bytes)",
                "|-".dimmed(),
                name.cyan(),
                receipt.size
            ),
            ExportOutcome::Skipped(_) => {
                eprintln!(" {} Scan result export skipped", "|-".dimmed())
            }
        }
        eprintln!();
    }

    let status = if summary.succeeded {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    eprintln!(" {} endorctl {} {}", "Status:".bold(), summary.subcommand, status);
    eprintln!();
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let symbol = match diagnostic.severity {
        DiagnosticSeverity::Error => diagnostic.severity.symbol().red().bold(),
        DiagnosticSeverity::Warning => diagnostic.severity.symbol().yellow().bold(),
    };
    eprintln!(
        " {} [{}] {}",
        symbol,
        diagnostic.rule.dimmed(),
        diagnostic.message
    );
}
