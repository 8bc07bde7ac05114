//! CLI entrypoint for the PKCS#11 logger harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pkcs11_logger_harness::{Summary, read_log};

/// Log analysis for the PKCS#11 logging proxy.
#[derive(Debug, Parser)]
#[command(name = "pkcs11-logger-harness")]
#[command(about = "Parse and check PKCS#11 logger output")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Emit a JSON summary of every call in a log.
    Summarize {
        /// Log file written by the proxy.
        #[arg(long)]
        log: PathBuf,
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that every record block is complete and contiguous.
    Check {
        /// Log file written by the proxy.
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Summarize { log, output } => {
            let summary = Summary::from_log(&read_log(&log)?);
            let json = summary.to_json()?;
            if let Some(path) = output {
                std::fs::write(&path, json)?;
                eprintln!(
                    "Wrote summary of {} records to {}",
                    summary.records,
                    path.display()
                );
            } else {
                println!("{json}");
            }
        }
        Command::Check { log } => {
            let parsed = read_log(&log)?;
            for violation in &parsed.violations {
                eprintln!(
                    "{}:{}: {:?}: {}",
                    log.display(),
                    violation.line,
                    violation.kind,
                    violation.message
                );
            }
            if !parsed.is_clean() {
                return Err(format!(
                    "{} violations in {} records",
                    parsed.violations.len(),
                    parsed.records.len()
                )
                .into());
            }
            eprintln!("{}: {} records, no violations", log.display(), parsed.records.len());
        }
    }

    Ok(())
}
