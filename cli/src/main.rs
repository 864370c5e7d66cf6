use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use vss_compat::tree::{Report, Tree};

/// Scans a Visual SourceSafe database, rebuilds its project tree and
/// reports integrity problems.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database root (the directory containing data/)
    root: PathBuf,

    #[clap(long)]
    log_level: Option<Level>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.unwrap_or(Level::INFO);
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match run(&cli) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<Report> {
    let started = Instant::now();

    let mut tree = Tree::import(&cli.root)
        .with_context(|| format!("could not import the database at {}", cli.root.display()))?;

    let mut report = Report::default();
    tree.assemble(&mut report)
        .context("could not assemble the project tree")?;
    tree.audit(&mut report);

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        findings = report.findings.len(),
        "scan finished"
    );
    Ok(report)
}
