//! `report-importr` — write the licenses and copyrights of a parsed report into
//! a clearing database.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load import config ([`config::load_config`]).
//! 3. Read the parsed report ([`models::ReportImportData`]) and the database
//!    ([`store::memory::MemoryStore`]).
//! 4. Resolve licenses, write findings, decisions and copyrights ([`import`]).
//! 5. Save the database unless `--dry-run`, also when the import fails.
//! 6. Render the run summary ([`report`]).

mod cli;
mod config;
mod import;
mod license;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use cli::{Cli, SummaryFormat};
use config::load_config;
use config::ImportConfig;
use import::ReportImporter;
use models::{ImportContext, ImportSummary, ReportImportData};
use store::memory::MemoryStore;
use store::ImportStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let work_dir = std::env::current_dir()?;
    let config = load_config(&work_dir, cli.config.as_deref())?;

    let content = std::fs::read_to_string(&cli.report)
        .with_context(|| format!("reading report {}", cli.report.display()))?;
    let data: ReportImportData = serde_json::from_str(&content)
        .with_context(|| format!("parsing report {}", cli.report.display()))?;

    let mut store = MemoryStore::load(&cli.db)?;

    let ctx = ImportContext {
        agent_id: cli.agent,
        group_id: cli.group,
        user_id: cli.user,
        job_id: cli.job,
    };

    let summary = import_and_save(&mut store, ctx, &config.import, &data, |store| {
        if cli.dry_run {
            Ok(())
        } else {
            store.save(&cli.db)
        }
    })
    .with_context(|| format!("importing {}", cli.report.display()))?;

    if cli.dry_run {
        if !cli.quiet {
            eprintln!("  {} dry run, {} not written", "→".cyan(), cli.db.display());
        }
    } else if !cli.quiet {
        eprintln!(
            "  {} {}: {} licenses, {} events, {} decisions, {} findings, {} copyrights",
            "→".cyan(),
            cli.db.display(),
            store.licenses().len(),
            store.events().len(),
            store.decisions().len(),
            store.findings().len(),
            store.copyrights().len(),
        );
    }

    match cli.summary_format {
        SummaryFormat::Terminal => {
            report::terminal::render(&summary, &cli.report, cli.verbose, cli.quiet)?;
        }
        SummaryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Run the import, then persist the store whether or not it succeeded.
///
/// Files already processed keep their writes when a later file fails; there
/// is no transaction spanning the report.
fn import_and_save<S, F>(
    store: &mut S,
    ctx: ImportContext,
    config: &ImportConfig,
    data: &ReportImportData,
    save: F,
) -> Result<ImportSummary>
where
    S: ImportStore,
    F: FnOnce(&S) -> Result<()>,
{
    let outcome = ReportImporter::new(&mut *store, ctx, config).import(data);
    save(store)?;
    Ok(outcome?)
}
