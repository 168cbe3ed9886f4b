use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::{ImportSummary, LicenseOrigin, ResolvedLicense};

/// Render a colored terminal summary of one import run.
pub fn render(summary: &ImportSummary, report: &Path, verbose: bool, quiet: bool) -> Result<()> {
    let created = summary.created().count();
    let reused = summary.reused().count();
    let unresolved = summary.unresolved.len();

    if quiet {
        println!(
            "Files: {}  Findings: {}  Decisions: {}  Created: {}  Unresolved: {}",
            summary.files,
            summary.findings,
            summary.decisions,
            created.to_string().green(),
            unresolved.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "report-importr".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Importing: {}\n", report.display());

    if summary.files == 0 {
        println!(" {} Report names no files, nothing imported.\n", "[SKIP]".dimmed());
        return Ok(());
    }

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("Files                : {}", summary.files));
    println!(" │  {:<48} │", format!("License findings     : {}", summary.findings));
    println!(
        " │  {:<48} │",
        format!(
            "Decisions            : {} (+{} / -{})",
            summary.decisions, summary.add_events, summary.remove_events
        )
    );
    println!(
        " │  {:<48} │",
        format!("Copyright statements : {}", summary.copyright_statements)
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Licenses reused   : {:>4}",
            "✓".green(),
            reused
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Licenses created  : {:>4}",
            "+".cyan(),
            created
        )
    );
    println!(
        " │  {:<48} │",
        format!(
            "{}  Unresolved        : {:>4}",
            "⚠".yellow(),
            unresolved
        )
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if created > 0 {
        println!(" {} Licenses created by this import:\n", "[NEW]".cyan().bold());
        render_table(summary.created());
        println!();
    }

    if unresolved > 0 {
        println!(
            " {} Identifiers without a license or definition (skipped): {}\n",
            "[WARN]".yellow().bold(),
            summary.unresolved.join(", ")
        );
    }

    if verbose && reused > 0 {
        println!(" {} Existing licenses:\n", "[OK]".green().bold());
        render_table(summary.reused());
        println!();
    }

    Ok(())
}

fn render_table<'a>(licenses: impl Iterator<Item = &'a ResolvedLicense>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Short name").add_attribute(Attribute::Bold),
            Cell::new("Id").add_attribute(Attribute::Bold),
            Cell::new("Created as").add_attribute(Attribute::Bold),
        ]);

    for license in licenses {
        let origin_color = match license.origin {
            LicenseOrigin::Existing => Color::Green,
            LicenseOrigin::CreatedCandidate => Color::Yellow,
            LicenseOrigin::CreatedFinal => Color::Cyan,
        };

        table.add_row(vec![
            Cell::new(&license.short_name),
            Cell::new(license.id.to_string()).set_alignment(CellAlignment::Right),
            Cell::new(license.origin.to_string()).fg(origin_color),
        ]);
    }

    println!("{}", table);
}
