use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;

use catalog_core::{describe_char, UnrecognizedBlock};
use catalog_engine::{CleanReport, OutputPaths, ReprocessReport, ScrapeReport};

/// First line of an unrecognized block, which is what a reader needs to find
/// it in the catalog.
fn block_label(block: &UnrecognizedBlock) -> &str {
    block.text.lines().next().unwrap_or("").trim()
}

fn write_unrecognized(out: &mut impl Write, blocks: &[UnrecognizedBlock]) -> io::Result<()> {
    if blocks.is_empty() {
        return Ok(());
    }
    writeln!(out, "Unrecognized blocks:")?;
    for block in blocks {
        writeln!(
            out,
            "  [{}] {} ({})",
            block.department,
            block_label(block),
            block.reason
        )?;
    }
    Ok(())
}

fn write_unknown_chars(out: &mut impl Write, unknown: &BTreeSet<char>) -> io::Result<()> {
    if unknown.is_empty() {
        return Ok(());
    }
    writeln!(out, "Characters not in the cleanup table:")?;
    for ch in unknown {
        writeln!(out, "  {}", describe_char(*ch))?;
    }
    Ok(())
}

pub fn write_scrape_summary(
    out: &mut impl Write,
    report: &ScrapeReport,
    paths: &OutputPaths,
) -> io::Result<()> {
    let progress = report.progress;
    writeln!(
        out,
        "Pages: {} total, {} completed, {} failed",
        progress.total, progress.completed, progress.failed
    )?;
    writeln!(
        out,
        "Courses: {} in {} departments",
        report.catalog.len(),
        report.catalog.departments().len()
    )?;
    writeln!(out, "Raw blocks: {} -> {}", report.raw_blocks.len(), paths.raw.display())?;
    writeln!(out, "Catalog: {}", paths.catalog.display())?;

    if !report.failures.is_empty() {
        writeln!(out, "Failed pages:")?;
        for failure in &report.failures {
            writeln!(out, "  {} ({})", failure.url, failure.error)?;
        }
    }
    if !report.malformed.is_empty() {
        writeln!(out, "Malformed pages:")?;
        for page in &report.malformed {
            writeln!(out, "  {} ({})", page.url, page.error)?;
        }
    }
    write_unrecognized(out, &report.unrecognized)
}

pub fn write_reprocess_summary(
    out: &mut impl Write,
    report: &ReprocessReport,
    output: &Path,
) -> io::Result<()> {
    writeln!(
        out,
        "Blocks: {} total, {} extracted, {} unrecognized",
        report.progress.total, report.progress.completed, report.progress.failed
    )?;
    writeln!(
        out,
        "Courses: {} in {} departments -> {}",
        report.catalog.len(),
        report.catalog.departments().len(),
        output.display()
    )?;
    write_unrecognized(out, &report.unrecognized)?;
    write_unknown_chars(out, &report.unknown_chars)
}

pub fn write_clean_summary(
    out: &mut impl Write,
    report: &CleanReport,
    output: &Path,
) -> io::Result<()> {
    writeln!(
        out,
        "Cleaned {} courses -> {}",
        report.records.len(),
        output.display()
    )?;
    write_unknown_chars(out, &report.unknown_chars)
}
