use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_app::platform::{
    init_logging, load_settings, write_clean_summary, write_reprocess_summary, BarProgressSink,
};
use catalog_engine::{clean_catalog_file, reprocess_file, Reprocessor};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "catalog_reprocess",
    version,
    about = "Rebuild the catalog from previously scraped raw blocks, without the network"
)]
struct Cli {
    /// Input file; raw blocks, or a structured catalog with --clean-only
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Where to write the structured catalog
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Only apply the character cleanup to an existing catalog file
    #[arg(long)]
    clean_only: bool,
    /// RON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// -v for debug output, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(cli.log_file.or(settings.log_file.clone()), cli.verbose);

    let sink = Arc::new(BarProgressSink::new(if cli.clean_only {
        "courses"
    } else {
        "blocks"
    }));
    let reprocessor = Reprocessor::new(settings.cleaner()).with_sink(sink.clone());

    if cli.clean_only {
        let input = cli.input.unwrap_or_else(|| settings.catalog_path());
        let output = cli
            .output
            .unwrap_or_else(|| input.with_file_name("catalog_clean.json"));
        let report = clean_catalog_file(&reprocessor, &input, &output)
            .with_context(|| format!("cleaning {input:?}"))?;
        sink.finish();
        write_clean_summary(&mut io::stdout().lock(), &report, &output)?;
    } else {
        let input = cli.input.unwrap_or_else(|| settings.raw_path());
        let output = cli.output.unwrap_or_else(|| settings.catalog_path());
        let report = reprocess_file(&reprocessor, &input, &output)
            .with_context(|| format!("reprocessing {input:?}"))?;
        sink.finish();
        write_reprocess_summary(&mut io::stdout().lock(), &report, &output)?;
    }
    Ok(())
}
