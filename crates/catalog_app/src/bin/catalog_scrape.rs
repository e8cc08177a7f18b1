use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_app::platform::{init_logging, load_settings, write_scrape_summary, BarProgressSink};
use catalog_engine::{
    ensure_output_dir, scrape_catalog, write_scrape_outputs, OutputPaths, PageParser,
    ReqwestFetcher, WorkerPool,
};
use catalog_logging::{catalog_info, catalog_warn};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(
    name = "catalog_scrape",
    version,
    about = "Fetch every course listing page and write the catalog as JSON"
)]
struct Cli {
    /// Pages fetched at the same time
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,
    /// Directory for raw_catalog.json and catalog.json
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// RON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Scrape exactly this many pages instead of reading the pager
    #[arg(long)]
    pages: Option<u32>,
    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// -v for debug output, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(concurrency) = cli.concurrency {
        settings.concurrency = concurrency;
    }
    if let Some(output) = cli.output {
        settings.output_dir = output;
    }
    if let Some(pages) = cli.pages {
        settings.site.page_count = Some(pages);
    }
    init_logging(cli.log_file.or(settings.log_file.clone()), cli.verbose);

    ensure_output_dir(&settings.output_dir)
        .with_context(|| format!("preparing output directory {:?}", settings.output_dir))?;
    let fetcher = ReqwestFetcher::new(settings.fetch.to_settings())
        .context("building the HTTP client")?;

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            catalog_warn!("Interrupted; remaining pages will be reported as cancelled");
            on_signal.cancel();
        }
    });

    let sink = Arc::new(BarProgressSink::new("pages"));
    let pool = WorkerPool::new(Arc::new(fetcher), PageParser::new(settings.parser.clone()))
        .with_sink(sink.clone())
        .with_shutdown(shutdown);

    catalog_info!(
        "Scraping catalog {} (catoid {}, navoid {})",
        settings.site.base_url,
        settings.site.catoid,
        settings.site.navoid
    );
    let report = scrape_catalog(&pool, &settings.site, settings.concurrency)
        .await
        .context("could not build the list of catalog pages")?;
    sink.finish();

    let paths = OutputPaths {
        raw: settings.raw_path(),
        catalog: settings.catalog_path(),
    };
    write_scrape_outputs(&report, &paths).context("writing catalog output")?;
    write_scrape_summary(&mut io::stdout().lock(), &report, &paths)?;
    Ok(())
}
