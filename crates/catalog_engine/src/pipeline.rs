use std::path::{Path, PathBuf};

use catalog_core::CourseRecord;
use catalog_logging::catalog_info;

use crate::discover::{discover, CatalogSite, SetupError};
use crate::persist::{write_json, PersistError};
use crate::pool::WorkerPool;
use crate::ScrapeReport;

pub const RAW_FILENAME: &str = "raw_catalog.json";
pub const CATALOG_FILENAME: &str = "catalog.json";

/// Discovers the page list and runs it through `pool`. Only a failure to
/// build the page list is an error; page failures end up in the report.
/// The first page, when fetched for its pager, is reused rather than
/// requested again.
pub async fn scrape_catalog(
    pool: &WorkerPool,
    site: &CatalogSite,
    concurrency: usize,
) -> Result<ScrapeReport, SetupError> {
    let discovery = discover(pool.fetcher(), site).await?;
    let prefetched = discovery.index.into_iter().collect();
    Ok(pool.run_prefetched(discovery.tasks, concurrency, prefetched).await)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub raw: PathBuf,
    pub catalog: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            raw: dir.join(RAW_FILENAME),
            catalog: dir.join(CATALOG_FILENAME),
        }
    }
}

/// Persists the raw intermediate blocks and the structured catalog.
pub fn write_scrape_outputs(report: &ScrapeReport, paths: &OutputPaths) -> Result<(), PersistError> {
    write_json(&paths.raw, &report.raw_blocks)?;
    let records: Vec<&CourseRecord> = report.catalog.records().collect();
    write_json(&paths.catalog, &records)?;
    catalog_info!(
        "Saved {} raw blocks to {:?} and {} courses to {:?}",
        report.raw_blocks.len(),
        paths.raw,
        records.len(),
        paths.catalog
    );
    Ok(())
}
