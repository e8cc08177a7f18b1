//! Catalog engine: fetching, page parsing, the worker pool and persistence.
mod decode;
mod discover;
mod fetch;
mod parse;
mod persist;
mod pipeline;
mod pool;
mod reprocess;
mod types;

pub use decode::{decode_page, DecodeError};
pub use discover::{discover, discover_tasks, last_page, CatalogSite, Discovery, SetupError};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use parse::{PageParser, PageParserConfig, ParseError, ParsedPage};
pub use persist::{ensure_output_dir, read_json, write_json, AtomicFileWriter, PersistError};
pub use pipeline::{
    scrape_catalog, write_scrape_outputs, OutputPaths, CATALOG_FILENAME, RAW_FILENAME,
};
pub use pool::{extract_page, WorkerPool};
pub use reprocess::{clean_catalog_file, reprocess_file, CleanReport, ReprocessReport, Reprocessor};
pub use types::{
    FailureKind, FetchError, FetchOutput, MalformedPage, PageFailure, PageOutput, ScrapeReport,
};
