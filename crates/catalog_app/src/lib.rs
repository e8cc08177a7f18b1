//! Command line front end for the catalog scraper: settings, progress bars and
//! run summaries shared by the `catalog_scrape` and `catalog_reprocess`
//! binaries.
pub mod platform;
