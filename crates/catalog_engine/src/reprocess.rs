use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use catalog_core::{
    describe_char, CatalogResult, CourseExtractor, CourseRecord, NullProgressSink,
    ProgressAggregator, ProgressEvent, ProgressSink, ProgressState, RawBlock, UnicodeCleaner,
    UnrecognizedBlock,
};
use catalog_logging::{catalog_info, catalog_warn};

use crate::persist::{read_json, write_json, PersistError};

#[derive(Debug, Clone, Default)]
pub struct ReprocessReport {
    pub catalog: CatalogResult,
    pub unrecognized: Vec<UnrecognizedBlock>,
    pub unknown_chars: BTreeSet<char>,
    pub progress: ProgressState,
}

#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub records: Vec<CourseRecord>,
    pub unknown_chars: BTreeSet<char>,
    pub progress: ProgressState,
}

/// Second stage: re-runs cleanup and extraction over previously scraped raw
/// blocks without touching the network.
pub struct Reprocessor {
    extractor: CourseExtractor,
    cleaner: UnicodeCleaner,
    sink: Arc<dyn ProgressSink>,
}

impl Default for Reprocessor {
    fn default() -> Self {
        Self::new(UnicodeCleaner::default())
    }
}

impl Reprocessor {
    pub fn new(cleaner: UnicodeCleaner) -> Self {
        Self {
            extractor: CourseExtractor::new(),
            cleaner,
            sink: Arc::new(NullProgressSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn run(&self, blocks: &[RawBlock]) -> ReprocessReport {
        let aggregator = ProgressAggregator::new(blocks.len());
        self.sink.update(aggregator.snapshot());
        let mut report = ReprocessReport::default();

        for block in blocks {
            let cleaned = self.cleaner.clean(&block.text);
            report.unknown_chars.extend(cleaned.unknown);
            let block = RawBlock {
                text: cleaned.text,
                ..block.clone()
            };

            let event = match self.extractor.extract(&block) {
                Ok(record) => {
                    report.catalog.push(record);
                    ProgressEvent::Completed
                }
                Err(unrecognized) => {
                    catalog_warn!("{}", unrecognized);
                    report.unrecognized.push(unrecognized);
                    ProgressEvent::Failed
                }
            };
            aggregator.report_to(event, self.sink.as_ref());
        }

        log_unknown(&report.unknown_chars);
        report.progress = aggregator.snapshot();
        report
    }

    /// Applies the cleaner to every text field of already structured records.
    pub fn clean_records(&self, records: &[CourseRecord]) -> CleanReport {
        let aggregator = ProgressAggregator::new(records.len());
        self.sink.update(aggregator.snapshot());
        let mut report = CleanReport::default();

        for record in records {
            let cleaned = record.map_text(|text| {
                let cleaned = self.cleaner.clean(text);
                report.unknown_chars.extend(cleaned.unknown);
                cleaned.text
            });
            report.records.push(cleaned);
            aggregator.report_to(ProgressEvent::Completed, self.sink.as_ref());
        }

        log_unknown(&report.unknown_chars);
        report.progress = aggregator.snapshot();
        report
    }
}

fn log_unknown(unknown: &BTreeSet<char>) {
    if unknown.is_empty() {
        return;
    }
    catalog_warn!("Characters not in the replacement table:");
    for ch in unknown {
        catalog_warn!("{}", describe_char(*ch));
    }
}

/// Reads a raw block file, reprocesses it and writes the structured catalog.
pub fn reprocess_file(
    reprocessor: &Reprocessor,
    input: &Path,
    output: &Path,
) -> Result<ReprocessReport, PersistError> {
    let blocks: Vec<RawBlock> = read_json(input)?;
    catalog_info!("Loaded {} raw blocks from {:?}", blocks.len(), input);
    let report = reprocessor.run(&blocks);
    let records: Vec<&CourseRecord> = report.catalog.records().collect();
    write_json(output, &records)?;
    catalog_info!("Wrote {} courses to {:?}", records.len(), output);
    Ok(report)
}

/// Reads a structured catalog file and writes a cleaned copy.
pub fn clean_catalog_file(
    reprocessor: &Reprocessor,
    input: &Path,
    output: &Path,
) -> Result<CleanReport, PersistError> {
    let records: Vec<CourseRecord> = read_json(input)?;
    catalog_info!("Loaded {} courses from {:?}", records.len(), input);
    let report = reprocessor.clean_records(&records);
    write_json(output, &report.records)?;
    catalog_info!("Wrote {} courses to {:?}", report.records.len(), output);
    Ok(report)
}
