//! Catalog core: course data model, extraction rules, text cleanup and
//! progress accounting. Pure; no IO.
mod catalog;
mod clean;
mod extract;
mod model;
mod progress;

pub use catalog::{CatalogResult, DepartmentCourses};
pub use clean::{describe_char, Cleaned, UnicodeCleaner, REPLACEMENTS};
pub use extract::{normalize_units, CourseExtractor, UnrecognizedBlock};
pub use model::{CourseRecord, PageTask, RawBlock, RecordError, UNASSIGNED_DEPARTMENT};
pub use progress::{
    NullProgressSink, ProgressAggregator, ProgressEvent, ProgressSink, ProgressState,
};
