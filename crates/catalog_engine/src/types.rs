use std::fmt;

use catalog_core::{CatalogResult, CourseRecord, ProgressState, RawBlock, UnrecognizedBlock};

use crate::parse::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub final_url: String,
    pub content_type: Option<String>,
}

/// Per-page fetch failure. Never fatal to sibling pages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Undecodable,
    Cancelled,
    ProcessingError,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Undecodable => write!(f, "undecodable body"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::ProcessingError => write!(f, "processing error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A page that produced no courses, with its URL kept for a manual re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub error: FetchError,
}

/// A page whose markup did not have the expected structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedPage {
    pub url: String,
    pub error: ParseError,
}

/// What one worker produced for one successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageOutput {
    pub raw_blocks: Vec<RawBlock>,
    pub records: Vec<CourseRecord>,
    pub unrecognized: Vec<UnrecognizedBlock>,
    pub problems: Vec<ParseError>,
}

/// Everything a scrape run produced, merged in task order.
#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub catalog: CatalogResult,
    pub raw_blocks: Vec<RawBlock>,
    pub unrecognized: Vec<UnrecognizedBlock>,
    pub failures: Vec<PageFailure>,
    pub malformed: Vec<MalformedPage>,
    pub progress: ProgressState,
}
