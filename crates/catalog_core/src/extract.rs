use std::sync::LazyLock;

use catalog_logging::catalog_debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{CourseRecord, RawBlock, RecordError};

// "ACCT 201A - Financial Accounting (3)" -> code, rest
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<code>[A-Z][A-Z&/]{1,7}\s+\d{1,4}[A-Z]{0,3})\s*[-\x{2013}\x{2014}:]\s*(?P<rest>\S.*)$")
        .expect("valid course header pattern")
});

// "Financial Accounting (1-3)"
static PAREN_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.*?)\s*\((?P<units>[^()]*)\)\s*$").expect("valid units pattern")
});

// "Financial Accounting, 3 units" / "Financial Accounting 1-3 units"
static TRAILING_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.*?)[,;\s]+(?P<units>\d+(?:\.\d+)?(?:\s*[-\x{2013}\x{2014}]\s*\d+(?:\.\d+)?)?)\s+units?\s*$",
    )
    .expect("valid trailing units pattern")
});

// "Units: 3" detail line
static UNITS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^units?\s*:\s*(?P<units>.+)$").expect("valid units line pattern")
});

static NUMERIC_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d+)?(?:-\d+(?:\.\d+)?)?$").expect("valid numeric units pattern")
});

/// A course block no rule could classify. Carried to the run summary instead
/// of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("unrecognized course block in {department:?}: {reason}")]
pub struct UnrecognizedBlock {
    pub department: String,
    pub course_id: Option<u64>,
    pub text: String,
    pub reason: String,
}

impl UnrecognizedBlock {
    fn new(block: &RawBlock, reason: impl Into<String>) -> Self {
        Self {
            department: block.department.clone(),
            course_id: block.course_id,
            text: block.text.clone(),
            reason: reason.into(),
        }
    }
}

/// Pattern-rule extraction of course records from raw blocks.
///
/// Stateless: extracting the same block twice yields equal records.
#[derive(Debug, Default, Clone, Copy)]
pub struct CourseExtractor;

impl CourseExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, block: &RawBlock) -> Result<CourseRecord, UnrecognizedBlock> {
        let header = collapse_whitespace(block.header());
        let caps = HEADER
            .captures(&header)
            .ok_or_else(|| UnrecognizedBlock::new(block, "header does not start with a course code"))?;
        let code = collapse_whitespace(&caps["code"]);
        let (title, header_units) = split_title_units(&caps["rest"]);

        let mut details = block.details();
        let description = details.next().unwrap_or_default();

        let mut record = CourseRecord::new(
            block.department.clone(),
            code.clone(),
            title,
            description,
            header_units,
        )
        .map_err(|err: RecordError| UnrecognizedBlock::new(block, err.to_string()))?;
        record.course_id = block.course_id;
        record.course_level = course_level(&code);

        for detail in details {
            classify_detail(&mut record, detail);
        }
        Ok(record)
    }
}

fn split_title_units(rest: &str) -> (String, Option<String>) {
    let rest = rest.trim();
    if let Some(caps) = PAREN_UNITS.captures(rest) {
        return (caps["title"].trim().to_string(), normalize_units(&caps["units"]));
    }
    if let Some(caps) = TRAILING_UNITS.captures(rest) {
        return (caps["title"].trim().to_string(), normalize_units(&caps["units"]));
    }
    (rest.to_string(), None)
}

fn classify_detail(record: &mut CourseRecord, detail: &str) {
    let lower = detail.to_lowercase();
    if lower.contains("requisite") || lower.starts_with("prereq") {
        record.prerequisites = Some(detail.to_string());
    } else if lower == "undergraduate course not available for graduate credit" {
        record.grad_credit = Some(false);
    } else if lower == "graduate-level"
        || lower == "400-level undergraduate course available for graduate credit"
    {
        record.grad_credit = Some(true);
    } else if lower == "one or more sections may be offered in any online format." {
        record.available_online = true;
    } else if lower == "department consent required" {
        record.requires_dept_consent = true;
    } else if lower.starts_with("typically offered") {
        let offered = detail.split_once(':').map_or("", |(_, rest)| rest).trim();
        record.typically_offered = Some(offered.to_string());
    } else if let Some(caps) = UNITS_LINE.captures(detail) {
        if record.units.is_none() {
            record.units = normalize_units(&caps["units"]);
        }
    } else {
        catalog_debug!("unknown detail in {}: {}", record.code, detail);
        record.notes.push(detail.to_string());
    }
}

/// Normalizes the three unit forms (single value, range, absent) to one
/// textual representation: `"3"`, `"1-3"`, or `None`.
pub fn normalize_units(raw: &str) -> Option<String> {
    let mut text = collapse_whitespace(raw);
    let lower = text.to_ascii_lowercase();
    if let Some(kept) = ["units", "unit"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
    {
        text.truncate(kept.len());
    }
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if matches!(c, '\u{2013}' | '\u{2014}') { '-' } else { c })
        .collect();
    if NUMERIC_UNITS.is_match(&compact) {
        Some(compact)
    } else {
        Some(text.to_string())
    }
}

/// Leading digits of the course number: "CPSC 10S" -> 10.
fn course_level(code: &str) -> Option<u32> {
    let number = code.split_whitespace().nth(1)?;
    let digits: String = number.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_forms_normalize() {
        assert_eq!(normalize_units("3").as_deref(), Some("3"));
        assert_eq!(normalize_units(" 1 - 3 units").as_deref(), Some("1-3"));
        assert_eq!(normalize_units("1\u{2013}3").as_deref(), Some("1-3"));
        assert_eq!(normalize_units("1.5 Units").as_deref(), Some("1.5"));
        assert_eq!(normalize_units("3 or 4").as_deref(), Some("3 or 4"));
        assert_eq!(normalize_units("  "), None);
        assert_eq!(normalize_units("units"), None);
    }

    #[test]
    fn course_level_reads_leading_digits() {
        assert_eq!(course_level("CPSC 10S"), Some(10));
        assert_eq!(course_level("ACCT 201A"), Some(201));
        assert_eq!(course_level("ACCT"), None);
    }

    #[test]
    fn title_units_split_prefers_parentheses() {
        assert_eq!(
            split_title_units("Financial Accounting (3)"),
            ("Financial Accounting".to_string(), Some("3".to_string()))
        );
        assert_eq!(
            split_title_units("Seminar, 1-3 units"),
            ("Seminar".to_string(), Some("1-3".to_string()))
        );
        assert_eq!(split_title_units("Seminar"), ("Seminar".to_string(), None));
    }
}
