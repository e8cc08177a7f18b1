use serde::{Deserialize, Serialize};

/// Department label used when neither the page nor the run can name one.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// One catalog page to fetch. Built once when the task list is assembled and
/// consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    pub url: String,
    pub department_hint: Option<String>,
}

impl PageTask {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            department_hint: None,
        }
    }

    pub fn with_hint(url: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            department_hint: Some(hint.into()),
        }
    }
}

/// Unparsed text of one course entry: the header line followed by one line per
/// detail segment. This is also the shape of the intermediate file written
/// between the scrape and reprocess stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
    pub text: String,
}

impl RawBlock {
    pub fn new(department: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            course_id: None,
            text: text.into(),
        }
    }

    /// Builds the block text from a header and its detail segments.
    pub fn from_parts<'a>(
        department: impl Into<String>,
        course_id: Option<u64>,
        header: &str,
        details: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut text = header.trim().to_string();
        for detail in details {
            let detail = detail.trim();
            if detail.is_empty() {
                continue;
            }
            text.push('\n');
            text.push_str(detail);
        }
        Self {
            department: department.into(),
            course_id,
            text,
        }
    }

    pub fn header(&self) -> &str {
        self.text.lines().next().unwrap_or("").trim()
    }

    pub fn details(&self) -> impl Iterator<Item = &str> {
        self.text
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|line| !line.is_empty())
    }

    pub fn has_department(&self) -> bool {
        !self.department.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("course code is empty")]
    MissingCode,
    #[error("course title is empty for {code}")]
    MissingTitle { code: String },
}

/// A structured course entry. Optional fields are `None` when the catalog did
/// not state them; nothing is inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub department: String,
    pub code: String,
    pub title: String,
    pub description: String,
    pub units: Option<String>,
    #[serde(default)]
    pub course_id: Option<u64>,
    #[serde(default)]
    pub course_level: Option<u32>,
    #[serde(default)]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub grad_credit: Option<bool>,
    #[serde(default)]
    pub available_online: bool,
    #[serde(default)]
    pub requires_dept_consent: bool,
    #[serde(default)]
    pub typically_offered: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl CourseRecord {
    /// Creates a record with only the required fields set. Code and title must
    /// be non-empty; the department may still be blank and filled in later.
    pub fn new(
        department: impl Into<String>,
        code: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        units: Option<String>,
    ) -> Result<Self, RecordError> {
        let code = code.into().trim().to_string();
        if code.is_empty() {
            return Err(RecordError::MissingCode);
        }
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(RecordError::MissingTitle { code });
        }
        Ok(Self {
            department: department.into().trim().to_string(),
            code,
            title,
            description: description.into().trim().to_string(),
            units,
            course_id: None,
            course_level: None,
            prerequisites: None,
            grad_credit: None,
            available_online: false,
            requires_dept_consent: false,
            typically_offered: None,
            notes: Vec::new(),
        })
    }

    /// Returns a copy of this record filed under `department`.
    pub fn with_department(&self, department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with `f` applied to every free-text field.
    pub fn map_text(&self, mut f: impl FnMut(&str) -> String) -> Self {
        Self {
            title: f(&self.title),
            description: f(&self.description),
            prerequisites: self.prerequisites.as_deref().map(&mut f),
            typically_offered: self.typically_offered.as_deref().map(&mut f),
            notes: self.notes.iter().map(|note| f(note)).collect(),
            ..self.clone()
        }
    }
}
