use std::collections::HashMap;

use crate::model::CourseRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentCourses {
    pub department: String,
    pub courses: Vec<CourseRecord>,
}

/// Course records grouped by department. Departments keep the order in which
/// they first appeared; courses keep insertion order within a department.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogResult {
    departments: Vec<DepartmentCourses>,
    index: HashMap<String, usize>,
}

impl CatalogResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CourseRecord) {
        if let Some(&slot) = self.index.get(&record.department) {
            self.departments[slot].courses.push(record);
            return;
        }
        self.index
            .insert(record.department.clone(), self.departments.len());
        self.departments.push(DepartmentCourses {
            department: record.department.clone(),
            courses: vec![record],
        });
    }

    pub fn departments(&self) -> &[DepartmentCourses] {
        &self.departments
    }

    pub fn department(&self, name: &str) -> Option<&[CourseRecord]> {
        self.index
            .get(name)
            .map(|&slot| self.departments[slot].courses.as_slice())
    }

    pub fn len(&self) -> usize {
        self.departments.iter().map(|d| d.courses.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    /// All records, department by department.
    pub fn records(&self) -> impl Iterator<Item = &CourseRecord> {
        self.departments.iter().flat_map(|d| d.courses.iter())
    }

    pub fn into_records(self) -> Vec<CourseRecord> {
        self.departments
            .into_iter()
            .flat_map(|d| d.courses)
            .collect()
    }
}

impl FromIterator<CourseRecord> for CatalogResult {
    fn from_iter<I: IntoIterator<Item = CourseRecord>>(iter: I) -> Self {
        let mut catalog = Self::new();
        catalog.extend(iter);
        catalog
    }
}

impl Extend<CourseRecord> for CatalogResult {
    fn extend<I: IntoIterator<Item = CourseRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}
