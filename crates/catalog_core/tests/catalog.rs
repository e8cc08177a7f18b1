use catalog_core::{CatalogResult, CourseRecord};
use pretty_assertions::assert_eq;

fn course(department: &str, code: &str) -> CourseRecord {
    CourseRecord::new(department, code, "Title", "Description", Some("3".into())).unwrap()
}

#[test]
fn departments_keep_first_appearance_order() {
    let catalog: CatalogResult = vec![
        course("Math", "MATH 150A"),
        course("Art", "ART 101"),
        course("Math", "MATH 150B"),
        course("Biology", "BIOL 101"),
        course("Art", "ART 102"),
    ]
    .into_iter()
    .collect();

    let names: Vec<_> = catalog
        .departments()
        .iter()
        .map(|d| d.department.as_str())
        .collect();
    assert_eq!(names, vec!["Math", "Art", "Biology"]);

    let math: Vec<_> = catalog
        .department("Math")
        .unwrap()
        .iter()
        .map(|c| c.code.as_str())
        .collect();
    assert_eq!(math, vec!["MATH 150A", "MATH 150B"]);
    assert_eq!(catalog.len(), 5);
}

#[test]
fn records_are_flattened_department_by_department() {
    let mut catalog = CatalogResult::new();
    assert!(catalog.is_empty());
    catalog.extend([course("B", "B 1"), course("A", "A 1"), course("B", "B 2")]);
    let codes: Vec<_> = catalog.into_records().into_iter().map(|c| c.code).collect();
    assert_eq!(codes, vec!["B 1", "B 2", "A 1"]);
}

#[test]
fn record_serializes_with_nullable_units() {
    let record = CourseRecord::new("Math", "MATH 499", "Study", "", None).unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["units"], serde_json::Value::Null);
    assert_eq!(json["department"], "Math");
    assert_eq!(json["code"], "MATH 499");
    assert!(json.get("notes").is_none());
}
