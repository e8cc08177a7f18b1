use std::fs;

use catalog_core::{CourseRecord, RawBlock};
use catalog_engine::{ensure_output_dir, read_json, write_json, AtomicFileWriter, PersistError};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path());

    let first = writer.write("catalog.json", "[]").unwrap();
    assert_eq!(first.file_name().unwrap(), "catalog.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "[]");

    let second = writer.write("catalog.json", "[1]").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "[1]");
}

#[test]
fn no_partial_file_when_target_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = AtomicFileWriter::new(file_path.clone()).write("catalog.json", "[]");
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!file_path.with_file_name("catalog.json").exists());
}

#[test]
fn records_survive_a_json_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("catalog.json");
    let mut record = CourseRecord::new(
        "Computer Science",
        "CPSC 121",
        "Object-Oriented Programming",
        "Classes and objects.",
        None,
    )
    .unwrap();
    record.course_id = Some(102);

    write_json(&path, &[record.clone()]).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"units\": null"));

    let loaded: Vec<CourseRecord> = read_json(&path).unwrap();
    assert_eq!(loaded, vec![record]);
}

#[test]
fn unreadable_json_names_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("raw_catalog.json");
    fs::write(&path, "{ not json").unwrap();

    let err = read_json::<Vec<RawBlock>>(&path).unwrap_err();
    match err {
        PersistError::Json { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other:?}"),
    }
}
