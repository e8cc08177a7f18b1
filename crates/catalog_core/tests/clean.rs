use catalog_core::{CourseRecord, UnicodeCleaner, REPLACEMENTS};

#[test]
fn every_table_entry_maps_to_its_ascii_form() {
    let cleaner = UnicodeCleaner::default();
    for (from, to) in REPLACEMENTS {
        let cleaned = cleaner.clean(&format!("x{from}y"));
        assert_eq!(cleaned.text, format!("x{to}y"), "entry {from:?}");
        assert!(cleaned.text.is_ascii());
        assert!(cleaned.unknown.is_empty());
    }
}

#[test]
fn plain_ascii_is_unchanged() {
    let text = "CPSC 120 - Introduction to Programming (3)\n\"quoted\" it's";
    let cleaned = UnicodeCleaner::default().clean(text);
    assert_eq!(cleaned.text, text);
    assert!(cleaned.unknown.is_empty());
}

#[test]
fn unknown_characters_pass_through_and_are_reported() {
    let cleaned = UnicodeCleaner::default().clean("caf\u{e8} \u{2014} na\u{ef}ve\u{a0}x");
    assert_eq!(cleaned.text, "caf\u{e8} \u{2014} na\u{ef}ve x");
    assert_eq!(
        cleaned.unknown.into_iter().collect::<Vec<_>>(),
        vec!['\u{e8}', '\u{ef}', '\u{2014}']
    );
}

#[test]
fn record_text_fields_can_be_cleaned() {
    let cleaner = UnicodeCleaner::default();
    let mut record = CourseRecord::new(
        "Espa\u{f1}ol",
        "SPAN 101",
        "Beginning Spanish\u{a0}I",
        "Students\u{2019} first course",
        Some("4".into()),
    )
    .unwrap();
    record.prerequisites = Some("None \u{2013} open".into());

    let cleaned = record.map_text(|text| cleaner.clean(text).text);
    assert_eq!(cleaned.title, "Beginning Spanish I");
    assert_eq!(cleaned.description, "Students' first course");
    assert_eq!(cleaned.prerequisites.as_deref(), Some("None - open"));
    // identity fields are not rewritten
    assert_eq!(cleaned.department, "Espa\u{f1}ol");
}
