mod common;

use catalog_core::{CourseExtractor, PageTask};
use catalog_engine::{extract_page, PageParser, PageParserConfig, ParseError};
use pretty_assertions::assert_eq;

use common::{continuation_page, CS_PAGE};

#[test]
fn sections_tag_following_course_blocks() {
    let parsed = PageParser::default().parse(CS_PAGE, None);

    assert!(parsed.problems.is_empty());
    assert_eq!(parsed.department.as_deref(), Some("Computer Science"));
    let tagged: Vec<(&str, &str)> = parsed
        .blocks
        .iter()
        .map(|block| (block.department.as_str(), block.header()))
        .collect();
    assert_eq!(
        tagged,
        vec![
            (
                "Computer Science",
                "CPSC 120 - Introduction to Programming (3)"
            ),
            (
                "Computer Science",
                "CPSC 121 - Object-Oriented Programming (1-3 units)"
            ),
            ("Mathematics", "MATH 150A - Calculus I (4)"),
        ]
    );
    assert_eq!(parsed.blocks[0].course_id, None);
    assert_eq!(parsed.blocks[1].course_id, Some(102));
    assert_eq!(
        parsed.blocks[0].details().collect::<Vec<_>>(),
        vec![
            "Fundamental concepts of programming.",
            "Prerequisite: MATH 125.",
            "Typically Offered: Fall, Spring",
        ]
    );
}

#[test]
fn prerequisite_link_is_not_the_course_id() {
    let html = r#"<table class="table_default">
        <tr><td><p><strong>Accounting</strong></p></td></tr>
        <tr><td></td><td>
          <h3>ACCT 301A - Intermediate Accounting (3)</h3><hr>Theory.<br>
          Prerequisites: <a href="preview_course_nopop.php?catoid=95&coid=537360">ACCT 201A</a>
        </td></tr>
    </table>"#;
    let parsed = PageParser::default().parse(html, None);

    assert_eq!(parsed.blocks.len(), 1);
    assert_eq!(parsed.blocks[0].course_id, None);
    assert_eq!(
        parsed.blocks[0].details().collect::<Vec<_>>(),
        vec!["Theory.", "Prerequisites: ACCT 201A"]
    );
}

#[test]
fn page_extracts_fixed_and_variable_units() {
    let output = extract_page(
        &PageParser::default(),
        &CourseExtractor::new(),
        &PageTask::new("page-1"),
        CS_PAGE,
    );

    assert!(output.unrecognized.is_empty());
    let units: Vec<(&str, Option<&str>)> = output
        .records
        .iter()
        .map(|record| (record.code.as_str(), record.units.as_deref()))
        .collect();
    assert_eq!(
        units,
        vec![
            ("CPSC 120", Some("3")),
            ("CPSC 121", Some("1-3")),
            ("MATH 150A", Some("4")),
        ]
    );
    let intro = &output.records[0];
    assert_eq!(intro.prerequisites.as_deref(), Some("Prerequisite: MATH 125."));
    assert_eq!(intro.typically_offered.as_deref(), Some("Fall, Spring"));
    assert!(output.records[1].available_online);
}

#[test]
fn hint_covers_blocks_before_first_section() {
    let html = continuation_page("BIOL 102", "Genetics");

    let parsed = PageParser::default().parse(&html, Some("Biology"));
    assert_eq!(parsed.department.as_deref(), Some("Biology"));
    assert_eq!(parsed.blocks[0].department, "Biology");

    let unhinted = PageParser::default().parse(&html, None);
    assert_eq!(unhinted.department, None);
    assert!(!unhinted.blocks[0].has_department());
}

#[test]
fn missing_course_table_is_reported_not_fatal() {
    let parsed = PageParser::default().parse("<html><body><p>Maintenance</p></body></html>", None);
    assert!(parsed.blocks.is_empty());
    assert_eq!(
        parsed.problems,
        vec![ParseError::MissingCourseTable {
            selector: "table.table_default".to_string()
        }]
    );
}

#[test]
fn table_without_course_rows_yields_nothing() {
    let html = r#"<table class="table_default"><tr><td><p><strong>Art</strong></p></td></tr></table>"#;
    let parsed = PageParser::default().parse(html, None);
    assert!(parsed.problems.is_empty());
    assert!(parsed.blocks.is_empty());
    assert_eq!(parsed.department.as_deref(), Some("Art"));
}

#[test]
fn invalid_selector_is_a_page_problem() {
    let parser = PageParser::new(PageParserConfig {
        course_table_selector: "table[".to_string(),
        ..PageParserConfig::default()
    });
    let parsed = parser.parse(CS_PAGE, None);
    assert!(matches!(
        parsed.problems.as_slice(),
        [ParseError::InvalidSelector { .. }]
    ));
}

#[test]
fn cell_without_header_is_flagged_by_extractor() {
    let html = r#"<table class="table_default">
        <tr><td><p><strong>Art</strong></p></td></tr>
        <tr><td></td><td>See the department office for studio hours.</td></tr>
    </table>"#;
    let output = extract_page(
        &PageParser::default(),
        &CourseExtractor::new(),
        &PageTask::new("page-2"),
        html,
    );
    assert!(output.records.is_empty());
    assert_eq!(output.unrecognized.len(), 1);
    assert_eq!(output.unrecognized[0].department, "Art");
    assert_eq!(output.raw_blocks.len(), 1);
}
