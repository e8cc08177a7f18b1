use std::collections::BTreeMap;

use catalog_core::RawBlock;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Elements whose content starts a new run of text inside a course cell.
const BLOCK_ELEMENTS: &[&str] = &["p", "div", "ul", "ol", "li", "table", "h4", "h5", "h6"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParserConfig {
    /// The last element matching this selector is the course table.
    pub course_table_selector: String,
    /// Section header text -> canonical department name.
    pub department_aliases: BTreeMap<String, String>,
}

impl Default for PageParserConfig {
    fn default() -> Self {
        Self {
            course_table_selector: "table.table_default".to_string(),
            department_aliases: BTreeMap::new(),
        }
    }
}

/// Malformed page structure. Per page and non-fatal: the page yields no blocks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no course table matching `{selector}`")]
    MissingCourseTable { selector: String },
    #[error("invalid course table selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPage {
    /// First section header on the page, else the department hint.
    pub department: Option<String>,
    pub blocks: Vec<RawBlock>,
    pub problems: Vec<ParseError>,
}

/// Splits one catalog page into department-tagged raw course blocks.
#[derive(Debug, Clone, Default)]
pub struct PageParser {
    config: PageParserConfig,
}

impl PageParser {
    pub fn new(config: PageParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PageParserConfig {
        &self.config
    }

    pub fn parse(&self, html: &str, department_hint: Option<&str>) -> ParsedPage {
        let hint = department_hint
            .map(|hint| self.canonical_department(hint))
            .filter(|hint| !hint.is_empty());
        let selector_text = &self.config.course_table_selector;

        let table_selector = match Selector::parse(selector_text) {
            Ok(selector) => selector,
            Err(err) => {
                return ParsedPage::failed(
                    hint,
                    ParseError::InvalidSelector {
                        selector: selector_text.clone(),
                        message: err.to_string(),
                    },
                )
            }
        };

        let document = Html::parse_document(html);
        let Some(table) = document.select(&table_selector).last() else {
            return ParsedPage::failed(
                hint,
                ParseError::MissingCourseTable {
                    selector: selector_text.clone(),
                },
            );
        };

        let mut page_department: Option<String> = None;
        let mut current = hint.clone().unwrap_or_default();
        let mut blocks = Vec::new();

        for row in elements_named(*table, "tr") {
            let cells: Vec<ElementRef> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| cell.value().name() == "td")
                .collect();
            match cells.as_slice() {
                [single] => {
                    if let Some(header) = section_header(*single) {
                        let name = self.canonical_department(&header);
                        page_department.get_or_insert_with(|| name.clone());
                        current = name;
                    }
                }
                [_, course] => blocks.push(course_block(*course, &current)),
                _ => {}
            }
        }

        ParsedPage {
            department: page_department.or(hint),
            blocks,
            problems: Vec::new(),
        }
    }

    fn canonical_department(&self, raw: &str) -> String {
        let name = collapse_whitespace(raw);
        match self.config.department_aliases.get(&name) {
            Some(alias) => alias.clone(),
            None => name,
        }
    }
}

impl ParsedPage {
    fn failed(department: Option<String>, problem: ParseError) -> Self {
        Self {
            department,
            blocks: Vec::new(),
            problems: vec![problem],
        }
    }
}

fn elements_named<'a>(
    root: NodeRef<'a, Node>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |element| element.value().name() == name)
}

/// `<td><p><strong>Computer Science</strong></p></td>`
fn section_header(cell: ElementRef) -> Option<String> {
    let paragraph = elements_named(*cell, "p").next()?;
    let strong = elements_named(*paragraph, "strong").next()?;
    let text = collapse_whitespace(&strong.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

fn course_block(cell: ElementRef, department: &str) -> RawBlock {
    match elements_named(*cell, "h3").next() {
        Some(header) => {
            let course_id = header_course_id(header);
            let title = collapse_whitespace(&header.text().collect::<String>());
            let details = detail_segments(header);
            RawBlock::from_parts(department, course_id, &title, details.iter().map(String::as_str))
        }
        // No header element: keep the whole cell so the extractor can flag it.
        None => {
            let text = collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" "));
            RawBlock::from_parts(department, None, &text, [])
        }
    }
}

/// Text after the course header, split on `<br>`. The description is the
/// first segment. Content before the first `<hr>` following the header is
/// skipped when such a rule exists.
fn detail_segments(header: ElementRef) -> Vec<String> {
    let siblings: Vec<NodeRef<Node>> = header.next_siblings().collect();
    let start = siblings
        .iter()
        .position(|node| is_element(*node, "hr"))
        .map_or(0, |hr| hr + 1);

    let mut segments = Vec::new();
    let mut current = String::new();
    for node in &siblings[start..] {
        match node.value() {
            Node::Element(element) if element.name() == "br" => {
                flush_segment(&mut current, &mut segments);
            }
            Node::Element(element) => {
                let is_block = BLOCK_ELEMENTS.contains(&element.name());
                if is_block {
                    current.push(' ');
                }
                if let Some(child) = ElementRef::wrap(*node) {
                    current.extend(child.text());
                }
                if is_block {
                    current.push(' ');
                }
            }
            Node::Text(text) => current.push_str(text),
            _ => {}
        }
    }
    flush_segment(&mut current, &mut segments);
    segments
}

fn flush_segment(current: &mut String, segments: &mut Vec<String>) {
    let segment = collapse_whitespace(current);
    if !segment.is_empty() {
        segments.push(segment);
    }
    current.clear();
}

fn is_element(node: NodeRef<Node>, name: &str) -> bool {
    matches!(node.value(), Node::Element(element) if element.name() == name)
}

/// Only a link in the course header names this course; links in the details
/// point at prerequisites and other related courses.
fn header_course_id(header: ElementRef) -> Option<u64> {
    elements_named(*header, "a")
        .filter_map(|anchor| anchor.value().attr("href"))
        .find_map(course_id_from_href)
}

/// `preview_course_nopop.php?catoid=95&coid=594896` -> 594896
fn course_id_from_href(href: &str) -> Option<u64> {
    let (_, rest) = href.split_once("coid=")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_id_is_read_from_query() {
        assert_eq!(
            course_id_from_href("preview_course_nopop.php?catoid=95&coid=594896"),
            Some(594896)
        );
        assert_eq!(course_id_from_href("content.php?catoid=95"), None);
        assert_eq!(course_id_from_href("x?coid="), None);
    }

    #[test]
    fn aliases_rename_departments() {
        let mut config = PageParserConfig::default();
        config
            .department_aliases
            .insert("Comp Sci".to_string(), "Computer Science".to_string());
        let parser = PageParser::new(config);
        assert_eq!(parser.canonical_department("  Comp   Sci "), "Computer Science");
        assert_eq!(parser.canonical_department("Art"), "Art");
    }
}
