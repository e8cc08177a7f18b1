#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::{ProgressSink, ProgressState};
use catalog_engine::{FailureKind, FetchError, FetchOutput, Fetcher};

/// Two departments; Computer Science holds a fixed-unit and a variable-unit
/// course.
pub const CS_PAGE: &str = r#"<html><body>
<table class="table_default"><tr><td>navigation</td></tr></table>
<table class="table_default">
  <tr><td colspan="2"><p><strong>Computer Science</strong></p></td></tr>
  <tr>
    <td>&nbsp;</td>
    <td>
      <h3>CPSC 120 - Introduction to Programming (3)</h3>
      <hr>
      Fundamental concepts of programming.<br>
      Prerequisite: <a href="preview_course_nopop.php?catoid=95&amp;coid=125">MATH 125</a>.<br>
      Typically Offered: Fall, Spring
    </td>
  </tr>
  <tr>
    <td>&nbsp;</td>
    <td>
      <h3><a href="preview_course_nopop.php?catoid=95&amp;coid=102">CPSC 121 - Object-Oriented Programming (1-3 units)</a></h3>
      <hr>
      Classes and objects.<br>
      One or more sections may be offered in any online format.
    </td>
  </tr>
  <tr><td colspan="2"><p><strong>Mathematics</strong></p></td></tr>
  <tr>
    <td>&nbsp;</td>
    <td><h3>MATH 150A - Calculus I (4)</h3><hr>Limits and derivatives.</td>
  </tr>
</table>
</body></html>"#;

/// Page that continues a department started on an earlier page.
pub fn continuation_page(code: &str, title: &str) -> String {
    format!(
        r#"<table class="table_default"><tr><td></td><td><h3>{code} - {title} (3)</h3><hr>More.</td></tr></table>"#
    )
}

pub fn html(body: &str) -> FetchOutput {
    FetchOutput {
        bytes: body.as_bytes().to_vec(),
        final_url: String::new(),
        content_type: Some("text/html; charset=utf-8".to_string()),
    }
}

/// In-memory fetcher with a scripted response per URL.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, Result<FetchOutput, FetchError>>,
    delay: Option<Duration>,
}

impl FakeFetcher {
    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html(body)));
        self
    }

    pub fn failing(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(
            url.to_string(),
            Err(FetchError::new(FailureKind::HttpStatus(status), "scripted")),
        );
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.pages.get(url) {
            Some(Ok(output)) => Ok(FetchOutput {
                final_url: url.to_string(),
                ..output.clone()
            }),
            Some(Err(err)) => Err(err.clone()),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), url)),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    states: Mutex<Vec<ProgressState>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn states(&self) -> Vec<ProgressState> {
        self.states.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn update(&self, state: ProgressState) {
        self.states.lock().unwrap().push(state);
    }
}
