use std::collections::BTreeMap;
use std::sync::LazyLock;

use catalog_core::PageTask;
use catalog_logging::catalog_info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::decode::decode_page;
use crate::{FetchError, FetchOutput, Fetcher};

// Pager links carry `filter[cpage]=N`, raw or percent-encoded.
static PAGER_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)filter(?:\[|%5B)cpage(?:\]|%5D)=(\d+)").expect("valid pager pattern")
});

/// Where the catalog lives and which course listing to walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSite {
    pub base_url: String,
    pub catoid: u32,
    pub navoid: u32,
    /// Skip discovery and scrape exactly this many pages.
    pub page_count: Option<u32>,
    /// Department to assume for a page whose first courses precede any
    /// section header, keyed by page number.
    pub department_hints: BTreeMap<u32, String>,
}

impl Default for CatalogSite {
    fn default() -> Self {
        Self {
            base_url: "https://catalog.fullerton.edu/content.php".to_string(),
            catoid: 95,
            navoid: 14518,
            page_count: None,
            department_hints: BTreeMap::new(),
        }
    }
}

impl CatalogSite {
    /// Expanded, print-friendly course listing for page `page` (1-based).
    pub fn page_url(&self, page: u32) -> Result<String, SetupError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| SetupError::BaseUrl {
            url: self.base_url.clone(),
            message: err.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("catoid", &self.catoid.to_string())
            .append_pair("navoid", &self.navoid.to_string())
            .append_pair("filter[27]", "-1")
            .append_pair("filter[29]", "")
            .append_pair("filter[keyword]", "")
            .append_pair("filter[32]", "1")
            .append_pair("filter[cpage]", &page.to_string())
            .append_pair("filter[exact_match]", "1")
            .append_pair("filter[item_type]", "3")
            .append_pair("filter[only_active]", "1")
            .append_pair("filter[3]", "1")
            .append_pair("expand", "1")
            .append_key_only("print");
        Ok(url.into())
    }

    pub fn tasks(&self, pages: u32) -> Result<Vec<PageTask>, SetupError> {
        (1..=pages)
            .map(|page| {
                Ok(PageTask {
                    url: self.page_url(page)?,
                    department_hint: self.department_hints.get(&page).cloned(),
                })
            })
            .collect()
    }
}

/// The list of pages to scrape could not be built; there is no work to do.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("invalid catalog base url {url}: {message}")]
    BaseUrl { url: String, message: String },
    #[error("catalog index page {url} could not be fetched: {source}")]
    IndexUnavailable {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("catalog index page {url} could not be decoded: {message}")]
    IndexUndecodable { url: String, message: String },
}

/// The page task list, plus the first page when it had to be fetched to read
/// the pager.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub tasks: Vec<PageTask>,
    pub index: Option<(String, FetchOutput)>,
}

/// Builds the page task list. Reads the page count from the pager on page 1
/// unless the site configuration fixes it.
pub async fn discover_tasks(
    fetcher: &dyn Fetcher,
    site: &CatalogSite,
) -> Result<Vec<PageTask>, SetupError> {
    Ok(discover(fetcher, site).await?.tasks)
}

/// Like [`discover_tasks`], but keeps the fetched first page so it does not
/// have to be requested a second time.
pub async fn discover(fetcher: &dyn Fetcher, site: &CatalogSite) -> Result<Discovery, SetupError> {
    if let Some(pages) = site.page_count {
        catalog_info!("Using configured page count {}", pages);
        return Ok(Discovery {
            tasks: site.tasks(pages)?,
            index: None,
        });
    }

    let index_url = site.page_url(1)?;
    catalog_info!("Fetching catalog index {}", index_url);
    let output = fetcher
        .fetch(&index_url)
        .await
        .map_err(|source| SetupError::IndexUnavailable {
            url: index_url.clone(),
            source,
        })?;
    let html = decode_page(&output.bytes, output.content_type.as_deref()).map_err(|err| {
        SetupError::IndexUndecodable {
            url: index_url.clone(),
            message: err.to_string(),
        }
    })?;

    let pages = last_page(&html);
    catalog_info!("Catalog lists {} pages", pages);
    Ok(Discovery {
        tasks: site.tasks(pages)?,
        index: Some((index_url, output)),
    })
}

/// Highest page number linked from the pager; 1 when there is no pager.
pub fn last_page(html: &str) -> u32 {
    PAGER_LINK
        .captures_iter(html)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}
