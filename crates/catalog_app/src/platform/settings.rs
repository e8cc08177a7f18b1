use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use catalog_core::UnicodeCleaner;
use catalog_engine::{CatalogSite, FetchSettings, PageParserConfig};
use catalog_logging::catalog_info;
use serde::{Deserialize, Serialize};

/// Everything both binaries can be configured with. Every field has a default,
/// so a settings file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub site: CatalogSite,
    pub parser: PageParserConfig,
    pub fetch: FetchConfig,
    pub concurrency: usize,
    pub output_dir: PathBuf,
    pub raw_file: String,
    pub catalog_file: String,
    pub log_file: Option<PathBuf>,
    /// Added to the built-in cleanup table; an entry for a known character
    /// replaces the built-in replacement.
    pub extra_replacements: BTreeMap<char, String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            site: CatalogSite::default(),
            parser: PageParserConfig::default(),
            fetch: FetchConfig::default(),
            concurrency: 8,
            output_dir: PathBuf::from("output"),
            raw_file: catalog_engine::RAW_FILENAME.to_string(),
            catalog_file: catalog_engine::CATALOG_FILENAME.to_string(),
            log_file: None,
            extra_replacements: BTreeMap::new(),
        }
    }
}

impl AppSettings {
    pub fn raw_path(&self) -> PathBuf {
        self.output_dir.join(&self.raw_file)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.output_dir.join(&self.catalog_file)
    }

    pub fn cleaner(&self) -> UnicodeCleaner {
        UnicodeCleaner::default().extend(self.extra_replacements.clone())
    }
}

/// HTTP limits in settings-file units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn to_settings(&self) -> FetchSettings {
        let defaults = FetchSettings::default();
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            allowed_content_types: defaults.allowed_content_types,
        }
    }
}

/// Reads a RON settings file, or returns the defaults when no path is given.
pub fn load_settings(path: Option<&Path>) -> Result<AppSettings> {
    let Some(path) = path else {
        return Ok(AppSettings::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("reading settings from {path:?}"))?;
    let settings: AppSettings =
        ron::from_str(&content).with_context(|| format!("parsing settings in {path:?}"))?;
    catalog_info!("Loaded settings from {:?}", path);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_path_gives_defaults() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.site.catoid, 95);
        assert_eq!(settings.catalog_path(), PathBuf::from("output/catalog.json"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(
            &path,
            r#"(
                concurrency: 3,
                site: (page_count: Some(2), department_hints: {1: "Accounting"}),
                parser: (department_aliases: {"Comp Sci": "Computer Science"}),
                fetch: (request_timeout_secs: 5),
                extra_replacements: {'—': "-"},
            )"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.site.page_count, Some(2));
        assert_eq!(settings.site.navoid, 14518);
        assert_eq!(
            settings.parser.course_table_selector,
            PageParserConfig::default().course_table_selector
        );
        assert_eq!(settings.fetch.to_settings().request_timeout, Duration::from_secs(5));
        assert_eq!(settings.fetch.connect_timeout_secs, 10);
        assert_eq!(settings.cleaner().clean("a\u{2014}b").text, "a-b");
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("settings.ron");
        fs::write(&path, "(concurrency: \"many\")").unwrap();
        assert!(load_settings(Some(&path)).is_err());
        assert!(load_settings(Some(&temp.path().join("absent.ron"))).is_err());
    }
}
