mod logging;
mod render;
mod settings;
mod summary;

pub use logging::init_logging;
pub use render::BarProgressSink;
pub use settings::{load_settings, AppSettings, FetchConfig};
pub use summary::{write_clean_summary, write_reprocess_summary, write_scrape_summary};
