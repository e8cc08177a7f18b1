use catalog_core::{ProgressSink, ProgressState};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";

/// Draws aggregator snapshots as a terminal progress bar. The bar position is
/// completed + failed; failures are shown in the message.
pub struct BarProgressSink {
    bar: ProgressBar,
}

impl BarProgressSink {
    pub fn new(label: &str) -> Self {
        Self::with_bar(ProgressBar::new(0), label)
    }

    /// A sink that tracks state without drawing anything.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), "")
    }

    fn with_bar(bar: ProgressBar, label: &str) -> Self {
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Leaves the final state on screen.
    pub fn finish(&self) {
        self.bar.abandon();
    }
}

impl ProgressSink for BarProgressSink {
    fn update(&self, state: ProgressState) {
        self.bar.set_length(state.total as u64);
        self.bar.set_position(state.finished() as u64);
        if state.failed > 0 {
            self.bar.set_message(format!("{} failed", state.failed));
        }
    }
}
