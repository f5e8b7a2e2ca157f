//! Terminal progress display for a single mosaic run

use crate::io::configuration::PROGRESS_BAR_STEPS;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg:>12} [{bar:40.cyan/blue}] {percent:>3}% ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar fed by fractional worker updates
///
/// The displayed position never moves backwards, even if a stale update arrives.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a visible progress bar
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(PROGRESS_BAR_STEPS))
    }

    /// Create a reporter that tracks progress without drawing anything
    pub fn hidden() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(PROGRESS_BAR_STEPS);
        Self::with_bar(bar)
    }

    /// Create a visible or hidden reporter
    pub fn visible(show: bool) -> Self {
        if show { Self::new() } else { Self::hidden() }
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(PROGRESS_STYLE.clone());
        Self { bar }
    }

    /// Label the current stage of the run
    pub fn set_stage(&self, stage: &'static str) {
        self.bar.set_message(stage);
    }

    /// Move the bar to a completed fraction in `[0, 1]`
    pub fn update(&self, fraction: f64) {
        let position = (fraction.clamp(0.0, 1.0) * PROGRESS_BAR_STEPS as f64).round() as u64;
        if position > self.bar.position() {
            self.bar.set_position(position);
        }
    }

    /// Completed fraction currently displayed
    pub fn fraction(&self) -> f64 {
        self.bar.position() as f64 / PROGRESS_BAR_STEPS as f64
    }

    /// Fill the bar and leave a closing message
    pub fn finish(&self, message: &'static str) {
        self.bar.set_position(PROGRESS_BAR_STEPS);
        self.bar.finish_with_message(message);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
