//! Progress reporting for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Bar resolution: one tick per tenth of a percent
const PERCENT_SCALE: f64 = 10.0;

/// Creates progress bars and spinners, or hidden ones when disabled
pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A bar driven by percentages in `[0, 100]`
    pub fn create_percent_bar(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new((100.0 * PERCENT_SCALE) as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Create a spinner for indeterminate operations
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Move a percent bar to `percent`
pub fn set_percent(pb: &ProgressBar, percent: f64) {
    pb.set_position(percent_position(percent));
}

fn percent_position(percent: f64) -> u64 {
    (percent.clamp(0.0, 100.0) * PERCENT_SCALE).round() as u64
}
