use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Spinner-based progress reporting for the pipeline stages
pub struct ProgressTracker {
    multi: MultiProgress,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Create an indeterminate spinner for an unknown-duration stage
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapper that runs each pipeline stage behind an optional spinner
pub struct ProgressOperation {
    tracker: ProgressTracker,
    enabled: bool,
}

impl ProgressOperation {
    pub fn new(enabled: bool) -> Self {
        Self {
            tracker: ProgressTracker::new(),
            enabled,
        }
    }

    /// Execute an operation with a spinner if progress display is enabled
    pub async fn with_spinner<F, T>(&self, message: &str, mut operation: F) -> T
    where
        F: FnMut(Option<&ProgressBar>) -> T,
    {
        if self.enabled {
            let pb = self.tracker.create_spinner(message);
            let result = operation(Some(&pb));
            pb.finish_with_message(format!("✓ {}", message));
            result
        } else {
            operation(None)
        }
    }
}
