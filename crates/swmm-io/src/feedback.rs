//! Progress and cancellation seam towards the hosting application.
//!
//! The engine reports at section boundaries only and checks for
//! cancellation between whole-section operations.

use tracing::info;

pub trait Feedback {
    fn set_progress_text(&mut self, text: &str);

    /// Overall progress, 0 to 100.
    fn set_progress(&mut self, percent: u8);

    fn is_canceled(&self) -> bool {
        false
    }
}

/// Share of `done` out of `total` steps, as a percentage.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((done * 100) / total).min(100) as u8
    }
}

/// Forwards progress to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct LogFeedback {
    last_percent: u8,
}

impl LogFeedback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Feedback for LogFeedback {
    fn set_progress_text(&mut self, text: &str) {
        info!("{text}");
    }

    fn set_progress(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent != self.last_percent {
            info!(progress = percent, "progress");
            self.last_percent = percent;
        }
    }
}

/// Discards everything; handy for library callers without a UI.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn set_progress_text(&mut self, _text: &str) {}

    fn set_progress(&mut self, _percent: u8) {}
}
