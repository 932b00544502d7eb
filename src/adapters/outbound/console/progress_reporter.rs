use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize as _;
use std::cell::RefCell;
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(120);

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// Writes to stderr so the replay summary on stdout stays machine readable.
/// Uses indicatif for the step bar and the drain spinner.
pub struct StderrProgressReporter {
    progress_bar: RefCell<Option<ProgressBar>>,
    spinner: RefCell<Option<ProgressBar>>,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: RefCell::new(None),
            spinner: RefCell::new(None),
        }
    }

    fn get_or_create_progress_bar(&self, total: usize) -> ProgressBar {
        let mut pb_option = self.progress_bar.borrow_mut();
        if let Some(pb) = pb_option.as_ref() {
            return pb.clone();
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} - {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        *pb_option = Some(pb.clone());
        pb
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }

    fn clear_all(&self) {
        self.clear_spinner();
        if let Some(pb) = self.progress_bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        self.clear_spinner();
        eprintln!("  {} {}", "→".cyan(), message);
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        self.clear_spinner();
        let pb = self.get_or_create_progress_bar(total);
        pb.set_position(current as u64);
        if let Some(msg) = message {
            pb.set_message(msg.to_string());
        }
    }

    fn report_waiting(&self, message: &str) {
        self.clear_spinner();
        let spinner = ProgressBar::new_spinner();
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(SPINNER_TICK);
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn report_error(&self, message: &str) {
        self.clear_all();
        eprintln!("  {} {}", "!".yellow(), message.red());
    }

    fn report_completion(&self, message: &str) {
        self.clear_all();
        eprintln!();
        eprintln!("  {} {}", "✓".green(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = StderrProgressReporter::new();
        // Can't easily test stderr output, but verify it doesn't panic
        reporter.report("Test message");
        reporter.report_progress(1, 3, Some("ingest"));
        reporter.report_waiting("draining jobs");
        reporter.report_error("Test error");
        reporter.report_completion("Test completion");
    }

    #[test]
    fn test_spinner_is_cleared_by_next_report() {
        let reporter = StderrProgressReporter::default();
        reporter.report_waiting("draining jobs");
        assert!(reporter.spinner.borrow().is_some());
        reporter.report("next step");
        assert!(reporter.spinner.borrow().is_none());
    }
}
