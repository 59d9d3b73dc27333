use crate::core::{Eta, ProgressRenderer, ProgressUpdate};
use crate::utils::{format_bytes, format_duration};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>3}% {msg}";

/// Draws download progress as an `indicatif` bar on stderr.
#[derive(Default)]
pub struct TerminalRenderer {
    bar: Option<ProgressBar>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `(<downloaded> of <total>) running for: .., estimated time left: ..`
pub fn describe(update: &ProgressUpdate) -> String {
    let total = if update.total == 0 {
        "unknown".to_string()
    } else {
        format_bytes(update.total)
    };
    let eta = match update.eta {
        Eta::Remaining(left) => format_duration(left),
        Eta::Unknown => "unknown".to_string(),
    };

    format!(
        "({} of {}) running for: {}, estimated time left: {}",
        format_bytes(update.downloaded),
        total,
        format_duration(update.elapsed),
        eta
    )
}

impl ProgressRenderer for TerminalRenderer {
    fn start(&mut self) {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        self.bar = Some(bar);
    }

    fn update(&mut self, update: &ProgressUpdate) {
        if let Some(bar) = &self.bar {
            if let Some(percent) = update.percent {
                bar.set_position(u64::from(percent));
            }
            bar.set_message(describe(update));
        }
    }

    fn finish(&mut self, update: &ProgressUpdate) {
        if let Some(bar) = self.bar.take() {
            bar.set_position(100);
            bar.finish_with_message(describe(update));
        }
        eprintln!("\n{}", "Download Completed!".green());
    }

    fn abandon(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.abandon_with_message(format!("stopped: {}", message).red().to_string());
        }
    }
}
