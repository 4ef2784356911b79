//! Human-readable console announcements

use colored::Colorize;
use std::path::Path;

use crate::types::{ColorVerdict, FrameReason};

/// Prints heard commands and color finds
#[derive(Debug, Clone, Default)]
pub struct ConsoleReporter {
    no_color: bool,
    silent: bool,
}

impl ConsoleReporter {
    pub fn new(no_color: bool) -> Self {
        Self { no_color, silent: false }
    }

    /// Prints nothing
    pub fn silent() -> Self {
        Self { no_color: true, silent: true }
    }

    pub fn heard_line(&self, text: &str) -> String {
        if self.no_color {
            format!("Heard: {}", text)
        } else {
            format!("{} {}", "Heard:".bold(), text)
        }
    }

    pub fn found_line(&self, color: ColorVerdict) -> String {
        if self.no_color {
            format!("Looks like I found a {} blob.", color.name())
        } else {
            format!(
                "Looks like I found a {}{}{} blob.",
                color.color_code(),
                color.name(),
                ColorVerdict::color_reset()
            )
        }
    }

    pub fn heard(&self, text: &str) {
        self.emit(self.heard_line(text));
    }

    pub fn search_started(&self) {
        let line = if self.no_color {
            String::from("Starting color search!")
        } else {
            "Starting color search!".yellow().to_string()
        };
        self.emit(line);
    }

    pub fn found(&self, color: ColorVerdict, path: Option<&Path>) {
        self.emit(self.found_line(color));
        if let Some(path) = path {
            let line = format!("  saved {}", path.display());
            self.emit(if self.no_color { line } else { line.dimmed().to_string() });
        }
    }

    pub fn store_failed(&self, reason: FrameReason) {
        let line = format!("  frame save failed: {}", reason);
        self.emit(if self.no_color { line } else { line.red().to_string() });
    }

    fn emit(&self, line: String) {
        if !self.silent {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_line_uses_fixed_escapes() {
        let reporter = ConsoleReporter::new(false);
        assert_eq!(
            reporter.found_line(ColorVerdict::Blue),
            "Looks like I found a \x1b[34mblue\x1b[0m blob."
        );
    }

    #[test]
    fn test_plain_lines() {
        let reporter = ConsoleReporter::new(true);
        assert_eq!(reporter.heard_line("go straight"), "Heard: go straight");
        assert_eq!(reporter.found_line(ColorVerdict::Red), "Looks like I found a red blob.");
    }
}
