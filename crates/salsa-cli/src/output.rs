//! Output formatting for CLI.

use console::{style, Term};
use std::io::Write;

/// Verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// Map the number of `-v` flags to a verbosity level
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    /// Default log filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }
}

/// Output handler for CLI
pub struct Output {
    term: Term,
    verbosity: Verbosity,
}

impl Output {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            term: Term::stdout(),
            verbosity,
        }
    }

    /// Write a blank line
    pub fn blank(&self) {
        let _ = writeln!(&self.term);
    }

    /// Write a section header
    pub fn section(&self, title: &str) {
        let _ = writeln!(&self.term, "{}\n", style(title).cyan().bold());
    }

    pub fn info(&self, message: &str) {
        let _ = writeln!(&self.term, "{}", style(message).yellow());
    }

    /// `✓ message`
    pub fn success(&self, message: &str) {
        let _ = writeln!(&self.term, "{} {}", style("✓").green(), message);
    }

    /// `✗ message`
    pub fn failure(&self, message: &str) {
        let _ = writeln!(&self.term, "{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        let _ = writeln!(&self.term, "{} {}", style("Warning:").yellow().bold(), message);
    }

    pub fn error(&self, message: &str) {
        let _ = writeln!(&self.term, "{} {}", style("Error:").red().bold(), message);
    }

    /// Dimmed secondary text
    pub fn hint(&self, message: &str) {
        let _ = writeln!(&self.term, "{}", style(message).dim());
    }

    /// Only shown with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            let _ = writeln!(&self.term, "{}", style(message).dim());
        }
    }

    /// Write a list item
    pub fn list_item(&self, prefix: &str, message: &str) {
        let _ = writeln!(&self.term, "  {} {}", style(prefix).green(), message);
    }

    /// `label: value` with a padded label
    pub fn key_value(&self, label: &str, value: &str) {
        let _ = writeln!(&self.term, "  {:<12} {}", style(label).bold(), value);
    }

    /// Write a table row
    pub fn table_row(&self, columns: &[&str], widths: &[usize]) {
        let _ = writeln!(&self.term, "{}", format_row(columns, widths));
    }

    /// Wait for Enter before returning to the menu
    pub fn pause(&self) {
        let _ = writeln!(&self.term);
        let _ = write!(&self.term, "{}", style("Press Enter to continue...").dim());
        let _ = self.term.flush();
        let _ = self.term.read_line();
    }
}

fn format_row(columns: &[&str], widths: &[usize]) -> String {
    let mut line = String::new();
    for (i, col) in columns.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(20);
        line.push_str(&format!("{:<width$}", col, width = width));
    }
    line.trim_end().to_string()
}
