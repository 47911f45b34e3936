//! Output formatting and styling module.
//!
//! Centralizes all terminal output: colored status lines, the dry-run notice,
//! and the progress bar shown while a run walks the target directory.
//! Per-entry outcome lines are returned as strings so callers can route them
//! through [`ProgressBar::println`] without garbling an active bar.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a yellow notice marking dry-run output.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for the per-entry run loop.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use downsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.println(OutputFormatter::move_line("a.pdf", "Documents", "a.pdf", false));
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Formats the outcome line for a moved (or would-be-moved) entry.
    pub fn move_line(name: &str, category: &str, final_name: &str, dry_run: bool) -> String {
        let verb = if dry_run {
            "Would move".yellow()
        } else {
            "Moved".green()
        };
        format!(
            "{} {}: {} → {}/{}",
            if dry_run { "→".yellow() } else { "✓".green() },
            verb,
            name.cyan(),
            category.magenta(),
            final_name
        )
    }

    /// Formats the outcome line for an entry that failed processing.
    pub fn error_line(name: &str, message: &str) -> String {
        format!("{} Error with {}: {}", "✗".red(), name.red(), message)
    }
}
