//! Console reporting
//!
//! Styled status lines, a spinner for long reads and the final summary.

use crate::processor::RunReport;
use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════╗
║                      FILTERLIST-DEDUP                        ║
║          Exact-duplicate remover for ||domain^ rules         ║
╚══════════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner.green());
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    println!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Text reported for one removed duplicate
pub fn duplicate_message(rule: &str) -> String {
    format!("Duplicate removed: {}", rule)
}

/// Print one removed duplicate
pub fn print_duplicate(line_number: usize, rule: &str) {
    println!("  {} {} {}", "−".yellow(), duplicate_message(rule), format!("(line {})", line_number).dimmed());
}

/// Create a styled spinner for indeterminate progress
pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Print the end-of-run summary
pub fn print_summary(report: &RunReport, detailed: bool) {
    let stats = &report.stats;

    println!();
    println!("{}", "═".repeat(60).green());
    if report.written {
        println!("{}", "                  DEDUPLICATION COMPLETE".green().bold());
    } else {
        println!("{}", "              DEDUPLICATION COMPLETE (DRY RUN)".yellow().bold());
    }
    println!("{}", "═".repeat(60).green());
    println!();

    println!("  {} {}", "Unique rules:   ".green().bold(),
        format_number(stats.unique_rules).green().bold());
    println!("  {} {}", "Duplicates:     ".yellow(),
        format_number(stats.duplicates_removed));

    if report.written {
        println!("  {} {}", "Saved to:       ".green(), report.output_path.display());
    } else {
        println!("  {} {} {}", "Saved to:       ".green(), report.output_path.display(),
            "(not written)".dimmed());
    }

    if detailed {
        println!();
        println!("  {} {}", "Total lines:    ".green(), format_number(stats.total_lines));
        println!("  {} {}", "Rule lines:     ".green(), format_number(stats.rule_lines));
        println!("  {} {}", "Other lines:    ".green(), format_number(stats.non_rule_lines));
        println!("  {} {}", "Output lines:   ".green(), format_number(stats.retained_lines()));
        println!("  {} {}", "Input size:     ".green(), ByteSize(report.input_bytes));
        if report.written {
            println!("  {} {}", "Output size:    ".green(), ByteSize(report.output_bytes));
        }
        println!("  {} {}", "Rule set memory:".green(), ByteSize(report.rule_set_bytes));
        println!("  {} {}", "Duration:       ".green(), format_duration(report.elapsed));
    }

    println!();
    println!("{}", "═".repeat(60).green());
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 1 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_duplicate_message() {
        assert_eq!(duplicate_message("||ads.example.com^"), "Duplicate removed: ||ads.example.com^");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
    }
}
