//! Output formatting utilities

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use posture_lib::{CheckId, Evidence, Finding, SecurityLevel};

/// Output format for audit findings
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text lines (default)
    #[default]
    Text,
    /// Table per check
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// One report line for a finding
pub fn finding_line(finding: &Finding) -> String {
    let mut line = format!("namespace {} : pod {}", finding.namespace, finding.pod);

    match (&finding.container, &finding.evidence) {
        (Some(container), Some(Evidence::Capabilities(caps))) => {
            let verb = match finding.check {
                CheckId::DroppedCaps => "dropped",
                _ => "added",
            };
            line.push_str(&format!(
                " : container {} {} capabilities {}",
                container,
                verb,
                caps.join(",")
            ));
        }
        (Some(container), Some(Evidence::HostPort(port))) => {
            line.push_str(&format!(" : container {} : port {}", container, port));
        }
        (Some(container), _) => {
            line.push_str(&format!(" : container {}", container));
        }
        (None, Some(Evidence::HostPath { volume, path })) => {
            line.push_str(&format!(" : volume {} : path {}", volume, path));
        }
        (None, Some(Evidence::Sysctl(name))) => {
            line.push_str(&format!(" : unsafe sysctl {}", name));
        }
        (None, _) => {}
    }

    line
}

/// Rule-specific detail column for tables
pub fn finding_detail(finding: &Finding) -> String {
    match &finding.evidence {
        Some(Evidence::Capabilities(caps)) => caps.join(","),
        Some(Evidence::HostPort(port)) => port.to_string(),
        Some(Evidence::HostPath { volume, path }) => format!("{} -> {}", volume, path),
        Some(Evidence::Sysctl(name)) => name.clone(),
        None => String::new(),
    }
}

/// Colour a security level for the terminal
pub fn color_level(level: SecurityLevel) -> ColoredString {
    match level {
        SecurityLevel::Safe => level.as_str().green(),
        SecurityLevel::Moderate => level.as_str().yellow(),
        SecurityLevel::HighRisk => level.as_str().red(),
        SecurityLevel::Critical => level.as_str().red().bold(),
        SecurityLevel::Unknown => level.as_str().dimmed(),
    }
}

pub fn level_marker(level: SecurityLevel) -> &'static str {
    match level {
        SecurityLevel::Safe => "✅",
        SecurityLevel::Moderate => "⚠️",
        SecurityLevel::HighRisk => "🔴",
        SecurityLevel::Critical => "🚨",
        SecurityLevel::Unknown => "❓",
    }
}
