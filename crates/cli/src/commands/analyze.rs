//! AI analysis command

use anyhow::{Context, Result};
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;
use posture_lib::{
    report::write_report, AnalysisResult, AuditLogger, BatchSummary, KubeOptions, OpenAiClient,
    ReportFormat, SecurityAnalyzer, SecurityLevel,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::output::{color_level, level_marker, print_info, print_success, print_warning};

/// Persisted report kind
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ReportKind {
    #[default]
    Json,
    Html,
}

impl From<ReportKind> for ReportFormat {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Json => ReportFormat::Json,
            ReportKind::Html => ReportFormat::Html,
        }
    }
}

pub struct AnalyzeOptions {
    pub config: PathBuf,
    pub output: Option<PathBuf>,
    pub report: ReportKind,
    pub console: bool,
}

/// Load the AI settings, printing a hint towards `init-config` on failure
///
/// The error itself is returned for the caller to report.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    AppConfig::load(path).map_err(|e| {
        print_info("Generate an example config file with: kposture init-config");
        e
    })
}

/// Analyze every workload in the snapshot with the configured model
pub async fn run_analysis(
    kube: &KubeOptions,
    exclude: &str,
    logger: AuditLogger,
    options: AnalyzeOptions,
) -> Result<()> {
    let config = load_config(&options.config)?;
    let client = OpenAiClient::new(config.client_config()).context("Failed to build AI client")?;

    let pods = super::fetch_snapshot(kube, exclude).await?;
    if pods.is_empty() {
        print_warning("No pods matched the selection; nothing to analyze");
        return Ok(());
    }

    print_info(&format!(
        "Starting AI security analysis of {} pods",
        pods.len()
    ));
    print_info(&format!("Model: {}", config.openai.model));

    let analyzer = SecurityAnalyzer::new(Arc::new(client))
        .with_prompt_builder(config.prompt_builder())
        .with_pacing(config.pacing())
        .with_logger(logger);
    let results = analyzer.analyze_all(&pods).await;
    info!(
        workloads = pods.len(),
        analyzed = results.len(),
        "AI analysis finished"
    );

    if options.console {
        print_console(&results);
    }

    let generated_at = Utc::now();
    let format = ReportFormat::from(options.report);
    let output = options
        .output
        .unwrap_or_else(|| PathBuf::from(format.default_file_name(generated_at)));
    write_report(format, &results, generated_at, &output)
        .with_context(|| format!("Failed to save analysis results to {}", output.display()))?;

    info!(path = %output.display(), format = ?options.report, "Report written");

    print_summary(&BatchSummary::from_results(&results));
    print_success(&format!("Analysis results saved to {}", output.display()));

    Ok(())
}

/// Per-workload console view
pub fn print_console(results: &[AnalysisResult]) {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("AI pod security analysis");
    println!("{}", rule);

    for (i, result) in results.iter().enumerate() {
        println!(
            "\n[{}/{}] Pod: {}/{}",
            i + 1,
            results.len(),
            result.namespace,
            result.pod
        );
        println!(
            "Security level: {} {}",
            level_marker(result.security_level),
            color_level(result.security_level)
        );

        if !result.issues.is_empty() {
            println!("\n{}", "Security issues:".red().bold());
            for (j, issue) in result.issues.iter().enumerate() {
                println!("  {}. {}", j + 1, issue);
            }
        }

        if !result.recommendations.is_empty() {
            println!("\n{}", "Recommendations:".green().bold());
            for (j, rec) in result.recommendations.iter().enumerate() {
                println!("  {}. {}", j + 1, rec);
            }
        }

        println!("{}", "-".repeat(80));
    }
}

/// Lines of the run summary; levels with zero count are left out
pub fn summary_lines(summary: &BatchSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Total pods: {}", summary.total_workloads()),
        format!("Total issues: {}", summary.total_issues),
    ];
    lines.extend(
        SecurityLevel::ALL
            .iter()
            .filter(|level| summary.count(**level) > 0)
            .map(|level| {
                format!(
                    "  {} {}: {}",
                    level_marker(*level),
                    level,
                    summary.count(*level)
                )
            }),
    );
    lines
}

fn print_summary(summary: &BatchSummary) {
    let rule = "=".repeat(50);
    println!("\n{}", rule);
    println!("AI security analysis summary");
    println!("{}", rule);
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}
