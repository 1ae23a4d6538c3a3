//! Kubernetes pod security posture CLI
//!
//! Audits running pods against baseline hardening checks and, optionally,
//! asks an OpenAI-compatible model for a deeper per-pod assessment.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, audit, setup};
use posture_lib::{AuditLogger, CheckId, KubeOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Kubernetes pod security posture CLI
#[derive(Parser)]
#[command(name = "kposture")]
#[command(author, version, about = "Kubernetes pod security posture audits", long_about = None)]
pub struct Cli {
    /// Kubeconfig file or path list (KUBECONFIG and defaults are used if not specified)
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Only inspect pods in this namespace
    #[arg(long, short, global = true)]
    pub namespace: Option<String>,

    /// Comma-separated namespace fragments to exclude
    #[arg(long, short, global = true, default_value = "")]
    pub exclude: String,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the baseline hardening checks
    Audit {
        /// Restrict the run to these checks (repeatable)
        #[arg(long = "check", value_parser = parse_check)]
        checks: Vec<CheckId>,

        /// Output format
        #[arg(long, short, value_enum, default_value_t)]
        format: output::OutputFormat,
    },

    /// Analyze pods with an AI model and save a report
    Analyze {
        /// Path to the AI settings file
        #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Report file path
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, short, value_enum, default_value_t)]
        report: analyze::ReportKind,

        /// Print the per-pod analysis to the console
        #[arg(long, short)]
        console: bool,
    },

    /// Write an example AI settings file
    InitConfig {
        /// Output file path
        #[arg(long, short, default_value = config::DEFAULT_CONFIG_PATH)]
        output: PathBuf,
    },

    /// Check connectivity to the AI service
    TestApi {
        /// Path to the AI settings file
        #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn parse_check(value: &str) -> Result<CheckId, String> {
    value.parse()
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let kube = KubeOptions {
        kubeconfig: cli.kubeconfig,
        context: cli.context,
        namespace: cli.namespace,
    };
    let logger = AuditLogger::new(kube.context.as_deref().unwrap_or("default"));

    // Execute command
    match cli.command {
        Commands::Audit { checks, format } => {
            let pods = commands::fetch_snapshot(&kube, &cli.exclude).await?;
            audit::run_audit(&pods, &checks, logger, format)?;
        }
        Commands::Analyze {
            config,
            output,
            report,
            console,
        } => {
            let options = analyze::AnalyzeOptions {
                config,
                output,
                report,
                console,
            };
            analyze::run_analysis(&kube, &cli.exclude, logger, options).await?;
        }
        Commands::InitConfig { output } => {
            setup::init_config(&output)?;
        }
        Commands::TestApi { config } => {
            setup::test_api(&config).await?;
        }
    }

    Ok(())
}
