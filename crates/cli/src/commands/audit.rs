//! Baseline hardening audit command

use anyhow::Result;
use k8s_openapi::api::core::v1::Pod;
use posture_lib::{AuditLogger, CheckId, RuleEngine, RuleReport};
use tabled::Tabled;

use crate::output::{finding_detail, finding_line, print_info, OutputFormat};

const NO_FINDINGS: &str = "No findings!";

/// Row for findings table
#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Evaluate the rule catalog over the snapshot and print the findings
pub fn run_audit(
    pods: &[Pod],
    checks: &[CheckId],
    logger: AuditLogger,
    format: OutputFormat,
) -> Result<()> {
    let engine = RuleEngine::with_checks(checks).with_logger(logger);
    let reports = engine.run(pods);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print!("{}", render_text(&reports));
        }
        OutputFormat::Table => {
            for report in &reports {
                println!("Findings for the {} check", report.title);
                if report.findings.is_empty() {
                    println!("{}\n", NO_FINDINGS);
                    continue;
                }

                let rows: Vec<FindingRow> = report
                    .findings
                    .iter()
                    .map(|f| FindingRow {
                        namespace: f.namespace.clone(),
                        pod: f.pod.clone(),
                        container: f.container.clone().unwrap_or_else(|| "-".to_string()),
                        detail: finding_detail(f),
                    })
                    .collect();

                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}\n", table);
            }

            let total: usize = reports.iter().map(|r| r.findings.len()).sum();
            print_info(&format!(
                "{} findings across {} workloads",
                total,
                pods.len()
            ));
        }
    }

    Ok(())
}

/// Line-oriented report: a header per check, one line per finding
pub fn render_text(reports: &[RuleReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!("Findings for the {} check\n", report.title));
        if report.findings.is_empty() {
            out.push_str(NO_FINDINGS);
            out.push('\n');
        }
        for finding in &report.findings {
            out.push_str(&finding_line(finding));
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
