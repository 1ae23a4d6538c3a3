use super::ReportError;
use crate::models::{AnalysisResult, BatchSummary, SecurityLevel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};
use tracing::info;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Kubernetes Pod Security Analysis Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; line-height: 1.6; }
        .header { background: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .summary { display: flex; gap: 20px; margin-bottom: 20px; }
        .stat-card { background: white; border: 1px solid #dee2e6; border-radius: 8px; padding: 15px; flex: 1; text-align: center; }
        .safe { border-left: 4px solid #28a745; }
        .moderate { border-left: 4px solid #ffc107; }
        .high-risk { border-left: 4px solid #fd7e14; }
        .critical { border-left: 4px solid #dc3545; }
        .unknown { border-left: 4px solid #6c757d; }
        .pod-card { background: white; border: 1px solid #dee2e6; border-radius: 8px; margin: 10px 0; padding: 20px; }
        .pod-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 15px; }
        .security-level { padding: 4px 12px; border-radius: 20px; font-size: 12px; font-weight: bold; text-transform: uppercase; }
        .level-safe { background: #d4edda; color: #155724; }
        .level-moderate { background: #fff3cd; color: #856404; }
        .level-high-risk { background: #f8d7da; color: #721c24; }
        .level-critical { background: #f5c6cb; color: #721c24; }
        .level-unknown { background: #e2e3e5; color: #383d41; }
        .issues li { color: #dc3545; margin: 5px 0; }
        .recommendations li { color: #28a745; margin: 5px 0; }
        h1, h2, h3 { color: #333; }
    </style>
</head>
<body>
    <div class="header">
        <h1>Kubernetes Pod Security Analysis Report</h1>
        <p>Generated at: {{ generated_at }}</p>
        <p>Pods analyzed: {{ total_pods }}</p>
    </div>
    <div class="summary">
    {%- for card in cards %}
        <div class="stat-card {{ card.slug }}">
            <h3>{{ card.label }}</h3>
            <h2>{{ card.count }}</h2>
        </div>
    {%- endfor %}
    </div>
    <h2>Detailed Results</h2>
    {%- for analysis in analyses %}
    <div class="pod-card">
        <div class="pod-header">
            <div><h3>{{ analysis.namespace }} / {{ analysis.pod }}</h3></div>
            <span class="security-level level-{{ analysis.slug }}">{{ analysis.level }}</span>
        </div>
        {%- if analysis.issues %}
        <div class="issues"><h4>Issues found:</h4><ul>
            {%- for issue in analysis.issues %}
            <li>{{ issue }}</li>
            {%- endfor %}
        </ul></div>
        {%- endif %}
        {%- if analysis.recommendations %}
        <div class="recommendations"><h4>Recommendations:</h4><ul>
            {%- for rec in analysis.recommendations %}
            <li>{{ rec }}</li>
            {%- endfor %}
        </ul></div>
        {%- endif %}
    </div>
    {%- endfor %}
</body>
</html>
"#;

#[derive(Serialize)]
struct SummaryCard {
    slug: String,
    label: &'static str,
    count: usize,
}

#[derive(Serialize)]
struct WorkloadSection<'a> {
    namespace: &'a str,
    pod: &'a str,
    level: &'static str,
    slug: String,
    issues: &'a [String],
    recommendations: &'a [String],
}

fn label(level: SecurityLevel) -> &'static str {
    match level {
        SecurityLevel::Safe => "Safe",
        SecurityLevel::Moderate => "Moderate",
        SecurityLevel::HighRisk => "High Risk",
        SecurityLevel::Critical => "Critical",
        SecurityLevel::Unknown => "Unknown",
    }
}

/// Render the HTML report
///
/// Model-produced text is escaped before it reaches the page.
pub fn render_html(
    results: &[AnalysisResult],
    generated_at: DateTime<Utc>,
) -> Result<String, ReportError> {
    let summary = BatchSummary::from_results(results);
    let cards: Vec<SummaryCard> = SecurityLevel::ALL
        .iter()
        .map(|level| SummaryCard {
            slug: level.slug(),
            label: label(*level),
            count: summary.count(*level),
        })
        .collect();
    let analyses: Vec<WorkloadSection> = results
        .iter()
        .map(|r| WorkloadSection {
            namespace: &r.namespace,
            pod: &r.pod,
            level: r.security_level.as_str(),
            slug: r.security_level.slug(),
            issues: &r.issues,
            recommendations: &r.recommendations,
        })
        .collect();

    let mut context = Context::new();
    context.insert(
        "generated_at",
        &generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    context.insert("total_pods", &results.len());
    context.insert("cards", &cards);
    context.insert("analyses", &analyses);

    Ok(Tera::one_off(TEMPLATE, &context, true)?)
}

/// Write the HTML report to `path`
pub fn write_html(
    results: &[AnalysisResult],
    generated_at: DateTime<Utc>,
    path: &Path,
) -> Result<(), ReportError> {
    let page = render_html(results, generated_at)?;
    std::fs::write(path, page)?;
    info!(path = %path.display(), workloads = results.len(), "HTML report written");
    Ok(())
}
