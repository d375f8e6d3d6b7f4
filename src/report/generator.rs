//! Markdown and JSON rendering of dashboard snapshots.

use crate::models::{DashboardSnapshot, Survey};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about one rendered dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Base URL of the survey service the data came from.
    pub api_url: String,
    /// When the fetch cycle completed.
    pub generated_at: DateTime<Utc>,
    /// How long the fetch cycle took.
    pub duration_seconds: f64,
}

/// A snapshot plus the metadata needed to render it standalone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# Survey Dashboard\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_stats_section(&report.snapshot));
    output.push_str(&generate_recent_section(&report.snapshot.recent));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!("- **Survey Service:** {}\n", metadata.api_url));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Fetch Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_stats_section(snapshot: &DashboardSnapshot) -> String {
    let stats = &snapshot.stats;
    let mut section = String::new();

    section.push_str("## Statistics\n\n");
    section.push_str("| 📊 Surveys | ❓ Questions | 📝 Responses | 📈 Avg. Engagement |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {:.1} |\n\n",
        stats.total_surveys, stats.total_questions, stats.total_responses, stats.avg_engagement
    ));
    section.push_str("*Avg. engagement is responses per survey.*\n\n");

    section
}

fn generate_recent_section(recent: &[Survey]) -> String {
    let mut section = String::new();

    section.push_str("## Recent Surveys\n\n");

    if recent.is_empty() {
        section.push_str("No surveys yet. Create your first survey to get started.\n\n");
        return section;
    }

    for survey in recent {
        section.push_str(&generate_survey_block(survey));
    }

    section
}

fn generate_survey_block(survey: &Survey) -> String {
    let mut block = String::new();

    block.push_str(&format!("### {}\n\n", survey.title));
    block.push_str(&format!(
        "*{} | {} questions | by {} | created {}*\n\n",
        survey.display_status(),
        survey.question_count(),
        survey.display_creator(),
        survey.created_at_display()
    ));

    if let Some(ref description) = survey.description {
        if !description.is_empty() {
            block.push_str(&format!("{description}\n\n"));
        }
    }

    block
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Generated by surveydash v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
