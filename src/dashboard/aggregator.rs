//! Statistics aggregation for one dashboard fetch cycle.
//!
//! A cycle fetches the survey list, fans out one response-count lookup
//! per survey, and folds everything into a [`DashboardSnapshot`]. Only
//! the survey listing can fail the cycle; every downstream input is
//! degraded to zero instead of erroring, trading completeness for
//! availability of the dashboard view.

use crate::gateway::{SurveyApi, TransportError};
use crate::models::{DashboardSnapshot, DashboardStats, Survey, RECENT_SURVEYS_LIMIT};
use futures::future::join_all;
use std::collections::HashMap;
use tracing::debug;

/// Run one fetch cycle and derive a consistent snapshot.
///
/// # Errors
///
/// Returns `TransportError` only when the survey listing itself fails;
/// in that case no response-count lookups are attempted. Individual
/// count lookups cannot fail the cycle.
pub async fn fetch_dashboard<S: SurveyApi>(api: &S) -> Result<DashboardSnapshot, TransportError> {
    let surveys = api.list_surveys().await?;
    let stats = compute_stats(api, &surveys).await;
    let recent = recent_surveys(&surveys);
    Ok(DashboardSnapshot { stats, recent })
}

async fn compute_stats<S: SurveyApi>(api: &S, surveys: &[Survey]) -> DashboardStats {
    let total_surveys = surveys.len();
    let total_questions = surveys.iter().map(Survey::question_count).sum();

    let counts = gather_response_counts(api, surveys).await;
    // Counts are already neutralized per survey; the saturating fold keeps
    // even a pathological sum from aborting the cycle.
    let total_responses = counts.values().copied().fold(0u64, u64::saturating_add);

    debug!("aggregated {total_surveys} surveys, {total_responses} responses");

    DashboardStats {
        total_surveys,
        total_questions,
        total_responses,
        avg_engagement: average_engagement(total_surveys, total_responses),
    }
}

/// Fan out one count lookup per survey and wait for all of them.
///
/// Results are keyed by survey id rather than position, so the fold
/// stays correct regardless of completion order.
async fn gather_response_counts<S: SurveyApi>(
    api: &S,
    surveys: &[Survey],
) -> HashMap<i64, u64> {
    let lookups = surveys.iter().map(|survey| {
        let id = survey.id;
        async move { (id, api.response_count(id).await) }
    });

    join_all(lookups).await.into_iter().collect()
}

/// Responses per survey, rounded to one decimal. Zero whenever either
/// total is zero, so no division is attempted on an empty dashboard.
fn average_engagement(total_surveys: usize, total_responses: u64) -> f64 {
    if total_surveys == 0 || total_responses == 0 {
        return 0.0;
    }
    round1(total_responses as f64 / total_surveys as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The first few surveys in server-supplied order.
fn recent_surveys(surveys: &[Survey]) -> Vec<Survey> {
    surveys.iter().take(RECENT_SURVEYS_LIMIT).cloned().collect()
}
