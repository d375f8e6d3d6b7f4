//! Data models for the survey dashboard client.
//!
//! This module contains all the core data structures used throughout
//! the application for representing surveys, responses, and dashboard
//! statistics.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How many surveys the dashboard shows in its recent list.
pub const RECENT_SURVEYS_LIMIT: usize = 3;

/// Lifecycle status of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyStatus {
    /// Accepting responses.
    Active,
    /// Not yet published.
    Draft,
    /// Closed to new responses.
    Archived,
}

impl SurveyStatus {
    /// Normalize a raw status string from the wire.
    ///
    /// The server may send null, mixed case, or values this client does not
    /// know; all of those display as `Active`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_uppercase()).as_deref() {
            Some("DRAFT") => SurveyStatus::Draft,
            Some("ARCHIVED") => SurveyStatus::Archived,
            _ => SurveyStatus::Active,
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurveyStatus::Active => write!(f, "ACTIVE"),
            SurveyStatus::Draft => write!(f, "DRAFT"),
            SurveyStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// A survey as served by the remote API.
///
/// Wire shape is camelCase JSON. Most fields are optional because the
/// backend tolerates sparse rows; only `id` is guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Serialized question list. Opaque; may fail to decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_email: Option<String>,
    /// Creation timestamp as sent by the server (no timezone guarantee).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Survey {
    /// Number of questions in this survey.
    ///
    /// `questions_json` is decoded defensively: a missing payload, invalid
    /// JSON, or a non-array value all count as zero questions. Decoding
    /// failure never fails the owning survey.
    pub fn question_count(&self) -> usize {
        let raw = self.questions_json.as_deref().unwrap_or("[]");
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(questions)) => questions.len(),
            Ok(_) | Err(_) => 0,
        }
    }

    /// Status for display, defaulting null/unknown values to `ACTIVE`.
    pub fn display_status(&self) -> SurveyStatus {
        SurveyStatus::from_raw(self.status.as_deref())
    }

    /// Creator email for display, with the same fallback the web UI used.
    pub fn display_creator(&self) -> &str {
        self.creator_email.as_deref().unwrap_or("Anonymous")
    }

    /// Creation date formatted as e.g. `Jan 5, 2026`, or `N/A` when the
    /// timestamp is absent or unparsable.
    pub fn created_at_display(&self) -> String {
        self.created_at
            .as_deref()
            .and_then(parse_server_datetime)
            .map(|date| date.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Parse the handful of timestamp shapes the backend is known to emit.
fn parse_server_datetime(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    // Java LocalDateTime serializes without an offset, with optional fraction
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Payload for creating or updating a survey.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSurvey {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl NewSurvey {
    /// Build a payload from a plain question list.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the question list cannot be encoded.
    pub fn from_questions(
        title: String,
        description: Option<String>,
        questions: &[String],
        creator_email: Option<String>,
        status: Option<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            title,
            description,
            questions_json: serde_json::to_string(questions)?,
            creator_email,
            status,
        })
    }
}

/// A submitted response as served by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    pub id: i64,
    #[serde(default)]
    pub survey_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SurveyResponse {
    /// Number of answers in this response, decoded with the same
    /// tolerance as [`Survey::question_count`].
    pub fn answer_count(&self) -> usize {
        let raw = self.answers_json.as_deref().unwrap_or("[]");
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(answers)) => answers.len(),
            Ok(_) | Err(_) => 0,
        }
    }
}

/// Payload for submitting a response to a survey.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResponse {
    pub answers_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,
}

impl NewResponse {
    /// Build a payload from a plain answer list.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the answer list cannot be encoded.
    pub fn from_answers(
        answers: &[String],
        respondent_email: Option<String>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            answers_json: serde_json::to_string(answers)?,
            respondent_email,
        })
    }
}

/// Aggregated dashboard statistics, recomputed on every fetch cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Number of surveys fetched.
    pub total_surveys: usize,
    /// Questions across all surveys (undecodable payloads count zero).
    pub total_questions: usize,
    /// Responses across all surveys (failed lookups count zero).
    pub total_responses: u64,
    /// Responses per survey, rounded to one decimal.
    pub avg_engagement: f64,
}

/// One consistent view of the dashboard: statistics plus the recent list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub recent: Vec<Survey>,
}
