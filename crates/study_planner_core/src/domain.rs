//! crates/study_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any backing store; the serde attributes
//! mirror the camelCase wire format the web client expects.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Store-issued identifier. Each collection hands these out sequentially.
pub type Id = i64;

/// A registered user. Created once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub password: String,
}

/// One block of study time inside a weekly plan: a subject, the topics to
/// cover and the hours to spend on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyBlock {
    pub subject: String,
    pub topics: Vec<String>,
    pub hours: u32,
}

/// Weekday name ("Segunda" .. "Domingo") to the study blocks planned for it.
pub type WeeklyPlan = BTreeMap<String, Vec<StudyBlock>>;

/// The structured result of analyzing an exam announcement (edital), whether
/// produced by the LLM or by the heuristic fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditalAnalysis {
    pub subjects: Vec<String>,
    pub topics: BTreeMap<String, Vec<String>>,
    pub priority: Vec<String>,
    pub hours_per_subject: BTreeMap<String, u32>,
    pub weekly_plan: WeeklyPlan,
}

/// A user's study plan over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySchedule {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub subjects: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_per_day: u32,
    pub created_at: DateTime<Utc>,
    pub exam_date: Option<NaiveDate>,
    /// Weak reference to the edital PDF this schedule was generated from.
    pub edital_pdf_id: Option<Id>,
    pub weekly_plan: Option<WeeklyPlan>,
    pub is_ai_generated: bool,
}

/// Insert shape for a schedule; the store fills in `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub title: String,
    pub description: Option<String>,
    pub subjects: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_per_day: u32,
    pub exam_date: Option<NaiveDate>,
    pub edital_pdf_id: Option<Id>,
    pub weekly_plan: Option<WeeklyPlan>,
    #[serde(default)]
    pub is_ai_generated: bool,
}

/// Partial update for a schedule. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub hours_per_day: Option<u32>,
    pub exam_date: Option<NaiveDate>,
    pub weekly_plan: Option<WeeklyPlan>,
}

/// A completed study session. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: Id,
    pub user_id: Id,
    /// Weak reference to the schedule this session belonged to, if any.
    pub schedule_id: Option<Id>,
    pub subject: String,
    /// Duration in minutes, always positive.
    pub duration: u32,
    pub completed_at: DateTime<Utc>,
}

/// Insert shape for a session; `completed_at` is stamped by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub schedule_id: Option<Id>,
    pub subject: String,
    pub duration: u32,
}

/// A PDF uploaded by a user, either for the text-to-speech reader or as the
/// edital behind an AI-generated schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfDocument {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    /// Reader position, 1-based. Defaults to 1 on upload.
    pub last_read_page: u32,
}

/// Insert shape for a PDF document.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPdf {
    pub title: String,
    pub filename: String,
}

/// Partial update for a PDF document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfUpdate {
    pub title: Option<String>,
    pub filename: Option<String>,
    pub last_read_page: Option<u32>,
}

/// Aggregate study statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_hours: u32,
    pub completed_sessions: u32,
    /// Consecutive calendar days ending today with at least one session,
    /// capped at 30.
    pub current_streak: u32,
}
