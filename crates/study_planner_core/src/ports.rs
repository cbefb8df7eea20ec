//! crates/study_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or LLM APIs.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    EditalAnalysis, Id, NewPdf, NewSchedule, NewSession, PdfDocument, PdfUpdate, ScheduleUpdate,
    StudySchedule, StudySession, User, UserStats,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The repository boundary. The in-memory adapter backs the running service
/// and tests; a database adapter can slot in behind the same trait.
///
/// Id generation belongs to the store: every `create_*` issues the next id
/// atomically.
#[async_trait]
pub trait StorageService: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Id) -> PortResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>>;
    async fn create_user(&self, username: &str, password: &str) -> PortResult<User>;

    // --- Schedules ---
    async fn schedules_by_user(&self, user_id: Id) -> PortResult<Vec<StudySchedule>>;
    async fn get_schedule(&self, id: Id) -> PortResult<Option<StudySchedule>>;
    async fn create_schedule(&self, user_id: Id, schedule: NewSchedule)
        -> PortResult<StudySchedule>;
    async fn update_schedule(
        &self,
        id: Id,
        updates: ScheduleUpdate,
    ) -> PortResult<Option<StudySchedule>>;
    /// Returns `true` if a schedule was deleted. Sessions pointing at it keep
    /// existing with their `schedule_id` nulled out.
    async fn delete_schedule(&self, id: Id) -> PortResult<bool>;

    // --- Study Sessions ---
    async fn sessions_by_user(&self, user_id: Id) -> PortResult<Vec<StudySession>>;
    /// The most recent sessions for a user, newest first.
    async fn recent_sessions(&self, user_id: Id, limit: usize) -> PortResult<Vec<StudySession>>;
    async fn create_session(&self, user_id: Id, session: NewSession) -> PortResult<StudySession>;

    // --- PDF Documents ---
    async fn pdfs_by_user(&self, user_id: Id) -> PortResult<Vec<PdfDocument>>;
    async fn get_pdf(&self, id: Id) -> PortResult<Option<PdfDocument>>;
    async fn create_pdf(&self, user_id: Id, pdf: NewPdf) -> PortResult<PdfDocument>;
    async fn update_pdf(&self, id: Id, updates: PdfUpdate) -> PortResult<Option<PdfDocument>>;
    /// Returns `true` if a PDF was deleted. Schedules referencing it keep
    /// existing with their `edital_pdf_id` nulled out.
    async fn delete_pdf(&self, id: Id) -> PortResult<bool>;

    // --- Stats ---
    async fn user_stats(&self, user_id: Id) -> PortResult<UserStats>;
}

/// Extracts plain text from a PDF via an external service.
#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Fails if the remote call errors, times out, or returns empty text.
    async fn extract_text(&self, pdf_bytes: &[u8]) -> PortResult<String>;
}

/// Turns extracted edital text into a structured study plan via an external
/// language model.
#[async_trait]
pub trait EditalAnalysisService: Send + Sync {
    /// Fails if the remote call errors, times out, returns unparseable output
    /// or an analysis with no subjects.
    async fn analyze(&self, edital_text: &str, exam_date: NaiveDate)
        -> PortResult<EditalAnalysis>;
}
