//! crates/study_planner_core/src/pipeline.rs
//!
//! The AI schedule-generation pipeline: upload -> text extraction -> LLM
//! analysis -> heuristic fallback -> schedule synthesis -> persisted record.
//!
//! The LLM path is attempted first; on any failure (remote error, timeout,
//! malformed response) the pipeline substitutes the heuristic analysis
//! instead of failing the request. Raw remote errors never reach the caller.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{EditalAnalysis, Id, NewPdf, PdfDocument, StudySchedule};
use crate::heuristic;
use crate::ports::{EditalAnalysisService, StorageService, TextExtractionService};
use crate::schedule::{self, PlanError};

/// Input to the pipeline, as received from the upload endpoint.
#[derive(Debug, Clone)]
pub struct AiScheduleRequest {
    pub filename: String,
    pub pdf_bytes: Vec<u8>,
    pub exam_date: NaiveDate,
    pub title: Option<String>,
}

/// The analysis summary reported back alongside the stored schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub subjects: Vec<String>,
    pub topics: BTreeMap<String, Vec<String>>,
    pub days_until_exam: i64,
    pub total_estimated_hours: u32,
    pub edital_pdf: PdfDocument,
}

/// Successful pipeline outcome: the persisted schedule plus its summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiScheduleOutcome {
    pub schedule: StudySchedule,
    pub analysis: AnalysisSummary,
}

/// Orchestrates schedule generation over the storage and LLM ports.
///
/// The LLM ports are optional: when absent (no API key configured) the
/// pipeline goes straight to the heuristic analyzer.
#[derive(Clone)]
pub struct SchedulePlanner {
    store: Arc<dyn StorageService>,
    extraction: Option<Arc<dyn TextExtractionService>>,
    analysis: Option<Arc<dyn EditalAnalysisService>>,
}

impl SchedulePlanner {
    pub fn new(
        store: Arc<dyn StorageService>,
        extraction: Option<Arc<dyn TextExtractionService>>,
        analysis: Option<Arc<dyn EditalAnalysisService>>,
    ) -> Self {
        Self {
            store,
            extraction,
            analysis,
        }
    }

    /// Runs the full pipeline for one upload.
    ///
    /// Validation failures (empty file, non-PDF name, past exam date) are
    /// returned before anything is persisted. After that, the edital PDF is
    /// stored first, then the schedule; a schedule is only ever persisted
    /// with all fields populated.
    pub async fn generate(
        &self,
        user_id: Id,
        request: AiScheduleRequest,
    ) -> Result<AiScheduleOutcome, PlanError> {
        let today = Utc::now().date_naive();
        self.validate(&request, today)?;

        let edital_pdf = self
            .store
            .create_pdf(
                user_id,
                NewPdf {
                    title: request
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("Edital - {}", request.filename)),
                    filename: request.filename.clone(),
                },
            )
            .await
            .map_err(|e| PlanError::Processing(e.to_string()))?;

        let analysis = match self.remote_analysis(&request).await {
            Ok(analysis) => {
                info!(filename = %request.filename, "edital analyzed by LLM");
                analysis
            }
            Err(e) => {
                warn!(
                    filename = %request.filename,
                    error = %e,
                    "LLM analysis unavailable, using heuristic fallback"
                );
                heuristic::analyze(&request.filename)
            }
        };

        let draft = schedule::synthesize(
            &analysis,
            request.exam_date,
            today,
            request.title,
            Some(edital_pdf.id),
        )?;

        let stored = self
            .store
            .create_schedule(user_id, draft.schedule)
            .await
            .map_err(|e| PlanError::Processing(e.to_string()))?;

        Ok(AiScheduleOutcome {
            schedule: stored,
            analysis: AnalysisSummary {
                subjects: analysis.subjects,
                topics: analysis.topics,
                days_until_exam: draft.days_until_exam,
                total_estimated_hours: draft.total_estimated_hours,
                edital_pdf,
            },
        })
    }

    fn validate(&self, request: &AiScheduleRequest, today: NaiveDate) -> Result<(), PlanError> {
        if request.pdf_bytes.is_empty() {
            return Err(PlanError::Validation(
                "PDF do edital é obrigatório".to_string(),
            ));
        }
        if !request.filename.to_lowercase().ends_with(".pdf") {
            return Err(PlanError::Validation(
                "O arquivo enviado deve ser um PDF".to_string(),
            ));
        }
        if request.exam_date <= today {
            return Err(PlanError::Validation(
                "Data do concurso deve ser futura".to_string(),
            ));
        }
        Ok(())
    }

    /// Attempts the LLM path: extract text, then analyze it. Any missing
    /// adapter or remote failure is reported as an error for the caller to
    /// fall back on.
    async fn remote_analysis(
        &self,
        request: &AiScheduleRequest,
    ) -> Result<EditalAnalysis, PlanError> {
        let extraction = self
            .extraction
            .as_ref()
            .ok_or_else(|| PlanError::Extraction("no extraction service configured".into()))?;
        let analysis = self
            .analysis
            .as_ref()
            .ok_or_else(|| PlanError::Analysis("no analysis service configured".into()))?;

        let text = extraction
            .extract_text(&request.pdf_bytes)
            .await
            .map_err(|e| PlanError::Extraction(e.to_string()))?;

        analysis
            .analyze(&text, request.exam_date)
            .await
            .map_err(|e| PlanError::Analysis(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        NewSchedule, NewSession, PdfUpdate, ScheduleUpdate, StudySession, User, UserStats,
    };
    use crate::ports::{PortError, PortResult};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;

    /// Minimal storage stub: records created PDFs and schedules.
    #[derive(Default)]
    struct StubStore {
        pdfs: Mutex<Vec<PdfDocument>>,
        schedules: Mutex<Vec<StudySchedule>>,
    }

    #[async_trait]
    impl StorageService for StubStore {
        async fn get_user(&self, _id: Id) -> PortResult<Option<User>> {
            Ok(None)
        }
        async fn get_user_by_username(&self, _username: &str) -> PortResult<Option<User>> {
            Ok(None)
        }
        async fn create_user(&self, _username: &str, _password: &str) -> PortResult<User> {
            Err(PortError::Unexpected("not used".into()))
        }
        async fn schedules_by_user(&self, _user_id: Id) -> PortResult<Vec<StudySchedule>> {
            Ok(self.schedules.lock().unwrap().clone())
        }
        async fn get_schedule(&self, _id: Id) -> PortResult<Option<StudySchedule>> {
            Ok(None)
        }
        async fn create_schedule(
            &self,
            user_id: Id,
            schedule: NewSchedule,
        ) -> PortResult<StudySchedule> {
            let mut schedules = self.schedules.lock().unwrap();
            let stored = StudySchedule {
                id: schedules.len() as Id + 1,
                user_id,
                title: schedule.title,
                description: schedule.description,
                subjects: schedule.subjects,
                start_date: schedule.start_date,
                end_date: schedule.end_date,
                hours_per_day: schedule.hours_per_day,
                created_at: Utc::now(),
                exam_date: schedule.exam_date,
                edital_pdf_id: schedule.edital_pdf_id,
                weekly_plan: schedule.weekly_plan,
                is_ai_generated: schedule.is_ai_generated,
            };
            schedules.push(stored.clone());
            Ok(stored)
        }
        async fn update_schedule(
            &self,
            _id: Id,
            _updates: ScheduleUpdate,
        ) -> PortResult<Option<StudySchedule>> {
            Ok(None)
        }
        async fn delete_schedule(&self, _id: Id) -> PortResult<bool> {
            Ok(false)
        }
        async fn sessions_by_user(&self, _user_id: Id) -> PortResult<Vec<StudySession>> {
            Ok(vec![])
        }
        async fn recent_sessions(
            &self,
            _user_id: Id,
            _limit: usize,
        ) -> PortResult<Vec<StudySession>> {
            Ok(vec![])
        }
        async fn create_session(
            &self,
            _user_id: Id,
            _session: NewSession,
        ) -> PortResult<StudySession> {
            Err(PortError::Unexpected("not used".into()))
        }
        async fn pdfs_by_user(&self, _user_id: Id) -> PortResult<Vec<PdfDocument>> {
            Ok(self.pdfs.lock().unwrap().clone())
        }
        async fn get_pdf(&self, _id: Id) -> PortResult<Option<PdfDocument>> {
            Ok(None)
        }
        async fn create_pdf(&self, user_id: Id, pdf: NewPdf) -> PortResult<PdfDocument> {
            let mut pdfs = self.pdfs.lock().unwrap();
            let stored = PdfDocument {
                id: pdfs.len() as Id + 1,
                user_id,
                title: pdf.title,
                filename: pdf.filename,
                uploaded_at: Utc::now(),
                last_read_page: 1,
            };
            pdfs.push(stored.clone());
            Ok(stored)
        }
        async fn update_pdf(
            &self,
            _id: Id,
            _updates: PdfUpdate,
        ) -> PortResult<Option<PdfDocument>> {
            Ok(None)
        }
        async fn delete_pdf(&self, _id: Id) -> PortResult<bool> {
            Ok(false)
        }
        async fn user_stats(&self, _user_id: Id) -> PortResult<UserStats> {
            Ok(UserStats {
                total_hours: 0,
                completed_sessions: 0,
                current_streak: 0,
            })
        }
    }

    struct FixedExtraction;
    #[async_trait]
    impl TextExtractionService for FixedExtraction {
        async fn extract_text(&self, _pdf_bytes: &[u8]) -> PortResult<String> {
            Ok("Edital de concurso público.".to_string())
        }
    }

    struct FailingExtraction;
    #[async_trait]
    impl TextExtractionService for FailingExtraction {
        async fn extract_text(&self, _pdf_bytes: &[u8]) -> PortResult<String> {
            Err(PortError::Unexpected("remote service down".into()))
        }
    }

    struct FixedAnalysis(EditalAnalysis);
    #[async_trait]
    impl EditalAnalysisService for FixedAnalysis {
        async fn analyze(
            &self,
            _edital_text: &str,
            _exam_date: NaiveDate,
        ) -> PortResult<EditalAnalysis> {
            Ok(self.0.clone())
        }
    }

    struct FailingAnalysis;
    #[async_trait]
    impl EditalAnalysisService for FailingAnalysis {
        async fn analyze(
            &self,
            _edital_text: &str,
            _exam_date: NaiveDate,
        ) -> PortResult<EditalAnalysis> {
            Err(PortError::Unexpected("malformed response".into()))
        }
    }

    fn request(days_out: i64) -> AiScheduleRequest {
        AiScheduleRequest {
            filename: "trt_tecnico.pdf".to_string(),
            pdf_bytes: vec![0x25, 0x50, 0x44, 0x46],
            exam_date: Utc::now().date_naive() + Duration::days(days_out),
            title: None,
        }
    }

    #[tokio::test]
    async fn rejects_missing_file_before_persisting() {
        let store = Arc::new(StubStore::default());
        let planner = SchedulePlanner::new(store.clone(), None, None);
        let mut req = request(30);
        req.pdf_bytes.clear();

        let err = planner.generate(1, req).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
        assert!(store.pdfs.lock().unwrap().is_empty());
        assert!(store.schedules.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_non_pdf_filename() {
        let planner = SchedulePlanner::new(Arc::new(StubStore::default()), None, None);
        let mut req = request(30);
        req.filename = "edital.docx".to_string();

        let err = planner.generate(1, req).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_past_exam_date() {
        let planner = SchedulePlanner::new(Arc::new(StubStore::default()), None, None);
        let err = planner.generate(1, request(-1)).await.unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[tokio::test]
    async fn uses_llm_analysis_when_available() {
        let mut llm_analysis = heuristic::analyze("ignored.pdf");
        llm_analysis.subjects = vec!["Direito Tributário".to_string()];
        let store = Arc::new(StubStore::default());
        let planner = SchedulePlanner::new(
            store.clone(),
            Some(Arc::new(FixedExtraction)),
            Some(Arc::new(FixedAnalysis(llm_analysis))),
        );

        let outcome = planner.generate(1, request(30)).await.unwrap();
        assert_eq!(outcome.analysis.subjects, vec!["Direito Tributário"]);
        assert!(outcome.schedule.is_ai_generated);
        assert_eq!(outcome.schedule.edital_pdf_id, Some(outcome.analysis.edital_pdf.id));
    }

    #[tokio::test]
    async fn falls_back_to_heuristic_when_extraction_fails() {
        let store = Arc::new(StubStore::default());
        let planner = SchedulePlanner::new(
            store.clone(),
            Some(Arc::new(FailingExtraction)),
            Some(Arc::new(FailingAnalysis)),
        );

        let outcome = planner.generate(1, request(30)).await.unwrap();
        // Heuristic branch for "trt_tecnico.pdf" is the labor-law set.
        assert!(outcome
            .analysis
            .subjects
            .iter()
            .any(|s| s == "Direito do Trabalho"));
        assert_eq!(store.schedules.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_heuristic_when_analysis_fails() {
        let planner = SchedulePlanner::new(
            Arc::new(StubStore::default()),
            Some(Arc::new(FixedExtraction)),
            Some(Arc::new(FailingAnalysis)),
        );

        let outcome = planner.generate(1, request(30)).await.unwrap();
        assert!(outcome
            .analysis
            .subjects
            .iter()
            .any(|s| s == "Português"));
    }

    #[tokio::test]
    async fn goes_straight_to_heuristic_without_llm_adapters() {
        let planner = SchedulePlanner::new(Arc::new(StubStore::default()), None, None);
        let outcome = planner.generate(1, request(30)).await.unwrap();
        assert!(outcome.analysis.subjects.len() >= 3);
        assert!(outcome.schedule.weekly_plan.is_some());
    }

    #[tokio::test]
    async fn stored_pdf_gets_default_edital_title() {
        let store = Arc::new(StubStore::default());
        let planner = SchedulePlanner::new(store.clone(), None, None);
        planner.generate(1, request(30)).await.unwrap();

        let pdfs = store.pdfs.lock().unwrap();
        assert_eq!(pdfs[0].title, "Edital - trt_tecnico.pdf");
    }
}
