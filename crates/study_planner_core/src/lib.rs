pub mod domain;
pub mod heuristic;
pub mod pipeline;
pub mod ports;
pub mod schedule;
pub mod stats;

pub use domain::{
    EditalAnalysis, Id, NewPdf, NewSchedule, NewSession, PdfDocument, PdfUpdate, ScheduleUpdate,
    StudyBlock, StudySchedule, StudySession, User, UserStats, WeeklyPlan,
};
pub use pipeline::{AiScheduleOutcome, AiScheduleRequest, AnalysisSummary, SchedulePlanner};
pub use ports::{
    EditalAnalysisService, PortError, PortResult, StorageService, TextExtractionService,
};
pub use schedule::{PlanError, ScheduleDraft, MAX_HOURS_PER_DAY};
