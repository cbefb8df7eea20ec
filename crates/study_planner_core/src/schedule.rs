//! crates/study_planner_core/src/schedule.rs
//!
//! Schedule synthesis: turns an `EditalAnalysis` plus exam-date arithmetic
//! into the schedule record to persist.

use chrono::NaiveDate;

use crate::domain::{EditalAnalysis, Id, NewSchedule};

/// Hard cap on the computed daily study load. Demand beyond this is silently
/// truncated rather than rejected.
pub const MAX_HOURS_PER_DAY: u32 = 12;

/// Error taxonomy for the schedule-generation pipeline.
///
/// `Validation` is surfaced to the caller verbatim (HTTP 400). `Extraction`
/// and `Analysis` are caught at the pipeline boundary and trigger the
/// heuristic fallback. `Processing` is the catch-all surfaced as HTTP 500.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("{0}")]
    Validation(String),
    #[error("Falha ao extrair texto do PDF: {0}")]
    Extraction(String),
    #[error("Falha ao analisar o edital: {0}")]
    Analysis(String),
    #[error("Erro ao gerar cronograma: {0}")]
    Processing(String),
}

/// Everything needed to persist an AI-generated schedule, plus the derived
/// numbers the caller reports back to the client.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    pub schedule: NewSchedule,
    pub days_until_exam: i64,
    pub total_estimated_hours: u32,
}

/// Computes the schedule fields from an analysis and the exam date.
///
/// Fails with `PlanError::Validation` when the exam date is not in the
/// future. `hours_per_day` is the ceiling of total demand over the remaining
/// days, clamped to `1..=MAX_HOURS_PER_DAY`; with one day left it may
/// legitimately sit at the cap.
pub fn synthesize(
    analysis: &EditalAnalysis,
    exam_date: NaiveDate,
    today: NaiveDate,
    title: Option<String>,
    edital_pdf_id: Option<Id>,
) -> Result<ScheduleDraft, PlanError> {
    let days_until_exam = (exam_date - today).num_days();
    if days_until_exam <= 0 {
        return Err(PlanError::Validation(
            "Data do concurso deve ser futura".to_string(),
        ));
    }

    let total_estimated_hours: u32 = analysis.hours_per_subject.values().sum();

    let ceil_hours = (i64::from(total_estimated_hours) + days_until_exam - 1) / days_until_exam;
    let hours_per_day = (ceil_hours as u32).clamp(1, MAX_HOURS_PER_DAY);

    let title =
        title.unwrap_or_else(|| format!("Cronograma - {}", analysis.subjects.join(", ")));
    let description = format!(
        "Cronograma gerado automaticamente baseado no edital. {} dias até o concurso.",
        days_until_exam
    );

    let schedule = NewSchedule {
        title,
        description: Some(description),
        subjects: analysis.subjects.clone(),
        start_date: today,
        end_date: exam_date,
        hours_per_day,
        exam_date: Some(exam_date),
        edital_pdf_id,
        weekly_plan: Some(analysis.weekly_plan.clone()),
        is_ai_generated: true,
    };

    Ok(ScheduleDraft {
        schedule,
        days_until_exam,
        total_estimated_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn analysis_with_total(total: u32) -> EditalAnalysis {
        let mut analysis = heuristic::analyze("edital.pdf");
        analysis.hours_per_subject.clear();
        analysis
            .hours_per_subject
            .insert("Português".to_string(), total);
        analysis
    }

    #[test]
    fn rejects_past_exam_date() {
        let analysis = heuristic::analyze("edital.pdf");
        let err = synthesize(&analysis, today() - Duration::days(1), today(), None, None)
            .unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn rejects_exam_today() {
        let analysis = heuristic::analyze("edital.pdf");
        let err = synthesize(&analysis, today(), today(), None, None).unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)));
    }

    #[test]
    fn caps_hours_per_day_at_twelve() {
        // 200 hours over 10 days: ceil(20) capped down to 12.
        let analysis = analysis_with_total(200);
        let draft = synthesize(&analysis, today() + Duration::days(10), today(), None, None)
            .unwrap();
        assert_eq!(draft.days_until_exam, 10);
        assert_eq!(draft.total_estimated_hours, 200);
        assert_eq!(draft.schedule.hours_per_day, 12);
    }

    #[test]
    fn hours_per_day_has_floor_of_one() {
        let analysis = analysis_with_total(5);
        let draft = synthesize(&analysis, today() + Duration::days(90), today(), None, None)
            .unwrap();
        assert_eq!(draft.schedule.hours_per_day, 1);
    }

    #[test]
    fn hours_per_day_is_ceiling_of_demand() {
        // 95 hours over 30 days -> ceil(3.17) = 4.
        let analysis = analysis_with_total(95);
        let draft = synthesize(&analysis, today() + Duration::days(30), today(), None, None)
            .unwrap();
        assert_eq!(draft.schedule.hours_per_day, 4);
    }

    #[test]
    fn one_day_left_hits_the_cap() {
        let analysis = analysis_with_total(100);
        let draft =
            synthesize(&analysis, today() + Duration::days(1), today(), None, None).unwrap();
        assert_eq!(draft.days_until_exam, 1);
        assert_eq!(draft.schedule.hours_per_day, MAX_HOURS_PER_DAY);
    }

    #[test]
    fn draft_carries_analysis_and_dates() {
        let analysis = heuristic::analyze("trt.pdf");
        let exam = today() + Duration::days(30);
        let draft =
            synthesize(&analysis, exam, today(), Some("Meu plano".to_string()), Some(7))
                .unwrap();
        let schedule = &draft.schedule;
        assert_eq!(schedule.title, "Meu plano");
        assert_eq!(schedule.subjects, analysis.subjects);
        assert_eq!(schedule.start_date, today());
        assert_eq!(schedule.end_date, exam);
        assert_eq!(schedule.exam_date, Some(exam));
        assert_eq!(schedule.edital_pdf_id, Some(7));
        assert_eq!(schedule.weekly_plan.as_ref(), Some(&analysis.weekly_plan));
        assert!(schedule.is_ai_generated);
        assert!(schedule
            .description
            .as_ref()
            .unwrap()
            .contains("30 dias até o concurso"));
    }

    #[test]
    fn default_title_lists_subjects() {
        let analysis = heuristic::analyze("edital.pdf");
        let draft =
            synthesize(&analysis, today() + Duration::days(30), today(), None, None).unwrap();
        assert!(draft.schedule.title.starts_with("Cronograma - Português"));
    }
}
