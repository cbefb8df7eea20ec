//! crates/study_planner_core/src/heuristic.rs
//!
//! Rule-based edital analyzer. This is the last-resort fallback when the LLM
//! analyzer is unavailable or returns malformed data: it infers likely exam
//! subjects from the uploaded filename and distributes them over a week. It
//! never fails and performs no I/O.

use std::collections::BTreeMap;

use crate::domain::{EditalAnalysis, StudyBlock, WeeklyPlan};

/// Subjects every Brazilian public-exam schedule starts from.
const BASELINE_SUBJECTS: [&str; 3] = ["Português", "Matemática", "Atualidades"];

/// Ordered keyword rules, evaluated first-match-wins: the first rule whose
/// keyword appears in the lowercased filename contributes its subjects.
/// "trt_tecnico.pdf" therefore gets the labor-law set, not the técnico set.
const KEYWORD_RULES: [(&[&str], &[&str]); 4] = [
    (
        &["trt", "trabalho"],
        &[
            "Direito do Trabalho",
            "Direito Constitucional",
            "Direito Administrativo",
        ],
    ),
    (
        &["trf", "federal"],
        &[
            "Direito Constitucional",
            "Direito Administrativo",
            "Direito Civil",
        ],
    ),
    (&["tecnico"], &["Informática", "Raciocínio Lógico"]),
    (
        &["analista"],
        &[
            "Direito Constitucional",
            "Direito Administrativo",
            "Informática",
            "Raciocínio Lógico",
        ],
    ),
];

/// Subjects added when no keyword rule matches.
const GENERIC_SUBJECTS: [&str; 3] = ["Informática", "Raciocínio Lógico", "Direito Constitucional"];

const WEEKDAYS: [&str; 5] = ["Segunda", "Terça", "Quarta", "Quinta", "Sexta"];

const WEEKDAY_HOURS: u32 = 3;
const SATURDAY_HOURS: u32 = 4;
const SUNDAY_HOURS: u32 = 3;

/// Known topic lists per subject. Subjects without an entry get a generic
/// two-item placeholder.
fn topics_for(subject: &str) -> Vec<String> {
    let known: &[&str] = match subject {
        "Português" => &[
            "Interpretação de textos",
            "Gramática",
            "Ortografia",
            "Sintaxe",
            "Semântica",
            "Redação oficial",
        ],
        "Matemática" => &[
            "Aritmética",
            "Álgebra",
            "Geometria",
            "Estatística",
            "Matemática financeira",
            "Razão e proporção",
        ],
        "Raciocínio Lógico" => &[
            "Lógica proposicional",
            "Sequências",
            "Análise combinatória",
            "Probabilidade",
            "Problemas aritméticos",
        ],
        "Informática" => &[
            "Windows",
            "Word",
            "Excel",
            "PowerPoint",
            "Internet",
            "Segurança da informação",
        ],
        "Direito Constitucional" => &[
            "Princípios fundamentais",
            "Direitos e garantias fundamentais",
            "Organização do Estado",
            "Administração Pública",
            "Controle de constitucionalidade",
        ],
        "Direito Administrativo" => &[
            "Princípios administrativos",
            "Atos administrativos",
            "Processo administrativo",
            "Licitações e contratos",
            "Servidores públicos",
        ],
        _ => &["Conteúdo programático", "Exercícios práticos"],
    };
    known.iter().map(|t| t.to_string()).collect()
}

/// Infers a full `EditalAnalysis` from the uploaded filename alone.
pub fn analyze(filename: &str) -> EditalAnalysis {
    let lowercase = filename.to_lowercase();

    let mut subjects: Vec<String> = BASELINE_SUBJECTS.iter().map(|s| s.to_string()).collect();

    let extra: &[&str] = KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowercase.contains(kw)))
        .map(|&(_, additions)| additions)
        .unwrap_or(&GENERIC_SUBJECTS);
    for subject in extra {
        if !subjects.iter().any(|s| s == subject) {
            subjects.push(subject.to_string());
        }
    }

    let topics: BTreeMap<String, Vec<String>> = subjects
        .iter()
        .map(|s| (s.clone(), topics_for(s)))
        .collect();

    // The first three subjects are treated as priority, flat heuristic.
    let priority: Vec<String> = subjects.iter().take(3).cloned().collect();

    let hours_per_subject: BTreeMap<String, u32> = subjects
        .iter()
        .map(|s| {
            let hours = if s == "Português" || s == "Matemática" {
                25
            } else if priority.contains(s) {
                20
            } else {
                15
            };
            (s.clone(), hours)
        })
        .collect();

    let weekly_plan = build_weekly_plan(&subjects, &topics);

    EditalAnalysis {
        subjects,
        topics,
        priority,
        hours_per_subject,
        weekly_plan,
    }
}

/// Distributes subjects round-robin across the weekdays, with fixed review
/// and mock-exam blocks on the weekend.
fn build_weekly_plan(
    subjects: &[String],
    topics: &BTreeMap<String, Vec<String>>,
) -> WeeklyPlan {
    let mut plan = WeeklyPlan::new();

    for (day_index, day) in WEEKDAYS.iter().enumerate() {
        let subject = &subjects[day_index % subjects.len()];
        let subject_topics = topics.get(subject).cloned().unwrap_or_default();

        // Later weeks into the rotation pick up where the previous pass left
        // off, at most two topics per day.
        let offset = day_index / subjects.len();
        let mut day_topics: Vec<String> = subject_topics
            .iter()
            .skip(offset)
            .take(2)
            .cloned()
            .collect();
        if day_topics.is_empty() {
            day_topics.push("Estudo geral".to_string());
        }

        plan.insert(
            day.to_string(),
            vec![StudyBlock {
                subject: subject.clone(),
                topics: day_topics,
                hours: WEEKDAY_HOURS,
            }],
        );
    }

    plan.insert(
        "Sábado".to_string(),
        vec![StudyBlock {
            subject: "Revisão Geral".to_string(),
            topics: vec![
                "Revisão das matérias da semana".to_string(),
                "Resolução de exercícios".to_string(),
            ],
            hours: SATURDAY_HOURS,
        }],
    );
    plan.insert(
        "Domingo".to_string(),
        vec![StudyBlock {
            subject: "Simulados".to_string(),
            topics: vec![
                "Simulados e provas anteriores".to_string(),
                "Análise de desempenho".to_string(),
            ],
            hours: SUNDAY_HOURS,
        }],
    );

    plan
}
