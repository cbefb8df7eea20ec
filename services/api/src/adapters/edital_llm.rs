//! services/api/src/adapters/edital_llm.rs
//!
//! Adapter for the edital-analysis LLM. It implements the
//! `EditalAnalysisService` port from the `core` crate: extracted edital text
//! goes in, a structured JSON study plan comes back.

const SYSTEM_INSTRUCTIONS: &str = "Você é um especialista em concursos públicos brasileiros. \
Analise editais e crie cronogramas de estudo eficientes.";

const USER_PROMPT_TEMPLATE: &str = r#"
Analise este edital de concurso público em português e extraia as seguintes informações:

1. MATÉRIAS: Liste todas as matérias/disciplinas cobradas
2. TÓPICOS: Para cada matéria, liste os principais tópicos/conteúdos
3. CRONOGRAMA: Considerando a data da prova ({exam_date}), crie um plano de estudos distribuído pelos dias da semana

EDITAL:
{edital_text}

Responda APENAS em formato JSON válido com esta estrutura:
{
  "subjects": ["matéria1", "matéria2"],
  "topics": {
    "matéria1": ["tópico1", "tópico2"],
    "matéria2": ["tópico1", "tópico2"]
  },
  "priority": ["matéria com maior peso"],
  "hoursPerSubject": {
    "matéria1": 20,
    "matéria2": 15
  },
  "weeklyPlan": {
    "Segunda": [{"subject": "matéria", "topics": ["tópico1"], "hours": 2}],
    "Terça": [{"subject": "matéria", "topics": ["tópico2"], "hours": 2}],
    "Quarta": [{"subject": "matéria", "topics": ["tópico3"], "hours": 2}],
    "Quinta": [{"subject": "matéria", "topics": ["tópico4"], "hours": 2}],
    "Sexta": [{"subject": "matéria", "topics": ["tópico5"], "hours": 2}],
    "Sábado": [{"subject": "revisão", "topics": ["revisão geral"], "hours": 4}],
    "Domingo": [{"subject": "simulados", "topics": ["testes práticos"], "hours": 3}]
  }
}

IMPORTANTE:
- Foque apenas em matérias realmente cobradas no edital
- Distribua o estudo de forma equilibrada
- Considere fins de semana para revisão e simulados
- Seja específico com os tópicos de cada matéria
"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use study_planner_core::domain::EditalAnalysis;
use study_planner_core::ports::{EditalAnalysisService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EditalAnalysisService` using an
/// OpenAI-compatible LLM in JSON mode.
#[derive(Clone)]
pub struct OpenAiEditalAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiEditalAdapter {
    /// Creates a new `OpenAiEditalAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }

    /// Structural validation of the model's output: it must deserialize to
    /// the analysis shape and name at least one subject.
    fn parse_analysis(raw: &str) -> PortResult<EditalAnalysis> {
        let analysis: EditalAnalysis = serde_json::from_str(raw)
            .map_err(|e| PortError::Unexpected(format!("unparseable analysis: {}", e)))?;
        if analysis.subjects.is_empty() {
            return Err(PortError::Unexpected(
                "análise inválida: nenhuma matéria encontrada".to_string(),
            ));
        }
        Ok(analysis)
    }
}

//=========================================================================================
// `EditalAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EditalAnalysisService for OpenAiEditalAdapter {
    async fn analyze(
        &self,
        edital_text: &str,
        exam_date: NaiveDate,
    ) -> PortResult<EditalAnalysis> {
        let prompt = USER_PROMPT_TEMPLATE
            .replace("{exam_date}", &exam_date.to_string())
            .replace("{edital_text}", edital_text);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .temperature(0.3)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Unexpected(format!(
                    "edital analysis timed out after {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("analysis LLM returned no content".to_string())
            })?;

        Self::parse_analysis(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_analysis() {
        let raw = r#"{
            "subjects": ["Português", "Direito Constitucional"],
            "topics": {
                "Português": ["Gramática"],
                "Direito Constitucional": ["Princípios fundamentais"]
            },
            "priority": ["Português"],
            "hoursPerSubject": {"Português": 25, "Direito Constitucional": 20},
            "weeklyPlan": {
                "Segunda": [{"subject": "Português", "topics": ["Gramática"], "hours": 2}]
            }
        }"#;
        let analysis = OpenAiEditalAdapter::parse_analysis(raw).unwrap();
        assert_eq!(analysis.subjects.len(), 2);
        assert_eq!(analysis.hours_per_subject["Português"], 25);
        assert_eq!(analysis.weekly_plan["Segunda"][0].hours, 2);
    }

    #[test]
    fn rejects_non_json_output() {
        let err = OpenAiEditalAdapter::parse_analysis("not json at all").unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }

    #[test]
    fn rejects_analysis_without_subjects() {
        let raw = r#"{
            "subjects": [],
            "topics": {},
            "priority": [],
            "hoursPerSubject": {},
            "weeklyPlan": {}
        }"#;
        let err = OpenAiEditalAdapter::parse_analysis(raw).unwrap_err();
        assert!(matches!(err, PortError::Unexpected(_)));
    }

    #[test]
    fn rejects_structurally_wrong_shape() {
        // subjects must be a list of strings.
        let raw = r#"{"subjects": "Português", "topics": {}, "priority": [],
                      "hoursPerSubject": {}, "weeklyPlan": {}}"#;
        assert!(OpenAiEditalAdapter::parse_analysis(raw).is_err());
    }
}
