// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SISTEMA DE AVALIAÇÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Roda o assistente sobre as mensagens rotuladas e mede:
// - Acurácia da urgência
// - Sobreposição de tons (Jaccard)
// - Detecção de itens de ação
// - Acurácia do idioma
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod metrics;
pub mod samples;

pub use metrics::*;
pub use samples::{get_sample, SampleMessage, SAMPLE_MESSAGES};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::pipeline::InboxAssistant;
use crate::types::fields;

/// Texto que o planejador usa quando não há ações
pub const NO_ACTION_REQUIRED: &str = "No action required";

/// Erros ao exportar resultados
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    /// Falha de escrita no arquivo
    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),

    /// Falha de serialização
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Métricas de uma mensagem avaliada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetrics {
    /// Identificador da mensagem
    pub message_key: String,
    /// Urgência prevista == esperada
    pub urgency_correct: bool,
    /// Urgência do registro ("Unknown" se ausente)
    pub predicted_urgency: String,
    /// Urgência rotulada
    pub expected_urgency: String,
    /// Jaccard entre tons previstos e esperados
    pub tone_overlap: f64,
    /// Tons do registro
    pub predicted_tone: Vec<String>,
    /// Tons rotulados
    pub expected_tone: Vec<String>,
    /// O registro trouxe alguma ação real
    pub has_actions: bool,
    /// A mensagem deveria gerar ações
    pub expected_actions: bool,
    /// has_actions == expected_actions
    pub action_detection_correct: bool,
    /// Idioma do registro
    pub language_detected: String,
    /// Idioma rotulado
    pub expected_language: String,
    /// Idioma detectado == esperado
    pub language_correct: bool,
}

/// Resultado da avaliação de uma mensagem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageEvaluation {
    /// Processada, com métricas
    Evaluated(MessageMetrics),
    /// O assistente retornou erro
    Failed {
        /// Identificador da mensagem
        message_key: String,
        /// Mensagem do erro
        error: String,
    },
}

impl MessageEvaluation {
    /// Identificador da mensagem avaliada
    pub fn message_key(&self) -> &str {
        match self {
            Self::Evaluated(m) => &m.message_key,
            Self::Failed { message_key, .. } => message_key,
        }
    }

    /// Métricas, se o processamento teve sucesso
    pub fn metrics(&self) -> Option<&MessageMetrics> {
        match self {
            Self::Evaluated(m) => Some(m),
            Self::Failed { .. } => None,
        }
    }

    /// O processamento falhou?
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Relatório agregado da avaliação.
///
/// Mensagens que falharam contam no denominador de todas as métricas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Mensagens avaliadas
    pub total_messages: usize,
    /// Fração com urgência correta
    pub urgency_accuracy: f64,
    /// Média da sobreposição de tons
    pub avg_tone_overlap: f64,
    /// Fração com detecção de ações correta
    pub action_detection_accuracy: f64,
    /// Fração com idioma correto
    pub language_accuracy: f64,
    /// Fração de mensagens que falharam
    pub error_rate: f64,
    /// Resultados por mensagem
    pub individual_results: Vec<MessageEvaluation>,
    /// Momento da geração do relatório
    pub generated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// Agrega os resultados individuais
    pub fn from_results(results: Vec<MessageEvaluation>) -> Self {
        let total = results.len();
        let ratio = |count: usize| if total == 0 { 0.0 } else { count as f64 / total as f64 };
        let count = |pred: fn(&MessageMetrics) -> bool| {
            results
                .iter()
                .filter_map(MessageEvaluation::metrics)
                .filter(|m| pred(m))
                .count()
        };

        let tone_sum: f64 = results
            .iter()
            .filter_map(MessageEvaluation::metrics)
            .map(|m| m.tone_overlap)
            .sum();

        Self {
            total_messages: total,
            urgency_accuracy: ratio(count(|m| m.urgency_correct)),
            avg_tone_overlap: if total == 0 { 0.0 } else { tone_sum / total as f64 },
            action_detection_accuracy: ratio(count(|m| m.action_detection_correct)),
            language_accuracy: ratio(count(|m| m.language_correct)),
            error_rate: ratio(results.iter().filter(|r| r.is_failed()).count()),
            individual_results: results,
            generated_at: Utc::now(),
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Messages Evaluated: {}", self.total_messages)?;
        writeln!(
            f,
            "Urgency Classification Accuracy: {:.1}%",
            self.urgency_accuracy * 100.0
        )?;
        writeln!(f, "Average Tone Overlap: {:.1}%", self.avg_tone_overlap * 100.0)?;
        writeln!(
            f,
            "Action Detection Accuracy: {:.1}%",
            self.action_detection_accuracy * 100.0
        )?;
        writeln!(
            f,
            "Language Detection Accuracy: {:.1}%",
            self.language_accuracy * 100.0
        )?;
        write!(f, "Error Rate: {:.1}%", self.error_rate * 100.0)
    }
}

/// Avalia uma mensagem rotulada
pub async fn evaluate_single_message(
    assistant: &InboxAssistant,
    sample: &SampleMessage,
) -> MessageEvaluation {
    let record = match assistant.process(sample.message()).await {
        Ok(record) => record,
        Err(e) => {
            log::error!("❌ Erro avaliando {}: {}", sample.key, e);
            return MessageEvaluation::Failed {
                message_key: sample.key.to_string(),
                error: e.to_string(),
            };
        }
    };

    let predicted_urgency = record
        .get_str(fields::URGENCY)
        .unwrap_or("Unknown")
        .to_string();
    let expected_urgency = sample.expected_urgency.as_str().to_string();

    let predicted_tone = record.tones();
    let tone_overlap = calculate_tone_overlap(&predicted_tone, sample.expected_tone);

    let action_items = record.action_items();
    let has_actions = action_items
        .first()
        .is_some_and(|first| first != NO_ACTION_REQUIRED);

    let language_detected = record
        .get_str(fields::LANGUAGE)
        .unwrap_or("unknown")
        .to_string();

    MessageMetrics {
        message_key: sample.key.to_string(),
        urgency_correct: predicted_urgency == expected_urgency,
        predicted_urgency,
        expected_urgency,
        tone_overlap,
        predicted_tone,
        expected_tone: sample.expected_tone.iter().map(|t| t.to_string()).collect(),
        has_actions,
        expected_actions: sample.should_have_actions,
        action_detection_correct: has_actions == sample.should_have_actions,
        language_correct: language_detected == sample.language,
        language_detected,
        expected_language: sample.language.to_string(),
    }
    .into()
}

impl From<MessageMetrics> for MessageEvaluation {
    fn from(metrics: MessageMetrics) -> Self {
        Self::Evaluated(metrics)
    }
}

/// Avalia o assistente sobre um conjunto de mensagens, em sequência
pub async fn evaluate_system(
    assistant: &InboxAssistant,
    samples: &[SampleMessage],
) -> EvaluationReport {
    log::info!("📊 Avaliando {} mensagens", samples.len());

    let mut results = Vec::with_capacity(samples.len());
    for (index, sample) in samples.iter().enumerate() {
        log::info!("[{}/{}] {}", index + 1, samples.len(), sample.title());
        let result = evaluate_single_message(assistant, sample).await;

        if let Some(m) = result.metrics() {
            log::info!(
                "   urgência {} (esperado {}), tom {:.0}%, ações {}",
                m.predicted_urgency,
                m.expected_urgency,
                m.tone_overlap * 100.0,
                if m.action_detection_correct { "✓" } else { "✗" }
            );
        }
        results.push(result);
    }

    let report = EvaluationReport::from_results(results);
    log::info!("✅ Avaliação concluída\n{}", report);
    report
}

/// Grava o relatório como JSON indentado
pub fn export_results(
    report: &EvaluationReport,
    path: impl AsRef<Path>,
) -> Result<(), EvaluationError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    log::info!("💾 Resultados exportados para {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use std::sync::Arc;

    fn metrics(key: &str, urgency: bool, tone: f64, actions: bool, language: bool) -> MessageEvaluation {
        MessageMetrics {
            message_key: key.into(),
            urgency_correct: urgency,
            predicted_urgency: "High".into(),
            expected_urgency: "High".into(),
            tone_overlap: tone,
            predicted_tone: vec![],
            expected_tone: vec![],
            has_actions: actions,
            expected_actions: true,
            action_detection_correct: actions,
            language_detected: "en".into(),
            expected_language: "en".into(),
            language_correct: language,
        }
        .into()
    }

    #[test]
    fn test_report_counts_failures_in_denominator() {
        let report = EvaluationReport::from_results(vec![
            metrics("a", true, 1.0, true, true),
            metrics("b", false, 0.5, true, true),
            MessageEvaluation::Failed {
                message_key: "c".into(),
                error: "boom".into(),
            },
            metrics("d", true, 0.5, false, false),
        ]);

        assert_eq!(report.total_messages, 4);
        assert!((report.urgency_accuracy - 0.5).abs() < 1e-9);
        assert!((report.avg_tone_overlap - 0.5).abs() < 1e-9);
        assert!((report.action_detection_accuracy - 0.5).abs() < 1e-9);
        assert!((report.language_accuracy - 0.5).abs() < 1e-9);
        assert!((report.error_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report() {
        let report = EvaluationReport::from_results(vec![]);
        assert_eq!(report.total_messages, 0);
        assert_eq!(report.urgency_accuracy, 0.0);
        assert_eq!(report.error_rate, 0.0);
    }

    #[test]
    fn test_report_display() {
        let report = EvaluationReport::from_results(vec![metrics("a", true, 1.0, true, true)]);
        let text = report.to_string();
        assert!(text.contains("Total Messages Evaluated: 1"));
        assert!(text.contains("Urgency Classification Accuracy: 100.0%"));
        assert!(text.contains("Error Rate: 0.0%"));
    }

    #[tokio::test]
    async fn test_evaluate_single_message_with_mock() {
        let llm = MockLlmClient::new()
            .with_response(fields::URGENCY, r#"{"urgency": "high"}"#)
            .with_response(fields::TONE, r#"{"tone": ["Urgent", "Direct"]}"#)
            .with_response(
                fields::ACTION_ITEMS,
                r#"{"action_items": ["Restore the database"]}"#,
            );
        let assistant = InboxAssistant::new(Arc::new(llm));
        let sample = get_sample("urgent_technical").unwrap();

        let result = evaluate_single_message(&assistant, sample).await;
        let m = result.metrics().unwrap();

        assert!(m.urgency_correct);
        assert_eq!(m.predicted_urgency, "High");
        assert!((m.tone_overlap - 2.0 / 3.0).abs() < 1e-9);
        assert!(m.has_actions);
        assert!(m.action_detection_correct);
        assert!(m.language_correct);
    }

    #[tokio::test]
    async fn test_no_action_required_is_not_an_action() {
        let llm = MockLlmClient::new().with_response(
            fields::ACTION_ITEMS,
            r#"{"action_items": ["No action required"]}"#,
        );
        let assistant = InboxAssistant::new(Arc::new(llm));
        let sample = get_sample("low_informational").unwrap();

        let m = evaluate_single_message(&assistant, sample).await;
        let m = m.metrics().unwrap();
        assert!(!m.has_actions);
        assert!(m.action_detection_correct);
    }

    #[tokio::test]
    async fn test_failed_step_becomes_failed_result() {
        let llm = MockLlmClient::new().with_failure(fields::SUMMARY, "quota");
        let assistant = InboxAssistant::new(Arc::new(llm));
        let sample = get_sample("medium_request").unwrap();

        let result = evaluate_single_message(&assistant, sample).await;
        assert!(result.is_failed());
        assert_eq!(result.message_key(), "medium_request");
    }

    #[tokio::test]
    async fn test_evaluate_system_and_export() {
        let assistant = InboxAssistant::new(Arc::new(MockLlmClient::new()));
        let report = evaluate_system(&assistant, &SAMPLE_MESSAGES[..3]).await;
        assert_eq!(report.total_messages, 3);
        assert_eq!(report.error_rate, 0.0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluation_results.json");
        export_results(&report, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: EvaluationReport = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed.total_messages, 3);
        assert_eq!(parsed.individual_results.len(), 3);
        assert!(written.contains("\"status\": \"evaluated\""));
    }
}
