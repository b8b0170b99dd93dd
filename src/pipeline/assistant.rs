// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// INBOX ASSISTANT - Agregador do Pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Fluxo de um process():
//   Init → LanguageDetected → SessionOpened | SessionOpenFailed
//        → Step[1..5] → Finalized → SessionClosed → Returned
//
// Apenas a extração é tolerante a falhas. Erro do LLM em qualquer step
// aborta o processamento (a menos que StepFailurePolicy::Skip).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

use super::steps::{StepSpec, STEPS};
use crate::config::{AssistantConfig, StepFailurePolicy};
use crate::extract::{extract_fields, Extraction};
use crate::language::{detect_or_default, HeuristicLanguageDetector, LanguageDetector};
use crate::llm::{final_text, CompletionRequest, LlmClient, LlmError};
use crate::session::{
    ConversationTurn, InMemorySessionStore, SessionContext, SessionKey, SessionStore,
};
use crate::types::{fields, ResultRecord, Urgency};

/// Erros do processamento de uma mensagem
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Um step falhou no serviço de completion
    #[error("Step {step} failed: {source}")]
    StepFailed {
        /// Nome do step
        step: &'static str,
        /// Erro do cliente LLM
        #[source]
        source: LlmError,
    },
}

impl AssistantError {
    /// Nome do step que falhou
    pub fn step(&self) -> &'static str {
        match self {
            Self::StepFailed { step, .. } => step,
        }
    }
}

/// Opções de um processamento
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Usuário (padrão: `AssistantConfig::default_user_id`)
    pub user_id: Option<String>,
    /// ID de sessão explícito (padrão: gerado)
    pub session_id: Option<String>,
}

/// Assistente de inbox: roda os cinco steps e agrega o resultado.
///
/// Não guarda estado mutável entre chamadas; chamadas concorrentes de
/// [`InboxAssistant::process`] são independentes.
///
/// # Exemplo
///
/// ```rust,ignore
/// let assistant = InboxAssistant::new(llm_client);
/// let record = assistant.process("URGENT: Production Database Down").await?;
/// println!("{:?}", record.urgency());
/// ```
pub struct InboxAssistant {
    llm: Arc<dyn LlmClient>,
    sessions: Arc<dyn SessionStore>,
    detector: Arc<dyn LanguageDetector>,
    config: AssistantConfig,
}

impl InboxAssistant {
    /// Cria um assistente com sessões em memória e detector heurístico
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            sessions: Arc::new(InMemorySessionStore::new()),
            detector: Arc::new(HeuristicLanguageDetector::new()),
            config: AssistantConfig::default(),
        }
    }

    /// Troca o armazenamento de sessões
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Troca o detector de idioma
    pub fn with_language_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Troca a configuração
    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    /// Configuração em uso
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Steps executados, em ordem
    pub fn steps(&self) -> &'static [StepSpec] {
        &STEPS
    }

    /// Processa uma mensagem com opções padrão
    pub async fn process(&self, message: &str) -> Result<ResultRecord, AssistantError> {
        self.process_with(message, &ProcessOptions::default()).await
    }

    /// Processa uma mensagem.
    ///
    /// A mensagem é usada sem espaços nas bordas. `language` e `message`
    /// sempre sobrescrevem qualquer valor vindo dos steps ou da sessão.
    pub async fn process_with(
        &self,
        message: &str,
        options: &ProcessOptions,
    ) -> Result<ResultRecord, AssistantError> {
        let start = Instant::now();
        let message = message.trim();

        let language = detect_or_default(self.detector.as_ref(), message);
        log::info!("🌐 Idioma detectado: {}", language);

        // Sessões com ID gerado pertencem a este processamento e são removidas no fim
        let generated = options.session_id.is_none();
        let mut context = self.open_session(options, &language, message).await;
        self.record_turn(&mut context, ConversationTurn::user(message))
            .await;

        let mut record = ResultRecord::new();

        for (index, step) in STEPS.iter().enumerate() {
            log::info!("🧩 [{}/{}] {}", index + 1, STEPS.len(), step.name);

            let raw = match self.run_step(step, &context, message).await {
                Ok(raw) => raw,
                Err(e) => match self.config.step_failure_policy {
                    StepFailurePolicy::Abort => {
                        log::error!("❌ {} falhou: {}", step.name, e);
                        self.close_session(&context, generated).await;
                        return Err(AssistantError::StepFailed {
                            step: step.name,
                            source: e,
                        });
                    }
                    StepFailurePolicy::Skip => {
                        log::warn!("⚠ {} falhou, pulando: {}", step.name, e);
                        continue;
                    }
                },
            };

            let Some(raw) = raw else {
                log::warn!("⚠ {} não retornou resposta final", step.name);
                continue;
            };

            match extract_fields(&raw) {
                Extraction::Fields(map) => {
                    log::debug!("{} → {} campos", step.name, map.len());
                    record.merge(map);
                }
                Extraction::Empty => {
                    log::warn!("⚠ {} retornou resposta sem JSON; campo omitido", step.name);
                }
            }

            self.record_turn(&mut context, ConversationTurn::model(step.name, raw))
                .await;
        }

        if let Some(state) = self.session_state(&context).await {
            record.merge(state);
        }
        self.close_session(&context, generated).await;

        if let Some(urgency) = record.get_str(fields::URGENCY).map(Urgency::normalize) {
            record.insert(fields::URGENCY, urgency.as_str());
        }
        record.insert(fields::LANGUAGE, language);
        record.insert(fields::MESSAGE, message);

        log::info!(
            "✓ Mensagem processada em {}ms ({} campos)",
            start.elapsed().as_millis(),
            record.len()
        );

        Ok(record)
    }

    /// Cria o contexto da sessão. Falha do store não é fatal.
    async fn open_session(
        &self,
        options: &ProcessOptions,
        language: &str,
        message: &str,
    ) -> SessionContext {
        let user_id = options
            .user_id
            .clone()
            .unwrap_or_else(|| self.config.default_user_id.clone());

        let key = match &options.session_id {
            Some(id) => SessionKey::new(&self.config.app_name, user_id, id),
            None => SessionKey::generate(&self.config.app_name, user_id),
        };

        let mut state = Map::new();
        state.insert(fields::LANGUAGE.into(), Value::from(language));
        state.insert(fields::ORIGINAL_MESSAGE.into(), Value::from(message));

        match self.sessions.create(&key, state).await {
            Ok(_) => SessionContext::new(key, true),
            Err(e) => {
                log::warn!("⚠ Sessão {} não criada ({}); usando contexto efêmero", key, e);
                SessionContext::new(key, false)
            }
        }
    }

    async fn record_turn(&self, context: &mut SessionContext, turn: ConversationTurn) {
        if context.persisted {
            if let Err(e) = self.sessions.append_turn(&context.key, turn.clone()).await {
                log::debug!("Turno não persistido em {}: {}", context.key, e);
            }
        }
        context.push_turn(turn);
    }

    async fn session_state(&self, context: &SessionContext) -> Option<Map<String, Value>> {
        if !context.persisted {
            return None;
        }

        match self.sessions.get(&context.key).await {
            Ok(session) => session.map(|s| s.state),
            Err(e) => {
                log::debug!("Estado da sessão {} indisponível: {}", context.key, e);
                None
            }
        }
    }

    /// Remove a sessão do store se ela foi criada com ID gerado.
    /// Falha do store não é fatal.
    async fn close_session(&self, context: &SessionContext, generated: bool) {
        if !context.persisted || !generated {
            return;
        }

        if let Err(e) = self.sessions.delete(&context.key).await {
            log::warn!("⚠ Sessão {} não removida: {}", context.key, e);
        }
    }

    /// Executa um step e retorna o texto do evento final (se houver)
    async fn run_step(
        &self,
        step: &StepSpec,
        context: &SessionContext,
        message: &str,
    ) -> Result<Option<String>, LlmError> {
        let request = CompletionRequest {
            step_name: step.name.to_string(),
            output_key: step.output_key.to_string(),
            instruction: step.instruction.to_string(),
            context: context.turns().to_vec(),
            message: message.to_string(),
        };

        let events = self.llm.complete(&request).await?;
        Ok(final_text(&events).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::session::SessionError;
    use async_trait::async_trait;
    use crate::session::Session;

    /// Store que recusa qualquer operação
    struct BrokenStore;

    #[async_trait]
    impl SessionStore for BrokenStore {
        async fn create(
            &self,
            key: &SessionKey,
            _state: Map<String, Value>,
        ) -> Result<Session, SessionError> {
            Err(SessionError::Backend(format!("down: {}", key)))
        }

        async fn get(&self, _key: &SessionKey) -> Result<Option<Session>, SessionError> {
            Err(SessionError::Backend("down".into()))
        }

        async fn append_turn(
            &self,
            _key: &SessionKey,
            _turn: ConversationTurn,
        ) -> Result<(), SessionError> {
            Err(SessionError::Backend("down".into()))
        }

        async fn delete(&self, _key: &SessionKey) -> Result<bool, SessionError> {
            Ok(false)
        }
    }

    /// Store em memória cujo delete sempre falha
    #[derive(Default)]
    struct UndeletableStore {
        inner: InMemorySessionStore,
    }

    #[async_trait]
    impl SessionStore for UndeletableStore {
        async fn create(
            &self,
            key: &SessionKey,
            state: Map<String, Value>,
        ) -> Result<Session, SessionError> {
            self.inner.create(key, state).await
        }

        async fn get(&self, key: &SessionKey) -> Result<Option<Session>, SessionError> {
            self.inner.get(key).await
        }

        async fn append_turn(
            &self,
            key: &SessionKey,
            turn: ConversationTurn,
        ) -> Result<(), SessionError> {
            self.inner.append_turn(key, turn).await
        }

        async fn delete(&self, _key: &SessionKey) -> Result<bool, SessionError> {
            Err(SessionError::Backend("read-only".into()))
        }
    }

    #[tokio::test]
    async fn test_process_happy_path() {
        let llm = Arc::new(MockLlmClient::new());
        let assistant = InboxAssistant::new(llm.clone());

        let record = assistant.process("  Please review the report today.  ").await.unwrap();

        for step in &STEPS {
            assert!(record.contains_key(step.output_key), "missing {}", step.output_key);
        }
        assert_eq!(record.get_str(fields::LANGUAGE), Some("en"));
        assert_eq!(record.get_str(fields::MESSAGE), Some("Please review the report today."));
        assert_eq!(
            llm.calls(),
            STEPS.iter().map(|s| s.name.to_string()).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_session_state_is_merged() {
        let assistant = InboxAssistant::new(Arc::new(MockLlmClient::new()));
        let record = assistant.process("Thanks for the help with the deal").await.unwrap();

        assert_eq!(
            record.get_str(fields::ORIGINAL_MESSAGE),
            Some("Thanks for the help with the deal")
        );
    }

    #[tokio::test]
    async fn test_language_and_message_always_win() {
        let llm = MockLlmClient::new().with_response(
            fields::SUMMARY,
            r#"{"summary": "s", "language": "fr", "message": "hijacked"}"#,
        );
        let assistant = InboxAssistant::new(Arc::new(llm));

        let record = assistant.process("Please call me back today").await.unwrap();
        assert_eq!(record.get_str(fields::LANGUAGE), Some("en"));
        assert_eq!(record.get_str(fields::MESSAGE), Some("Please call me back today"));
    }

    #[tokio::test]
    async fn test_urgency_is_normalized() {
        let llm = MockLlmClient::new()
            .with_response(fields::URGENCY, r#"{"urgency": " HIGH ", "reasoning": "x"}"#);
        let assistant = InboxAssistant::new(Arc::new(llm));
        let record = assistant.process("Server is down").await.unwrap();
        assert_eq!(record.get_str(fields::URGENCY), Some("High"));

        let llm = MockLlmClient::new()
            .with_response(fields::URGENCY, r#"{"urgency": "URGENT"}"#);
        let assistant = InboxAssistant::new(Arc::new(llm));
        let record = assistant.process("Server is down").await.unwrap();
        assert_eq!(record.get_str(fields::URGENCY), Some("Medium"));
    }

    #[tokio::test]
    async fn test_step_failure_aborts_by_default() {
        let llm = MockLlmClient::new().with_failure(fields::TONE, "quota");
        let assistant = InboxAssistant::new(Arc::new(llm));

        let err = assistant.process("Hello there").await.unwrap_err();
        assert_eq!(err.step(), "ToneAnalyzerAgent");
        assert!(err.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_step_failure_skip_policy() {
        let llm = Arc::new(MockLlmClient::new().with_failure(fields::TONE, "quota"));
        let assistant = InboxAssistant::new(llm.clone()).with_config(AssistantConfig {
            step_failure_policy: StepFailurePolicy::Skip,
            ..AssistantConfig::default()
        });

        let record = assistant.process("Hello there").await.unwrap();
        assert!(!record.contains_key(fields::TONE));
        assert!(record.contains_key(fields::DRAFT_REPLY));
        assert_eq!(llm.calls().len(), STEPS.len());
    }

    #[tokio::test]
    async fn test_no_final_event_omits_fields() {
        let llm = MockLlmClient::new().with_no_events(fields::SUMMARY);
        let assistant = InboxAssistant::new(Arc::new(llm));

        let record = assistant.process("Hello there").await.unwrap();
        assert!(!record.contains_key(fields::SUMMARY));
        assert!(record.contains_key(fields::URGENCY));
    }

    #[tokio::test]
    async fn test_broken_session_store_is_not_fatal() {
        let assistant = InboxAssistant::new(Arc::new(MockLlmClient::new()))
            .with_session_store(Arc::new(BrokenStore));

        let record = assistant.process("Please send the invoice").await.unwrap();
        assert!(record.contains_key(fields::ACTION_ITEMS));
        assert!(!record.contains_key(fields::ORIGINAL_MESSAGE));
        assert_eq!(record.get_str(fields::LANGUAGE), Some("en"));
    }

    #[tokio::test]
    async fn test_generated_sessions_are_released() {
        let store = Arc::new(InMemorySessionStore::new());
        let assistant = InboxAssistant::new(Arc::new(MockLlmClient::new()))
            .with_session_store(store.clone());

        for i in 0..50 {
            let record = assistant
                .process(&format!("Please review report #{}", i))
                .await
                .unwrap();
            // Estado lido antes da remoção
            assert!(record.contains_key(fields::ORIGINAL_MESSAGE));
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_generated_session_released_on_abort() {
        let store = Arc::new(InMemorySessionStore::new());
        let assistant =
            InboxAssistant::new(Arc::new(MockLlmClient::new().with_failure(fields::TONE, "quota")))
                .with_session_store(store.clone());

        assert!(assistant.process("Hello there").await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_failure_is_not_fatal() {
        let assistant = InboxAssistant::new(Arc::new(MockLlmClient::new()))
            .with_session_store(Arc::new(UndeletableStore::default()));

        let record = assistant.process("Please send the invoice").await.unwrap();
        assert_eq!(
            record.get_str(fields::ORIGINAL_MESSAGE),
            Some("Please send the invoice")
        );
    }

    #[tokio::test]
    async fn test_turns_are_persisted() {
        let store = Arc::new(InMemorySessionStore::new());
        let assistant = InboxAssistant::new(Arc::new(MockLlmClient::new()))
            .with_session_store(store.clone());

        let options = ProcessOptions {
            user_id: Some("alice".into()),
            session_id: Some("s-1".into()),
        };
        assistant.process_with("Hello there", &options).await.unwrap();

        let key = SessionKey::new("inbox_assistant", "alice", "s-1");
        let session = store.get(&key).await.unwrap().unwrap();
        // 1 turno do usuário + 5 steps
        assert_eq!(session.turns.len(), 1 + STEPS.len());

        // Reusar o ID: create falha, processamento continua efêmero
        let record = assistant.process_with("Second message", &options).await.unwrap();
        assert_eq!(record.get_str(fields::MESSAGE), Some("Second message"));
        assert!(!record.contains_key(fields::ORIGINAL_MESSAGE));
    }
}
