// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CLIENTE LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait e implementações para o serviço de completion.
// Suporta Gemini (generateContent) e OpenAI (chat completions),
// além de um mock roteirizado para testes.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{ConfigError, LlmConfig, LlmProvider};
use crate::session::{ConversationTurn, TurnRole};
use crate::types::fields;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Erros do cliente LLM
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Erro retornado pela API
    #[error("API error: {0}")]
    ApiError(String),

    /// HTTP 429
    #[error("Rate limit exceeded")]
    RateLimitError,

    /// Resposta em formato inesperado
    #[error("Invalid response format: {0}")]
    ParseError(String),

    /// Falha de rede
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Requisição de completion para um step
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Nome do step (ex: "SummarizerAgent")
    pub step_name: String,
    /// Campo do registro que o step produz
    pub output_key: String,
    /// Instrução de sistema do step
    pub instruction: String,
    /// Turnos anteriores da conversa (respostas de steps anteriores)
    pub context: Vec<ConversationTurn>,
    /// Mensagem do usuário
    pub message: String,
}

impl CompletionRequest {
    /// Monta o prompt do usuário: mensagem + respostas anteriores
    pub fn render_user_prompt(&self) -> String {
        let previous: Vec<String> = self
            .context
            .iter()
            .filter(|t| t.role == TurnRole::Model)
            .map(|t| format!("[{}]\n{}", t.author, t.text))
            .collect();

        if previous.is_empty() {
            self.message.clone()
        } else {
            format!(
                "{}\n\n--- Previous analysis ---\n{}",
                self.message,
                previous.join("\n\n")
            )
        }
    }
}

/// Evento emitido pelo serviço de completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvent {
    /// Autor do evento (nome do step)
    pub author: String,
    /// Texto do evento
    pub text: String,
    /// Se é a resposta final do step
    pub is_final: bool,
}

impl CompletionEvent {
    /// Evento final
    pub fn final_response(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            is_final: true,
        }
    }

    /// Evento intermediário
    pub fn partial(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            is_final: false,
        }
    }
}

/// Texto do último evento final, se houver
pub fn final_text(events: &[CompletionEvent]) -> Option<&str> {
    events
        .iter()
        .rev()
        .find(|e| e.is_final)
        .map(|e| e.text.as_str())
}

/// Trait principal para clientes LLM
///
/// Permite trocar o provedor (Gemini, OpenAI, mock) sem tocar no pipeline.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Executa um step e retorna os eventos produzidos (zero ou mais)
    async fn complete(&self, request: &CompletionRequest)
        -> Result<Vec<CompletionEvent>, LlmError>;
}

/// Cria o cliente real a partir da configuração
pub fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, ConfigError> {
    let api_key = config.require_api_key()?.to_string();

    let client: Arc<dyn LlmClient> = match config.provider {
        LlmProvider::Gemini => {
            let mut client = GeminiClient::new(api_key)
                .with_model(&config.model)
                .with_temperature(config.temperature);
            if let Some(url) = &config.api_base_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
        LlmProvider::OpenAi => {
            let mut client = OpenAiClient::new(api_key)
                .with_model(&config.model)
                .with_temperature(config.temperature);
            if let Some(url) = &config.api_base_url {
                client = client.with_base_url(url);
            }
            Arc::new(client)
        }
    };

    log::info!("🤖 Cliente LLM: {} ({})", config.provider, config.model);
    Ok(client)
}

fn build_http_client() -> reqwest::Client {
    client_or_default(reqwest::Client::builder().timeout(HTTP_TIMEOUT))
}

/// Constrói o client; em caso de falha usa o padrão do reqwest (sem timeout).
fn client_or_default(builder: reqwest::ClientBuilder) -> reqwest::Client {
    match builder.build() {
        Ok(client) => client,
        Err(e) => {
            log::warn!(
                "⚠ Falha ao configurar cliente HTTP ({}); usando cliente padrão sem timeout",
                e
            );
            reqwest::Client::new()
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(LlmError::RateLimitError);
    }
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
    }
    Ok(response)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO MOCK PARA TESTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    NoEvents,
    Fail(String),
}

/// Cliente mock roteirizado por step.
///
/// As respostas são indexadas pelo `output_key` ou pelo `step_name` do step.
/// Steps sem roteiro recebem um JSON bem formado padrão.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: HashMap<String, MockReply>,
    calls: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// Cria um mock sem roteiro
    pub fn new() -> Self {
        Self::default()
    }

    /// Define o texto bruto retornado para um step
    pub fn with_response(mut self, step: &str, text: impl Into<String>) -> Self {
        self.replies.insert(step.into(), MockReply::Text(text.into()));
        self
    }

    /// Faz o step falhar com erro de API
    pub fn with_failure(mut self, step: &str, message: impl Into<String>) -> Self {
        self.replies.insert(step.into(), MockReply::Fail(message.into()));
        self
    }

    /// Faz o step não emitir nenhum evento
    pub fn with_no_events(mut self, step: &str) -> Self {
        self.replies.insert(step.into(), MockReply::NoEvents);
        self
    }

    /// Steps chamados, em ordem
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Resposta padrão bem formada para cada campo
    pub fn canned_response(output_key: &str) -> String {
        let value = match output_key {
            fields::SUMMARY => serde_json::json!({"summary": "Mock summary of the message."}),
            fields::URGENCY => {
                serde_json::json!({"urgency": "Medium", "reasoning": "Mock reasoning"})
            }
            fields::TONE => serde_json::json!({
                "tone": ["Professional", "Direct"],
                "formality": "Formal",
                "sentiment": "Neutral"
            }),
            fields::DRAFT_REPLY => serde_json::json!({
                "draft_reply": "Thanks for your message, we are on it.",
                "reply_tone": "Professional"
            }),
            fields::ACTION_ITEMS => {
                serde_json::json!({"action_items": ["Review the message"]})
            }
            other => {
                let mut map = serde_json::Map::new();
                map.insert(other.to_string(), serde_json::json!("mock"));
                serde_json::Value::Object(map)
            }
        };
        value.to_string()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Vec<CompletionEvent>, LlmError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.step_name.clone());
        }

        let reply = self
            .replies
            .get(&request.output_key)
            .or_else(|| self.replies.get(&request.step_name))
            .cloned();

        match reply {
            Some(MockReply::Text(text)) => Ok(vec![
                CompletionEvent::partial(&request.step_name, "thinking..."),
                CompletionEvent::final_response(&request.step_name, text),
            ]),
            Some(MockReply::NoEvents) => Ok(vec![]),
            Some(MockReply::Fail(message)) => Err(LlmError::ApiError(message)),
            None => Ok(vec![CompletionEvent::final_response(
                &request.step_name,
                Self::canned_response(&request.output_key),
            )]),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO GEMINI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

/// Cliente para Google Gemini API
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Cria o cliente com a chave de API
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: crate::config::DEFAULT_GEMINI_MODEL.into(),
            base_url: GEMINI_BASE_URL.into(),
            temperature: crate::config::DEFAULT_TEMPERATURE,
            client: build_http_client(),
        }
    }

    /// Define o modelo
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    /// Define a URL base da API
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').into();
        self
    }

    /// Define a temperatura
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Vec<CompletionEvent>, LlmError> {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: request.instruction.clone(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: request.render_user_prompt(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let response: GeminiResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        // Sem candidatos = nenhum evento (o step não contribui campos)
        Ok(response
            .candidates
            .first()
            .map(|candidate| {
                let text: String = candidate
                    .content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect();
                vec![CompletionEvent::final_response(&request.step_name, text)]
            })
            .unwrap_or_default())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// IMPLEMENTAÇÃO OPENAI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Cliente para OpenAI API (ou gateway compatível)
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Cria o cliente com a chave de API
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: crate::config::DEFAULT_OPENAI_MODEL.into(),
            base_url: OPENAI_BASE_URL.into(),
            temperature: crate::config::DEFAULT_TEMPERATURE,
            client: build_http_client(),
        }
    }

    /// Define o modelo
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.into();
        self
    }

    /// Define a URL base da API
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').into();
        self
    }

    /// Define a temperatura
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Vec<CompletionEvent>, LlmError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: request.instruction.clone(),
                },
                ChatMessage {
                    role: "user".into(),
                    content: request.render_user_prompt(),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let response: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| vec![CompletionEvent::final_response(&request.step_name, text)])
            .unwrap_or_default())
    }
}
