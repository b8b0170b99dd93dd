// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CONFIGURAÇÃO DO LLM E DO ASSISTENTE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Configurações do provedor LLM e do pipeline.
// Todas as configurações podem ser definidas via .env
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

/// Modelo Gemini padrão
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
/// Modelo OpenAI padrão
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
/// Nome da aplicação usado como namespace de sessões
pub const DEFAULT_APP_NAME: &str = "inbox_assistant";
/// Usuário padrão
pub const DEFAULT_USER_ID: &str = "user_001";
/// Temperatura padrão das chamadas
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Erros de configuração
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Chave de API do provider ausente
    #[error("API key for {provider} not found (set {var})")]
    MissingApiKey {
        /// Nome do provider
        provider: &'static str,
        /// Variável de ambiente esperada
        var: &'static str,
    },
}

/// Provedor de LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini (generateContent)
    #[default]
    Gemini,
    /// OpenAI chat completions
    OpenAi,
}

impl LlmProvider {
    /// Converte string do .env para LlmProvider.
    ///
    /// Case-insensitive:
    /// - "openai" → OpenAi
    /// - "gemini", "google" ou qualquer outro valor → Gemini
    pub fn from_env(value: &str) -> Self {
        match value.to_lowercase().trim() {
            "openai" => Self::OpenAi,
            _ => Self::Gemini,
        }
    }

    /// Retorna nome legível para logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    /// Variável de ambiente com a API key do provedor
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Modelo padrão do provedor
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Configuração do cliente LLM.
#[derive(Clone)]
pub struct LlmConfig {
    /// Provedor
    pub provider: LlmProvider,
    /// Modelo
    pub model: String,
    /// API key (nunca logada)
    pub api_key: Option<String>,
    /// URL base customizada (proxy, gateway)
    pub api_base_url: Option<String>,
    /// Temperatura
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = LlmProvider::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            api_base_url: None,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmConfig {
    /// Retorna a API key ou erro indicando a variável esperada
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey {
                provider: self.provider.display_name(),
                var: self.provider.api_key_var(),
            })
    }
}

/// O que fazer quando a chamada de um step falha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepFailurePolicy {
    /// Aborta o processamento inteiro (sem registro parcial)
    #[default]
    Abort,
    /// Loga, pula o step e continua
    Skip,
}

impl StepFailurePolicy {
    /// Converte string do .env. "skip" → Skip, qualquer outro valor → Abort.
    pub fn from_env(value: &str) -> Self {
        match value.to_lowercase().trim() {
            "skip" => Self::Skip,
            _ => Self::Abort,
        }
    }
}

/// Configuração do assistente.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Namespace das sessões
    pub app_name: String,
    /// Usuário padrão das sessões
    pub default_user_id: String,
    /// Política de falha de step
    pub step_failure_policy: StepFailurePolicy,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            default_user_id: DEFAULT_USER_ID.to_string(),
            step_failure_policy: StepFailurePolicy::default(),
        }
    }
}

/// Carrega configuração do LLM a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `LLM_PROVIDER`: "gemini" (padrão) ou "openai"
/// - `GOOGLE_API_KEY` / `OPENAI_API_KEY`: API key do provedor escolhido
/// - `GEMINI_MODEL`: modelo Gemini (padrão: gemini-2.0-flash-exp)
/// - `LLM_MODEL`: sobrescreve o modelo de qualquer provedor
/// - `LLM_API_BASE_URL`: URL base customizada
/// - `LLM_TEMPERATURE`: temperatura (padrão: 0.2)
pub fn load_llm_config() -> LlmConfig {
    load_llm_config_from(|key| std::env::var(key).ok())
}

/// Igual a [`load_llm_config`], lendo de uma função de lookup.
pub fn load_llm_config_from(lookup: impl Fn(&str) -> Option<String>) -> LlmConfig {
    let mut config = LlmConfig::default();

    if let Some(provider) = lookup("LLM_PROVIDER") {
        config.provider = LlmProvider::from_env(&provider);
        config.model = config.provider.default_model().to_string();
    }
    log::info!("📦 LLM_PROVIDER={}", config.provider);

    if config.provider == LlmProvider::Gemini {
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
    }

    if let Some(model) = lookup("LLM_MODEL").filter(|m| !m.trim().is_empty()) {
        config.model = model.trim().to_string();
    }
    log::info!("📦 Modelo: {}", config.model);

    config.api_key = lookup(config.provider.api_key_var()).filter(|k| !k.trim().is_empty());
    if config.api_key.is_none() {
        log::warn!("⚠ {} não definida", config.provider.api_key_var());
    }

    if let Some(url) = lookup("LLM_API_BASE_URL").filter(|u| !u.trim().is_empty()) {
        log::info!("📦 LLM_API_BASE_URL={}", url);
        config.api_base_url = Some(url.trim().trim_end_matches('/').to_string());
    }

    if let Some(temp_str) = lookup("LLM_TEMPERATURE") {
        if let Ok(temp) = temp_str.trim().parse::<f32>() {
            if (0.0..=2.0).contains(&temp) {
                config.temperature = temp;
                log::info!("📦 LLM_TEMPERATURE={}", temp);
            }
        }
    }

    config
}

/// Carrega configuração do assistente a partir das variáveis de ambiente.
///
/// Variáveis suportadas:
/// - `INBOX_APP_NAME`: namespace das sessões (padrão: inbox_assistant)
/// - `INBOX_USER_ID`: usuário padrão (padrão: user_001)
/// - `INBOX_STEP_FAILURE`: "abort" (padrão) ou "skip"
pub fn load_assistant_config() -> AssistantConfig {
    load_assistant_config_from(|key| std::env::var(key).ok())
}

/// Igual a [`load_assistant_config`], lendo de uma função de lookup.
pub fn load_assistant_config_from(lookup: impl Fn(&str) -> Option<String>) -> AssistantConfig {
    let mut config = AssistantConfig::default();

    if let Some(name) = lookup("INBOX_APP_NAME").filter(|n| !n.trim().is_empty()) {
        config.app_name = name.trim().to_string();
    }

    if let Some(user) = lookup("INBOX_USER_ID").filter(|u| !u.trim().is_empty()) {
        config.default_user_id = user.trim().to_string();
    }

    if let Some(policy) = lookup("INBOX_STEP_FAILURE") {
        config.step_failure_policy = StepFailurePolicy::from_env(&policy);
        log::info!("📦 INBOX_STEP_FAILURE={:?}", config.step_failure_policy);
    }

    config
}
