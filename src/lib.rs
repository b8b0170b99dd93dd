//! # Inbox Assistant
//!
//! Este crate implementa um **assistente de inbox**: recebe uma mensagem
//! (email, chat, ticket) e roda um pipeline fixo de cinco steps de LLM
//! para produzir um registro de análise.
//!
//! ## O que o assistente produz?
//!
//! Para cada mensagem, um [`ResultRecord`] com:
//! 1. `summary`: resumo em 2-4 frases
//! 2. `urgency`: `High`, `Medium` ou `Low`
//! 3. `tone`: lista de tons do remetente
//! 4. `draft_reply`: rascunho de resposta
//! 5. `action_items`: tarefas extraídas
//!
//! Mais `language` (detectado localmente) e `message` (o texto de entrada).
//!
//! ## Arquitetura Principal
//!
//! ### 1. Pipeline (`pipeline`)
//! Os cinco steps rodam em sequência. Cada step vê a mensagem e os turnos
//! anteriores da sessão; a saída de cada um é extraída e mesclada no
//! registro.
//!
//! ### 2. Extração tolerante (`extract`)
//! Respostas do LLM raramente são JSON puro. O extrator tenta o texto
//! inteiro, depois blocos cercados por crases. Falha nunca é erro.
//!
//! ### 3. Colaboradores plugáveis
//! - [`llm::LlmClient`]: Gemini, OpenAI ou mock
//! - [`session::SessionStore`]: sessões de conversa (memória por padrão)
//! - [`language::LanguageDetector`]: detecção de idioma
//!
//! ### 4. Avaliação (`evaluation`)
//! Mede o assistente contra dez mensagens rotuladas.
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use inbox_assistant::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let llm = create_llm_client(&load_llm_config())?;
//!     let assistant = InboxAssistant::new(llm);
//!     let record = assistant.process("URGENT: Production Database Down").await?;
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Tipos fundamentais compartilhados por todo o sistema.
///
/// - [`ResultRecord`]: registro agregado de uma mensagem
/// - [`Urgency`]: níveis de urgência e normalização
/// - [`fields`]: nomes dos campos do registro
pub mod types;

/// Extração tolerante de JSON das respostas do LLM.
///
/// Ordem de tentativas:
/// - Texto inteiro como objeto JSON
/// - Bloco cercado por "```json"
/// - Bloco cercado genérico
pub mod extract;

/// Detecção de idioma.
///
/// Define a trait `LanguageDetector` e um detector heurístico.
/// Falhas viram o idioma padrão `"en"`.
pub mod language;

/// Clientes para Large Language Models (LLMs).
///
/// Define a trait `LlmClient` e implementações para:
/// - Gemini (`generateContent`)
/// - OpenAI (chat completions)
/// - Mock roteirizado para testes
pub mod llm;

/// Sessões de conversa.
///
/// Define a trait `SessionStore` e um store em memória. Cada
/// processamento cria a própria sessão.
pub mod session;

/// Configuração do LLM e do assistente.
///
/// Fornece configuração dinâmica via variáveis de ambiente:
///
/// **LLM:**
/// - `LLM_PROVIDER`: Provider ("gemini", "openai") - padrão: "gemini"
/// - `GOOGLE_API_KEY` / `OPENAI_API_KEY`: chave do provider
/// - `GEMINI_MODEL` / `LLM_MODEL`: Modelo (padrão: "gemini-2.0-flash-exp")
/// - `LLM_API_BASE_URL`: URL base customizada (opcional)
/// - `LLM_TEMPERATURE`: Temperatura (padrão: 0.2)
///
/// **Assistente:**
/// - `INBOX_APP_NAME`: Nome da aplicação nas sessões
/// - `INBOX_USER_ID`: Usuário padrão
/// - `INBOX_STEP_FAILURE`: "abort" (padrão) ou "skip"
pub mod config;

/// Pipeline de cinco steps e o agregador [`InboxAssistant`].
pub mod pipeline;

/// Avaliação do assistente sobre mensagens rotuladas.
///
/// - Acurácia de urgência
/// - Sobreposição de tons
/// - Detecção de ações e de idioma
/// - Exportação do relatório em JSON
pub mod evaluation;

/// Utilitários de texto.
pub mod utils;

// Re-exports principais
pub use config::{
    load_assistant_config, load_llm_config, AssistantConfig, LlmConfig, LlmProvider,
    StepFailurePolicy,
};
pub use extract::{extract, extract_fields, Extraction};
pub use pipeline::{AssistantError, InboxAssistant, ProcessOptions};
pub use types::*;

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude com imports comuns para uso rápido.
///
/// Importar tudo de uma vez:
/// ```rust,ignore
/// use inbox_assistant::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{load_assistant_config, load_llm_config, StepFailurePolicy};
    pub use crate::extract::{extract_fields, Extraction};
    pub use crate::language::{HeuristicLanguageDetector, LanguageDetector};
    pub use crate::llm::{create_llm_client, LlmClient, MockLlmClient};
    pub use crate::pipeline::{InboxAssistant, ProcessOptions, STEPS};
    pub use crate::session::{InMemorySessionStore, SessionStore};
    pub use crate::types::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
