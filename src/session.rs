// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SESSÕES - Contexto de Conversa por Mensagem
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Cada processamento cria seu próprio SessionContext (sem singleton global).
// O SessionStore é best-effort: falhas de create não abortam o pipeline.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;

/// Erros do armazenamento de sessões
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Já existe sessão com a chave
    #[error("Session already exists: {0}")]
    AlreadyExists(String),

    /// Sessão inexistente
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Falha do backend de armazenamento
    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Identificador completo de uma sessão
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// Namespace da aplicação
    pub app_name: String,
    /// Usuário dono da sessão
    pub user_id: String,
    /// ID da sessão
    pub session_id: String,
}

impl SessionKey {
    /// Cria uma chave explícita
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Cria uma chave com ID de sessão novo (`session_<uuid>`)
    pub fn generate(app_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::new(app_name, user_id, format!("session_{}", uuid::Uuid::new_v4()))
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// Papel de um turno na conversa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Mensagem do usuário
    User,
    /// Resposta de um step
    Model,
}

/// Um turno da conversa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Papel
    pub role: TurnRole,
    /// Autor ("user" ou nome do step)
    pub author: String,
    /// Texto
    pub text: String,
    /// Momento do registro
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Turno do usuário
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            author: "user".into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Turno de um step
    pub fn model(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            author: author.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Sessão persistida
#[derive(Debug, Clone)]
pub struct Session {
    /// Chave da sessão
    pub key: SessionKey,
    /// Estado inicial da sessão
    pub state: Map<String, Value>,
    /// Turnos na ordem de chegada
    pub turns: Vec<ConversationTurn>,
    /// Momento da criação
    pub created_at: DateTime<Utc>,
}

/// Armazenamento de sessões.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Cria uma sessão com estado inicial. Falha se a chave já existir.
    async fn create(&self, key: &SessionKey, state: Map<String, Value>)
        -> Result<Session, SessionError>;

    /// Busca uma sessão
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, SessionError>;

    /// Adiciona um turno à sessão
    async fn append_turn(&self, key: &SessionKey, turn: ConversationTurn)
        -> Result<(), SessionError>;

    /// Remove uma sessão. Retorna se existia.
    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionError>;
}

/// Armazenamento em memória, seguro para chamadas concorrentes.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl InMemorySessionStore {
    /// Cria um armazenamento vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de sessões armazenadas
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Armazenamento vazio?
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        key: &SessionKey,
        state: Map<String, Value>,
    ) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(key) {
            return Err(SessionError::AlreadyExists(key.to_string()));
        }

        let session = Session {
            key: key.clone(),
            state,
            turns: Vec::new(),
            created_at: Utc::now(),
        };
        sessions.insert(key.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn append_turn(
        &self,
        key: &SessionKey,
        turn: ConversationTurn,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(key)
            .ok_or_else(|| SessionError::NotFound(key.to_string()))?;
        session.turns.push(turn);
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionError> {
        Ok(self.sessions.write().await.remove(key).is_some())
    }
}

/// Contexto de conversa de um único processamento.
///
/// Guarda localmente os turnos para montar o contexto dos steps, mesmo
/// quando o store falhou (`persisted == false`).
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Chave da sessão
    pub key: SessionKey,
    /// Se a sessão foi criada no store
    pub persisted: bool,
    turns: Vec<ConversationTurn>,
}

impl SessionContext {
    /// Novo contexto, sem turnos
    pub fn new(key: SessionKey, persisted: bool) -> Self {
        Self {
            key,
            persisted,
            turns: Vec::new(),
        }
    }

    /// Turnos acumulados
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Adiciona um turno local
    pub fn push_turn(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }
}
