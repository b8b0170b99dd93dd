// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIPOS COMPARTILHADOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Nomes de campos do [`ResultRecord`].
pub mod fields {
    /// Resumo (string)
    pub const SUMMARY: &str = "summary";
    /// Urgência normalizada (High/Medium/Low)
    pub const URGENCY: &str = "urgency";
    /// Tom (lista de strings ou string única)
    pub const TONE: &str = "tone";
    /// Rascunho de resposta
    pub const DRAFT_REPLY: &str = "draft_reply";
    /// Itens de ação (lista de strings)
    pub const ACTION_ITEMS: &str = "action_items";
    /// Código de idioma detectado
    pub const LANGUAGE: &str = "language";
    /// Mensagem original
    pub const MESSAGE: &str = "message";
    /// Mensagem original, como gravada no estado da sessão
    pub const ORIGINAL_MESSAGE: &str = "original_message";
}

/// Idioma padrão quando a detecção falha
pub const DEFAULT_LANGUAGE: &str = "en";

/// Níveis de urgência
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Urgency {
    /// Requer atenção imediata
    High,
    /// Importante, mas não emergencial
    #[default]
    Medium,
    /// Informativo
    Low,
}

impl Urgency {
    /// Todos os níveis, do mais urgente ao menos urgente
    pub const ALL: [Urgency; 3] = [Urgency::High, Urgency::Medium, Urgency::Low];

    /// Retorna o nível como string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Normaliza texto livre para um nível de urgência.
    ///
    /// Aplica trim e capitalização ("  hIGh " → High). Qualquer valor
    /// fora dos três níveis vira o padrão ([`Urgency::Medium`]).
    pub fn normalize(raw: &str) -> Self {
        match capitalize(raw.trim()).as_str() {
            "High" => Self::High,
            "Low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normaliza urgência e devolve a string canônica.
///
/// ```rust
/// use inbox_assistant::types::normalize_urgency;
/// assert_eq!(normalize_urgency(" high "), "High");
/// assert_eq!(normalize_urgency("URGENT"), "Medium");
/// ```
pub fn normalize_urgency(raw: &str) -> &'static str {
    Urgency::normalize(raw).as_str()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Registro agregado de um processamento.
///
/// Mapa ordenado campo → valor JSON. Campos de steps que não produziram
/// JSON recuperável simplesmente não aparecem: ausência significa
/// "desconhecido", nunca um valor padrão.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord {
    fields: Map<String, Value>,
}

impl ResultRecord {
    /// Cria um registro vazio
    pub fn new() -> Self {
        Self::default()
    }

    /// Mescla campos no registro. Chaves existentes são sobrescritas.
    pub fn merge(&mut self, other: Map<String, Value>) {
        for (key, value) in other {
            self.fields.insert(key, value);
        }
    }

    /// Insere (ou sobrescreve) um campo
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Retorna um campo
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Retorna um campo string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Verifica presença de um campo
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Número de campos
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Registro sem campos?
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Nomes dos campos, na ordem de inserção
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Urgência, se presente e string
    pub fn urgency(&self) -> Option<Urgency> {
        self.get_str(fields::URGENCY).map(Urgency::normalize)
    }

    /// Tons como lista. Aceita lista ou string única.
    pub fn tones(&self) -> Vec<String> {
        match self.get(fields::TONE) {
            Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
            Some(Value::Null) | None => vec![],
            Some(other) => vec![value_to_string(other)],
        }
    }

    /// Itens de ação como lista. Aceita lista ou string única.
    pub fn action_items(&self) -> Vec<String> {
        match self.get(fields::ACTION_ITEMS) {
            Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
            Some(Value::Null) | None => vec![],
            Some(other) => vec![value_to_string(other)],
        }
    }

    /// Consome o registro e retorna o mapa
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    /// Acesso ao mapa interno
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
