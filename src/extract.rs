// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EXTRAÇÃO DE JSON DE RESPOSTAS DO LLM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Recupera um objeto JSON de texto livre, tolerando:
// - JSON puro
// - JSON dentro de bloco ```json ... ```
// - JSON dentro de bloco genérico ``` ... ```
// Qualquer outra coisa vira Extraction::Empty. Nunca retorna erro.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use serde_json::{Map, Value};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Resultado de uma extração: campos recuperados ou nada.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Objeto JSON recuperado
    Fields(Map<String, Value>),
    /// Nenhum JSON recuperável
    Empty,
}

impl Extraction {
    /// Retorna os campos (mapa vazio se `Empty`)
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Fields(map) => map,
            Self::Empty => Map::new(),
        }
    }

    /// Nenhum campo recuperado?
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Fields(map) => map.is_empty(),
            Self::Empty => true,
        }
    }

    /// Número de campos recuperados
    pub fn len(&self) -> usize {
        match self {
            Self::Fields(map) => map.len(),
            Self::Empty => 0,
        }
    }
}

/// Extrai um objeto JSON de uma resposta do LLM.
///
/// Ordem das tentativas:
/// 1. Texto inteiro como JSON
/// 2. Corpo do primeiro bloco ```json até o próximo ```
/// 3. Corpo do primeiro bloco ``` genérico (a linha de tag, se houver, é ignorada)
///
/// Apenas objetos contam; arrays e escalares são tratados como falha.
/// Bloco sem fechamento também é falha.
pub fn extract_fields(raw: &str) -> Extraction {
    let trimmed = raw.trim();

    if let Some(map) = parse_object(trimmed) {
        return Extraction::Fields(map);
    }

    if let Some(map) = fenced_body(trimmed, JSON_FENCE).and_then(parse_object) {
        return Extraction::Fields(map);
    }

    if let Some(map) = fenced_body(trimmed, FENCE)
        .map(skip_language_tag)
        .and_then(parse_object)
    {
        return Extraction::Fields(map);
    }

    log::debug!(
        "Nenhum JSON recuperável na resposta: {}",
        trimmed.chars().take(120).collect::<String>()
    );
    Extraction::Empty
}

/// Atalho para [`extract_fields`] que devolve o mapa diretamente.
pub fn extract(raw: &str) -> Map<String, Value> {
    extract_fields(raw).into_map()
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn fenced_body<'a>(text: &'a str, opening: &str) -> Option<&'a str> {
    let start = text.find(opening)? + opening.len();
    let rest = &text[start..];
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim())
}

fn skip_language_tag(body: &str) -> &str {
    match body.split_once('\n') {
        Some((first, rest)) if is_language_tag(first.trim()) => rest.trim(),
        _ => body,
    }
}

fn is_language_tag(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> Map<String, Value> {
        match json!({"urgency": "High", "reasoning": "Production is down"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_plain_json() {
        let raw = r#"{"urgency": "High", "reasoning": "Production is down"}"#;
        assert_eq!(extract_fields(raw), Extraction::Fields(expected()));
    }

    #[test]
    fn test_plain_json_with_surrounding_whitespace() {
        let raw = "\n\n  {\"urgency\": \"High\", \"reasoning\": \"Production is down\"}  \n";
        assert_eq!(extract(raw), expected());
    }

    #[test]
    fn test_json_tagged_fence() {
        let raw = "Here is the result:\n```json\n{\"urgency\": \"High\", \"reasoning\": \"Production is down\"}\n```\nHope it helps.";
        assert_eq!(extract(raw), expected());
    }

    #[test]
    fn test_generic_fence() {
        let raw = "```\n{\"urgency\": \"High\", \"reasoning\": \"Production is down\"}\n```";
        assert_eq!(extract(raw), expected());
    }

    #[test]
    fn test_generic_fence_with_other_tag() {
        let raw = "```JSON\n{\"urgency\": \"High\", \"reasoning\": \"Production is down\"}\n```";
        assert_eq!(extract(raw), expected());
    }

    #[test]
    fn test_prose_yields_empty() {
        let raw = "The sender sounds quite frustrated and direct.";
        assert_eq!(extract_fields(raw), Extraction::Empty);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_fields(""), Extraction::Empty);
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_broken_json_in_tagged_fence_yields_empty() {
        let raw = "```json\n{\"urgency\": \"High\",\n```";
        assert_eq!(extract_fields(raw), Extraction::Empty);
    }

    #[test]
    fn test_unclosed_fence_yields_empty() {
        let raw = "```json\n{\"urgency\": \"High\"}";
        assert_eq!(extract_fields(raw), Extraction::Empty);
    }

    #[test]
    fn test_non_object_json_is_not_a_mapping() {
        assert_eq!(extract_fields("[1, 2, 3]"), Extraction::Empty);
        assert_eq!(extract_fields("\"High\""), Extraction::Empty);
        assert_eq!(extract_fields("```json\n[\"a\"]\n```"), Extraction::Empty);
    }

    #[test]
    fn test_extraction_helpers() {
        let fields = extract_fields(r#"{"a": 1, "b": 2}"#);
        assert_eq!(fields.len(), 2);
        assert!(!fields.is_empty());
        assert!(Extraction::Empty.is_empty());
        assert_eq!(Extraction::Empty.len(), 0);
    }
}
