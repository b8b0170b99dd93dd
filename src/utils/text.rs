// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TEXT UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Utilitários para processamento de texto:
// - Truncation respeitando palavras
// - Extração heurística de itens de ação
// - Contagem de palavras
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resposta quando nenhum item de ação é encontrado
pub const NO_ACTION_ITEMS: &str = "No specific action items detected";

/// Verbos que indicam uma ação
const ACTION_VERBS: &[&str] = &[
    "send", "submit", "complete", "review", "update", "schedule", "prepare", "confirm", "respond",
    "call", "email", "follow up", "check", "verify", "provide",
];

/// Linhas mais curtas que isso não viram item de ação
const MIN_ACTION_LINE_CHARS: usize = 10;

/// Trunca texto para no máximo `max_chars` caracteres, cortando na última
/// palavra inteira e adicionando "...".
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let Some((end, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let truncated = &text[..end];
    let truncated = match truncated.rfind(' ') {
        Some(space) if space > 0 => &truncated[..space],
        _ => truncated,
    };

    format!("{}...", truncated)
}

/// Extrai itens de ação por heurística (linhas com verbos de ação).
///
/// Sem nenhum item, retorna `[NO_ACTION_ITEMS]`.
pub fn extract_action_items(text: &str) -> Vec<String> {
    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_ACTION_LINE_CHARS)
        .filter(|line| {
            let lower = line.to_lowercase();
            ACTION_VERBS.iter().any(|verb| lower.contains(verb))
        })
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        vec![NO_ACTION_ITEMS.to_string()]
    } else {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_short() {
        assert_eq!(truncate_text("short text", 1000), "short text");
        assert_eq!(truncate_text("", 10), "");
    }

    #[test]
    fn test_truncate_text_word_boundary() {
        let text = "The quick brown fox jumps over the lazy dog";
        assert_eq!(truncate_text(text, 12), "The quick...");
    }

    #[test]
    fn test_truncate_text_no_space() {
        assert_eq!(truncate_text("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_truncate_text_multibyte() {
        // Não deve dar panic em boundary de caractere
        let text = "ação ação ação ação";
        assert_eq!(truncate_text(text, 6), "ação...");
    }

    #[test]
    fn test_extract_action_items() {
        let text = "Hi team,\n\
                    1. Jake - please deploy the hotfix to staging\n\
                    2. Lisa - review and approve the PR #234\n\
                    3. Tom - update the API documentation\n\
                    Thanks";
        let items = extract_action_items(text);
        assert_eq!(items.len(), 2);
        assert!(items[0].starts_with("2. Lisa"));
        assert!(items[1].starts_with("3. Tom"));
    }

    #[test]
    fn test_extract_action_items_none() {
        let items = extract_action_items("Just saying hello.\nHave a nice day!");
        assert_eq!(items, vec![NO_ACTION_ITEMS.to_string()]);
    }

    #[test]
    fn test_extract_action_items_ignores_short_lines() {
        assert_eq!(extract_action_items("call me"), vec![NO_ACTION_ITEMS.to_string()]);
    }
}
