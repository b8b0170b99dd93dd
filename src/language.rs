// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DETECÇÃO DE IDIOMA
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Trait para detectores de idioma e uma implementação heurística:
// - Scripts não latinos (CJK, cirílico, árabe...) por faixa Unicode
// - Idiomas latinos por contagem de stopwords
// Falha de detecção vira "en" no pipeline (detect_or_default).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::types::DEFAULT_LANGUAGE;

/// Erros de detecção de idioma
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LanguageError {
    /// Texto sem letras
    #[error("No alphabetic content to analyze")]
    NoFeatures,

    /// Nenhum idioma reconhecido
    #[error("Language could not be determined")]
    Undetectable,
}

/// Detector de idioma.
///
/// Retorna um código ISO-639-1 ("en", "es", "pt"...).
pub trait LanguageDetector: Send + Sync {
    /// Detecta o idioma do texto
    fn detect(&self, text: &str) -> Result<String, LanguageError>;
}

/// Detecta o idioma, caindo para [`DEFAULT_LANGUAGE`] em caso de erro.
pub fn detect_or_default(detector: &dyn LanguageDetector, text: &str) -> String {
    match detector.detect(text) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("🌐 Detecção de idioma falhou ({}), usando '{}'", e, DEFAULT_LANGUAGE);
            DEFAULT_LANGUAGE.to_string()
        }
    }
}

/// Stopwords por idioma latino (ordem = prioridade em caso de empate)
const STOPWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "is", "are", "to", "of", "in", "for", "you", "that", "this", "with",
            "have", "be", "it", "we", "please", "on", "not", "will", "can", "your", "i", "was",
            "hi", "thanks", "an", "if", "need", "just",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "que", "y", "en", "un", "una", "por", "para", "con", "es",
            "del", "se", "mañana", "estoy", "hola", "gracias", "tu", "al", "lo", "como", "espero",
            "nos", "saludos", "favor",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "que", "e", "em", "um", "uma", "para", "com", "não", "é", "do", "da",
            "dos", "das", "você", "obrigado", "olá", "no", "na", "amanhã", "estou", "por",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "des", "et", "est", "un", "une", "pour", "avec", "que", "pas",
            "vous", "je", "nous", "dans", "du", "au", "bonjour", "merci", "ce", "sur",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "ich", "sie", "wir", "mit", "für", "auf",
            "ein", "eine", "zu", "von", "den", "dem", "bitte", "danke", "es", "hallo",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "di", "che", "è", "un", "una", "per", "con", "non", "sono", "ciao",
            "grazie", "della", "nel", "ho", "mi",
        ],
    ),
    (
        "nl",
        &[
            "het", "een", "en", "is", "van", "niet", "ik", "je", "wij", "voor", "met", "op",
            "dat", "zijn", "bedankt", "hallo",
        ],
    ),
];

/// Detector heurístico sem dependências externas.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicLanguageDetector;

impl HeuristicLanguageDetector {
    /// Cria um novo detector
    pub fn new() -> Self {
        Self
    }

    fn detect_script(text: &str) -> Option<&'static str> {
        let mut letters = 0usize;
        let mut kana = 0usize;
        let mut hangul = 0usize;
        let mut han = 0usize;
        let mut cyrillic = 0usize;
        let mut arabic = 0usize;
        let mut greek = 0usize;
        let mut hebrew = 0usize;
        let mut thai = 0usize;

        for c in text.chars().filter(|c| c.is_alphabetic()) {
            letters += 1;
            match c as u32 {
                0x3040..=0x30FF => kana += 1,
                0xAC00..=0xD7AF | 0x1100..=0x11FF => hangul += 1,
                0x4E00..=0x9FFF | 0x3400..=0x4DBF => han += 1,
                0x0400..=0x04FF => cyrillic += 1,
                0x0600..=0x06FF => arabic += 1,
                0x0370..=0x03FF => greek += 1,
                0x0590..=0x05FF => hebrew += 1,
                0x0E00..=0x0E7F => thai += 1,
                _ => {}
            }
        }

        if letters == 0 {
            return None;
        }

        // Japonês mistura kana e kanji
        if kana > 0 && kana + han > letters / 2 {
            return Some("ja");
        }

        [
            ("ko", hangul),
            ("zh", han),
            ("ru", cyrillic),
            ("ar", arabic),
            ("el", greek),
            ("he", hebrew),
            ("th", thai),
        ]
        .into_iter()
        .find(|(_, count)| *count > letters / 2)
        .map(|(code, _)| code)
    }

    fn score_stopwords(words: &[String]) -> Option<&'static str> {
        let mut best: Option<(&'static str, usize)> = None;

        for &(code, stopwords) in STOPWORDS {
            let score = words
                .iter()
                .filter(|w| stopwords.contains(&w.as_str()))
                .count();

            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((code, score));
            }
        }

        best.map(|(code, _)| code)
    }
}

impl LanguageDetector for HeuristicLanguageDetector {
    fn detect(&self, text: &str) -> Result<String, LanguageError> {
        if !text.chars().any(char::is_alphabetic) {
            return Err(LanguageError::NoFeatures);
        }

        if let Some(code) = Self::detect_script(text) {
            return Ok(code.to_string());
        }

        let words: Vec<String> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self::score_stopwords(&words)
            .map(str::to_string)
            .ok_or(LanguageError::Undetectable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingDetector;

    impl LanguageDetector for FailingDetector {
        fn detect(&self, _text: &str) -> Result<String, LanguageError> {
            Err(LanguageError::Undetectable)
        }
    }

    #[test]
    fn test_detect_english() {
        let detector = HeuristicLanguageDetector::new();
        assert_eq!(detector.detect("This is an English message.").unwrap(), "en");
    }

    #[test]
    fn test_detect_spanish() {
        let detector = HeuristicLanguageDetector::new();
        let text = "Hola María, espero que estés bien. Quería recordarte sobre la reunión \
                    del proyecto mañana a las 10 AM. Por favor, prepara el informe.";
        assert_eq!(detector.detect(text).unwrap(), "es");
    }

    #[test]
    fn test_detect_non_latin_scripts() {
        let detector = HeuristicLanguageDetector::new();
        assert_eq!(detector.detect("Привет, как дела?").unwrap(), "ru");
        assert_eq!(detector.detect("こんにちは、元気ですか").unwrap(), "ja");
        assert_eq!(detector.detect("안녕하세요").unwrap(), "ko");
    }

    #[test]
    fn test_detect_fails_without_letters() {
        let detector = HeuristicLanguageDetector::new();
        assert_eq!(detector.detect("12345 ?!"), Err(LanguageError::NoFeatures));
        assert_eq!(detector.detect(""), Err(LanguageError::NoFeatures));
    }

    #[test]
    fn test_detect_fails_without_signal() {
        let detector = HeuristicLanguageDetector::new();
        assert_eq!(detector.detect("ñ¿?"), Err(LanguageError::Undetectable));
    }

    #[test]
    fn test_detect_or_default() {
        assert_eq!(detect_or_default(&FailingDetector, "anything"), "en");
        assert_eq!(
            detect_or_default(&HeuristicLanguageDetector, "Thanks for the update, see you"),
            "en"
        );
    }
}
