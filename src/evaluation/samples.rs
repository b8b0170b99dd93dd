//! # Mensagens de Exemplo
//!
//! Dez mensagens rotuladas usadas pela avaliação: urgência esperada,
//! tons esperados, idioma e se devem gerar itens de ação.

use crate::types::Urgency;

/// Mensagem rotulada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleMessage {
    /// Identificador (ex: "urgent_technical")
    pub key: &'static str,
    /// Texto bruto
    pub text: &'static str,
    /// Urgência esperada
    pub expected_urgency: Urgency,
    /// Tons esperados
    pub expected_tone: &'static [&'static str],
    /// Idioma esperado
    pub language: &'static str,
    /// Se a mensagem pede alguma ação
    pub should_have_actions: bool,
}

impl SampleMessage {
    /// Texto sem espaços nas bordas
    pub fn message(&self) -> &'static str {
        self.text.trim()
    }

    /// Título legível ("urgent_technical" → "Urgent Technical")
    pub fn title(&self) -> String {
        self.key
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Conjunto fixo de mensagens rotuladas
pub const SAMPLE_MESSAGES: [SampleMessage; 10] = [
    SampleMessage {
        key: "urgent_technical",
        text: r#"
URGENT: Production Database Down

The main production database went offline 15 minutes ago. All customer
transactions are failing. This is impacting revenue and we're getting
hundreds of support tickets. Need immediate action from the DevOps team.

Please escalate to VP Engineering if not resolved in 30 minutes.
"#,
        expected_urgency: Urgency::High,
        expected_tone: &["Urgent", "Direct", "Professional"],
        language: "en",
        should_have_actions: true,
    },
    SampleMessage {
        key: "medium_request",
        text: r#"
Hi John,

Hope you're doing well. I wanted to check if you could review the Q3
report by end of this week? It's for the board meeting next Tuesday,
so we need to finalize it soon.

Let me know if you need any additional information.

Best regards,
Emily
"#,
        expected_urgency: Urgency::Medium,
        expected_tone: &["Polite", "Formal", "Friendly"],
        language: "en",
        should_have_actions: true,
    },
    SampleMessage {
        key: "low_informational",
        text: r#"
FYI - Office Hours Update

Just a heads up that our office hours will be changing next month to
9 AM - 6 PM instead of 8 AM - 5 PM. This affects parking access codes
which will be sent separately.

No action needed from you.
"#,
        expected_urgency: Urgency::Low,
        expected_tone: &["Neutral", "Informational"],
        language: "en",
        should_have_actions: false,
    },
    SampleMessage {
        key: "angry_customer",
        text: r#"
Subject: UNACCEPTABLE SERVICE!!!

I have been waiting for THREE WEEKS for a response to my support ticket
#45678. This is absolutely unacceptable! I paid for premium support and
I'm getting NOTHING. I want a full refund and I'm going to post about
this terrible experience on social media.

Fix this NOW or I'm canceling my subscription.
"#,
        expected_urgency: Urgency::High,
        expected_tone: &["Angry", "Direct", "Urgent"],
        language: "en",
        should_have_actions: true,
    },
    SampleMessage {
        key: "friendly_casual",
        text: r#"
Hey! 😊

Just wanted to say thanks for helping out with the presentation yesterday.
You totally saved me! The client loved it and we got the deal!!!

Coffee's on me next time - let me know when you're free!

Cheers,
Mike
"#,
        expected_urgency: Urgency::Low,
        expected_tone: &["Friendly", "Casual", "Appreciative"],
        language: "en",
        should_have_actions: false,
    },
    SampleMessage {
        key: "formal_business",
        text: r#"
Dear Dr. Patterson,

I am writing to request your participation as a keynote speaker at our
Annual Healthcare Innovation Summit on March 15-17, 2026. Your research
on AI in diagnostics would be invaluable to our audience of 500+
healthcare professionals.

We would be honored to offer an honorarium of $5,000 plus travel expenses.
Would you be available for a brief call next week to discuss details?

Respectfully yours,
Dr. Jennifer Morrison
Conference Chair
"#,
        expected_urgency: Urgency::Medium,
        expected_tone: &["Formal", "Polite", "Professional"],
        language: "en",
        should_have_actions: true,
    },
    SampleMessage {
        key: "multilingual_spanish",
        text: r#"
Hola María,

Espero que estés bien. Quería recordarte sobre la reunión del proyecto
mañana a las 10 AM. Por favor, prepara el informe de progreso y trae
las actualizaciones del equipo.

Nos vemos mañana!

Saludos,
Carlos
"#,
        expected_urgency: Urgency::Medium,
        expected_tone: &["Friendly", "Professional"],
        language: "es",
        should_have_actions: true,
    },
    SampleMessage {
        key: "meeting_request",
        text: r#"
Hi Sarah,

Can we schedule a 30-minute sync this week to discuss the new marketing
campaign? I'd like to go over the budget allocation and timeline.
Thursday or Friday afternoon works best for me.

Also, please bring the analytics from the last campaign so we can compare.

Thanks!
Alex
"#,
        expected_urgency: Urgency::Medium,
        expected_tone: &["Polite", "Professional"],
        language: "en",
        should_have_actions: true,
    },
    SampleMessage {
        key: "multiple_tasks",
        text: r#"
Team Update - Action Items

Following our standup:

1. Jake - please deploy the hotfix to staging by EOD today
2. Lisa - review and approve the PR #234 for the authentication update
3. Tom - update the API documentation with the new endpoints
4. Everyone - submit your time logs by Friday for payroll processing

Let me know if there are any blockers.

Thanks,
Project Manager
"#,
        expected_urgency: Urgency::Medium,
        expected_tone: &["Direct", "Professional"],
        language: "en",
        should_have_actions: true,
    },
    SampleMessage {
        key: "appreciative_positive",
        text: r#"
Hi Team,

I just wanted to take a moment to thank everyone for the incredible work
on the product launch. We exceeded our targets by 150% and the client
feedback has been overwhelmingly positive.

I'm genuinely impressed by the dedication and quality everyone brought
to this project. Well done!

Warm regards,
Sandra
VP of Product
"#,
        expected_urgency: Urgency::Low,
        expected_tone: &["Appreciative", "Positive", "Professional"],
        language: "en",
        should_have_actions: false,
    },
];

/// Busca uma mensagem pelo identificador
pub fn get_sample(key: &str) -> Option<&'static SampleMessage> {
    SAMPLE_MESSAGES.iter().find(|s| s.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{HeuristicLanguageDetector, LanguageDetector};
    use std::collections::HashSet;

    #[test]
    fn test_sample_keys_are_unique() {
        let keys: HashSet<_> = SAMPLE_MESSAGES.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), SAMPLE_MESSAGES.len());
    }

    #[test]
    fn test_get_sample() {
        let sample = get_sample("urgent_technical").unwrap();
        assert!(sample.message().starts_with("URGENT: Production Database Down"));
        assert!(sample.message().ends_with("30 minutes."));
        assert_eq!(sample.expected_urgency, Urgency::High);
        assert!(get_sample("missing").is_none());
    }

    #[test]
    fn test_title() {
        assert_eq!(get_sample("urgent_technical").unwrap().title(), "Urgent Technical");
    }

    #[test]
    fn test_heuristic_detector_matches_sample_languages() {
        let detector = HeuristicLanguageDetector::new();
        for sample in &SAMPLE_MESSAGES {
            assert_eq!(
                detector.detect(sample.message()).unwrap(),
                sample.language,
                "wrong language for {}",
                sample.key
            );
        }
    }
}
