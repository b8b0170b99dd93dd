//! # Steps do Pipeline
//!
//! Tabela fixa dos cinco steps, na ordem de execução:
//!
//! 1. `SummarizerAgent` → `summary`
//! 2. `UrgencyClassifierAgent` → `urgency`
//! 3. `ToneAnalyzerAgent` → `tone`
//! 4. `ReplyGeneratorAgent` → `draft_reply`
//! 5. `NextStepPlannerAgent` → `action_items`
//!
//! As instruções são estáticas: nenhum step lê a saída estruturada
//! de outro (os turnos anteriores só entram como contexto textual).

use std::fmt;

use crate::types::fields;

/// Tons aceitos pelo analisador de tom
pub const TONE_CATEGORIES: [&str; 11] = [
    "Formal",
    "Informal",
    "Friendly",
    "Polite",
    "Direct",
    "Angry",
    "Appreciative",
    "Urgent",
    "Neutral",
    "Professional",
    "Casual",
];

/// Especificação imutável de um step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepSpec {
    /// Nome do step (autor dos eventos)
    pub name: &'static str,
    /// Campo do registro que o step possui
    pub output_key: &'static str,
    /// Descrição curta
    pub description: &'static str,
    /// Instrução de sistema enviada ao LLM
    pub instruction: &'static str,
}

impl fmt::Display for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.name, self.output_key)
    }
}

// ============================================================================
// STEP 1: Summarizer
// ============================================================================

const SUMMARIZER_INSTRUCTION: &str = r#"You are a Summarization Agent that summarizes communications.

Your task:
- Summarize the message in 2-4 concise sentences
- Focus on main points, requests, and important details
- Preserve the original language
- Be clear and actionable

Return ONLY a JSON object with this structure:
{
  "summary": "Your concise summary here..."
}"#;

// ============================================================================
// STEP 2: Urgency Classifier
// ============================================================================

const URGENCY_INSTRUCTION: &str = r#"You are an Urgency Classifier Agent that categorizes message priority.

Classification criteria:
- HIGH: Requires immediate attention (crisis, urgent deadline, critical issue)
- MEDIUM: Important but not emergency (needs response within days)
- LOW: Informational or non-urgent (no immediate action required)

Analyze for urgency signals:
- Time-sensitive words ("urgent", "ASAP", "immediately", "today")
- Deadline mentions
- Emotional intensity
- Business impact

Return ONLY a JSON object:
{
  "urgency": "High" | "Medium" | "Low",
  "reasoning": "Brief explanation"
}"#;

// ============================================================================
// STEP 3: Tone Analyzer
// ============================================================================

const TONE_INSTRUCTION: &str = r#"You are a Tone Analyzer Agent that detects sender's tone and mood.

Analyze for:
- Formality level (Formal vs Informal)
- Emotional state (Angry, Friendly, Neutral, etc.)
- Communication style (Direct, Polite, Professional, Casual)

Available tones: Formal, Informal, Friendly, Polite, Direct, Angry, Appreciative, Urgent, Neutral, Professional, Casual

Return ONLY a JSON object:
{
  "tone": ["Primary Tone", "Secondary Tone"],
  "formality": "Formal" | "Informal" | "Neutral",
  "sentiment": "Positive" | "Negative" | "Neutral"
}"#;

// ============================================================================
// STEP 4: Reply Generator
// ============================================================================

const REPLY_INSTRUCTION: &str = r#"You are a Reply Generator Agent that drafts professional responses.

Using the message context:
- Address all questions and requests from the original message
- Match or appropriately respond to the sender's tone
- Be concise and professional
- For high urgency, show promptness and understanding
- For angry/frustrated tones, be empathetic
- Maintain appropriate formality level

Return ONLY a JSON object:
{
  "draft_reply": "Your complete draft response here...",
  "reply_tone": "Tone of the response"
}

DO NOT include email headers, just the message body."#;

// ============================================================================
// STEP 5: Next-Step Planner
// ============================================================================

const PLANNER_INSTRUCTION: &str = r#"You are a Next-Step Planner Agent that extracts actionable tasks.

Identify:
- Explicit requests and tasks
- Implicit action items
- Deadlines and due dates
- Questions that require responses

For each action:
- State it as a clear, actionable task
- Include deadline if mentioned
- Start with an action verb

Return ONLY a JSON object:
{
  "action_items": [
    "Task 1 with deadline if applicable",
    "Task 2..."
  ]
}

If no actions needed: {"action_items": ["No action required"]}"#;

/// Os cinco steps, na ordem de execução
pub const STEPS: [StepSpec; 5] = [
    StepSpec {
        name: "SummarizerAgent",
        output_key: fields::SUMMARY,
        description: "Summarizes long messages into concise key points",
        instruction: SUMMARIZER_INSTRUCTION,
    },
    StepSpec {
        name: "UrgencyClassifierAgent",
        output_key: fields::URGENCY,
        description: "Classifies message urgency as High, Medium, or Low",
        instruction: URGENCY_INSTRUCTION,
    },
    StepSpec {
        name: "ToneAnalyzerAgent",
        output_key: fields::TONE,
        description: "Analyzes the emotional tone and formality of messages",
        instruction: TONE_INSTRUCTION,
    },
    StepSpec {
        name: "ReplyGeneratorAgent",
        output_key: fields::DRAFT_REPLY,
        description: "Generates contextually appropriate draft replies",
        instruction: REPLY_INSTRUCTION,
    },
    StepSpec {
        name: "NextStepPlannerAgent",
        output_key: fields::ACTION_ITEMS,
        description: "Extracts actionable tasks and next steps",
        instruction: PLANNER_INSTRUCTION,
    },
];

/// Busca um step pelo nome ou pelo campo de saída
pub fn find_step(name_or_key: &str) -> Option<&'static StepSpec> {
    STEPS
        .iter()
        .find(|s| s.name == name_or_key || s.output_key == name_or_key)
}
