//! Prompt composition.
//!
//! Merges the system role, the tone guideline and the user's message into the
//! exact payload sent to the generator. The user text is passed through as-is.

/// Persona preamble placed at the top of every prompt.
pub const SYSTEM_ROLE: &str =
    "You are a caring AI assistant. Your goal is to be understanding and empathetic.";

/// User-facing reply when no generated text could be obtained.
pub const FALLBACK_APOLOGY: &str = "I'm having trouble connecting right now.";

/// Instruction placed before the passage in a rewrite prompt.
pub const REWRITE_INSTRUCTION: &str = "Rewrite the following passage to a 6th-grade reading level:";

/// A composed prompt. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
}

impl GenerationRequest {
    pub fn as_str(&self) -> &str {
        &self.prompt
    }
}

/// Build the generation request for `user_text` under `tone_instruction`.
pub fn compose(user_text: &str, tone_instruction: &str) -> GenerationRequest {
    let prompt = format!(
        "**System Role:** {}\n\
         **Tone and Style Guideline:** {}\n\
         **User's Message:** \"{}\"\n\
         **Your Response:**\n",
        SYSTEM_ROLE, tone_instruction, user_text
    );
    GenerationRequest { prompt }
}

/// Build the generation request that simplifies `text`.
pub fn compose_rewrite(text: &str) -> GenerationRequest {
    GenerationRequest {
        prompt: format!("{}\n\n{}", REWRITE_INSTRUCTION, text),
    }
}
