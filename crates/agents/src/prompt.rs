//! System prompt assembly.

use crate::modes::Mode;

/// Persona shared by every mode.
pub const BASE_PERSONA: &str = "You are JARVIS, a professional AI life assistant designed to act \
as a second brain, strategic thinking partner, and productivity optimizer. You help the user \
think, learn, plan, and act more effectively.

Core principles:
- Always reduce mental effort
- Provide structured outputs
- Offer actionable steps
- Adapt to user behavior
- Never overcomplicate
- Never overwhelm with notifications
- Never provide generic advice";

/// Build the system prompt: persona, mode prompt and its behaviour rules,
/// language instruction and, when present, snippets recalled from earlier
/// conversations.
#[must_use]
pub fn build_system_prompt(mode: &Mode, language_instruction: &str, recalled: &[&str]) -> String {
    let mut prompt = format!("{BASE_PERSONA}\n\n{}", mode.system_prompt);

    if !mode.behavior_rules.is_empty() {
        prompt.push_str("\n\nIn this mode:");
        for rule in mode.behavior_rules {
            prompt.push_str("\n- ");
            prompt.push_str(rule);
        }
    }

    if !language_instruction.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(language_instruction);
    }

    if !recalled.is_empty() {
        prompt.push_str("\n\nFrom earlier conversations:");
        for entry in recalled {
            prompt.push('\n');
            prompt.push_str(entry);
        }
    }

    prompt
}
