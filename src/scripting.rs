// src/scripting.rs

use crate::errors::Result;
use crate::gateway::GeminiGateway;

/// Generation budget for full-script tasks.
const SCRIPT_MAX_TOKENS: u32 = 4096;
/// Editing tasks favor some variety over strict determinism.
const SCRIPT_TEMPERATURE: f32 = 0.7;

/// Structures raw uploaded text into a clean spoken script.
pub async fn structure_script(gateway: &GeminiGateway, raw_text: &str) -> Result<String> {
    let prompt = format!(
        r#"You are a professional presentation editor.

Structure the following text into a clean speech script with these sections:
1. Introduction
2. Key Points
3. Conclusion

IMPORTANT: Return ONLY plain text. Do NOT use any markdown formatting such as ##, **, ---, bullet symbols, or headers. Write it as a natural, spoken speech script that a presenter would read aloud.

Text:
{raw_text}
"#
    );

    gateway
        .call_model(&prompt, SCRIPT_MAX_TOKENS, SCRIPT_TEMPERATURE)
        .await
}

/// Writes a complete speech script for a 5-minute presentation on a topic.
pub async fn generate_script(gateway: &GeminiGateway, topic: &str) -> Result<String> {
    let prompt = format!(
        r#"You are a professional presentation writer. Write a complete speech script for a 5-minute presentation.

The script must have:
1. Introduction - greet the audience and introduce the topic
2. Key Points - cover 3 to 4 main points with clear explanations
3. Conclusion - summarize and end with a strong closing statement

IMPORTANT: Return ONLY plain text. Do NOT use any markdown formatting such as ##, **, ---, bullet symbols, asterisks, or headers. Write it as a natural, spoken speech script that a presenter would read aloud word by word. Use paragraph breaks to separate sections.

Topic: {topic}
"#
    );

    gateway
        .call_model(&prompt, SCRIPT_MAX_TOKENS, SCRIPT_TEMPERATURE)
        .await
}

/// Applies a natural-language edit instruction to an existing script and
/// returns the full updated text.
pub async fn edit_script(
    gateway: &GeminiGateway,
    current_script: &str,
    instruction: &str,
) -> Result<String> {
    let prompt = format!(
        r#"You are a professional presentation editor.

Current Script:
{current_script}

Instruction:
{instruction}

Return the full updated script as plain text. Do NOT use any markdown formatting such as ##, **, ---, bullet symbols, asterisks, or headers. Write it as a natural, spoken speech script.
"#
    );

    gateway
        .call_model(&prompt, SCRIPT_MAX_TOKENS, SCRIPT_TEMPERATURE)
        .await
}
