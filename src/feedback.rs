// src/feedback.rs

use serde_json::{Map, Value, json};

use crate::extract::extract_json;
use crate::gateway::GeminiGateway;
use crate::models::{PitchStats, VisionScores};

/// Transcripts below this token count are not worth an API call.
pub const MIN_TRANSCRIPT_TOKENS: usize = 5;

/// Analyzes a presentation transcript plus delivery metrics and returns
/// structured coaching feedback.
///
/// Always resolves to a JSON object ready for serialization: model failures
/// surface as an object with an `error` key, never as an `Err`.
pub async fn evaluate_content(
    gateway: &GeminiGateway,
    transcript: &str,
    pitch: &PitchStats,
    vision: &VisionScores,
) -> Value {
    // Guard: too little speech to analyze, skip the model entirely
    if transcript.split_whitespace().count() < MIN_TRANSCRIPT_TOKENS {
        return json!({
            "clarity_score": 0,
            "engagement_score": 0,
            "structure_score": 0,
            "strengths": [],
            "improvements": ["Transcript too short to provide meaningful feedback"],
            "overall_feedback": "Not enough speech content was captured to analyze.",
            "content_suggestions": ["Try speaking more during your presentation"]
        });
    }

    let prompt = build_feedback_prompt(transcript, pitch, vision);

    match gateway.call_model(&prompt, 1024, 0.3).await {
        Ok(raw) => match extract_json(&raw) {
            Some(parsed) => Value::Object(complete_feedback(parsed)),
            None => {
                log::warn!("evaluate_content: could not parse JSON from model output");
                json!({"error": "invalid JSON from model"})
            }
        },
        Err(e) => {
            log::warn!("evaluate_content: model call failed: {}", e);
            json!({"error": e.to_string()})
        }
    }
}

/// Fills any required feedback keys the model omitted with safe defaults.
fn complete_feedback(mut parsed: Map<String, Value>) -> Map<String, Value> {
    for key in ["clarity_score", "engagement_score", "structure_score"] {
        parsed.entry(key).or_insert(json!(0));
    }
    for key in ["strengths", "improvements", "content_suggestions"] {
        parsed.entry(key).or_insert(json!([]));
    }
    parsed.entry("overall_feedback").or_insert(json!(""));
    parsed
}

fn build_feedback_prompt(transcript: &str, pitch: &PitchStats, vision: &VisionScores) -> String {
    format!(
        r#"You are an expert public speaking coach. Analyze this presentation transcript and performance data, then return STRICT JSON only.

Transcript:
{transcript}

Pitch stats: avg={avg:.0}Hz, min={min:.0}Hz, max={max:.0}Hz
Vision scores: eye_contact={eye}%, posture={posture}%, gestures={gesture}%

Return ONLY this JSON structure with NO markdown, NO code fences, NO extra text:
{{
  "clarity_score": <number 0-100>,
  "engagement_score": <number 0-100>,
  "structure_score": <number 0-100>,
  "strengths": ["<specific strength from their speech>", "<another strength>"],
  "improvements": ["<specific actionable improvement>", "<another improvement>"],
  "overall_feedback": "<2-3 sentence constructive summary>",
  "content_suggestions": ["<suggestion to improve content>", "<another suggestion>"]
}}

Rules:
- Be specific and actionable, referencing actual things from the transcript
- Strengths: what the speaker did well based on content and delivery data
- Improvements: concrete areas they should work on
- content_suggestions: ideas to make the content itself stronger
- Return ONLY valid JSON
"#,
        transcript = transcript,
        avg = pitch.avg,
        min = pitch.min,
        max = pitch.max,
        eye = vision.eye,
        posture = vision.posture,
        gesture = vision.gesture,
    )
}
