// src/comparison.rs

use serde_json::{Map, Value, json};

use crate::extract::extract_json;
use crate::feedback::MIN_TRANSCRIPT_TOKENS;
use crate::gateway::GeminiGateway;

/// Compares a reference script against what the speaker actually said.
///
/// Temperature is pinned to 0: this is a factual coverage comparison, not
/// creative feedback. Like [`crate::feedback::evaluate_content`], the result
/// is always a JSON object; failures resolve to user-readable fallback
/// objects rather than errors.
pub async fn compare_script(
    gateway: &GeminiGateway,
    reference_script: &str,
    transcript: &str,
) -> Value {
    // Guard: too little speech to compare, skip the model entirely
    if transcript.split_whitespace().count() < MIN_TRANSCRIPT_TOKENS {
        return json!({
            "coverage_percent": 0,
            "missing_points": ["Transcript too short to analyze"],
            "partially_covered_points": [],
            "flow_issues": [],
            "insights": "The speaker did not say enough to compare against the script."
        });
    }

    let prompt = build_comparison_prompt(reference_script, transcript);

    match gateway.call_model(&prompt, 1024, 0.0).await {
        Ok(raw) => match extract_json(&raw) {
            Some(parsed) => Value::Object(complete_comparison(parsed)),
            None => {
                log::warn!("compare_script: could not parse JSON from model output");
                json!({
                    "coverage_percent": 0,
                    "missing_points": ["Analysis could not be completed"],
                    "partially_covered_points": [],
                    "flow_issues": [],
                    "insights": "The AI model returned an invalid response. Please try again."
                })
            }
        },
        Err(e) => {
            log::warn!("compare_script: model call failed: {}", e);
            json!({
                "coverage_percent": 0,
                "missing_points": ["Analysis failed due to an error"],
                "partially_covered_points": [],
                "flow_issues": [],
                "insights": e.to_string()
            })
        }
    }
}

/// Fills any required comparison keys the model omitted with safe defaults.
fn complete_comparison(mut parsed: Map<String, Value>) -> Map<String, Value> {
    parsed.entry("coverage_percent").or_insert(json!(0));
    for key in ["missing_points", "partially_covered_points", "flow_issues"] {
        parsed.entry(key).or_insert(json!([]));
    }
    parsed.entry("insights").or_insert(json!(""));
    parsed
}

fn build_comparison_prompt(reference_script: &str, transcript: &str) -> String {
    format!(
        r#"You are an expert speech evaluator. Compare the reference script against what the speaker actually said in the transcript.

Reference Script:
---
{reference_script}
---

Actual Transcript:
---
{transcript}
---

Analyze how well the speaker covered the script. Return ONLY a JSON object with NO markdown, NO code fences, NO extra text:

{{
  "coverage_percent": <number 0-100>,
  "missing_points": ["<key idea from script that was completely skipped>"],
  "partially_covered_points": ["<idea that was mentioned but not fully explained>"],
  "flow_issues": ["<any ordering or transition problems>"],
  "insights": "<one paragraph summary of how well the speaker followed the script>"
}}

Rules:
- coverage_percent: what percentage of the script's key ideas were conveyed
- missing_points: list specific topics/sentences from the script that the speaker skipped entirely
- partially_covered_points: ideas mentioned briefly but not fully covered
- flow_issues: if the speaker changed the order or had awkward transitions
- insights: a brief constructive summary
- If the speaker covered everything well, set coverage_percent high and leave missing_points empty
- Return ONLY valid JSON
"#
    )
}
